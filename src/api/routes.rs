use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::backend::Backend;
use crate::storage::Storage;

use super::handlers::{
    create_item_handler, delete_item_handler, health_handler, list_items_handler,
    list_vaults_handler, read_config_handler, read_item_handler, write_config_handler,
    write_item_handler,
};

#[derive(Clone)]
pub struct ApiState {
    pub backend: Arc<Backend>,
    pub storage: Arc<dyn Storage>,
}

impl ApiState {
    pub fn new(backend: Arc<Backend>, storage: Arc<dyn Storage>) -> Self {
        Self { backend, storage }
    }
}

pub fn build_router(state: ApiState) -> Router {
    let api = Router::new()
        .route("/config", get(read_config_handler).put(write_config_handler).post(write_config_handler))
        .route("/vaults", get(list_vaults_handler))
        .route("/vaults/{vault}/items", get(list_items_handler).post(create_item_handler))
        .route(
            "/vaults/{vault}/items/{id}",
            get(read_item_handler)
                .post(write_item_handler)
                .put(write_item_handler)
                .delete(delete_item_handler),
        );

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
