//! HTTP handlers translating REST calls into backend requests.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    Json,
};
use serde_json::{json, Map, Value};

use super::error::ApiError;
use super::routes::ApiState;
use crate::backend::{Operation, Request, Response};

fn parse_body(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request("Request body must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("Invalid JSON body: {}", e))),
    }
}

async fn run(
    state: &ApiState,
    operation: Operation,
    path: String,
    data: Map<String, Value>,
) -> Result<HttpResponse, ApiError> {
    let request = Request::new(operation, path).with_data(data);
    let response = state.backend.handle_request(state.storage.as_ref(), request).await?;
    Ok(into_http(response))
}

fn into_http(response: Option<Response>) -> HttpResponse {
    match response {
        Some(response) => Json(json!({ "data": response.into_json() })).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

fn items_path(vault: &str) -> String {
    format!("vaults/{}/items", vault)
}

fn item_path(vault: &str, id: &str) -> String {
    format!("vaults/{}/items/{}", vault, id)
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn read_config_handler(State(state): State<ApiState>) -> Result<HttpResponse, ApiError> {
    run(&state, Operation::Read, "config".to_string(), Map::new()).await
}

pub async fn write_config_handler(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<HttpResponse, ApiError> {
    let data = parse_body(&body)?;
    run(&state, Operation::Update, "config".to_string(), data).await
}

pub async fn list_vaults_handler(State(state): State<ApiState>) -> Result<HttpResponse, ApiError> {
    run(&state, Operation::List, "vaults".to_string(), Map::new()).await
}

pub async fn list_items_handler(
    State(state): State<ApiState>,
    Path(vault): Path<String>,
) -> Result<HttpResponse, ApiError> {
    run(&state, Operation::List, items_path(&vault), Map::new()).await
}

pub async fn create_item_handler(
    State(state): State<ApiState>,
    Path(vault): Path<String>,
    body: Bytes,
) -> Result<HttpResponse, ApiError> {
    let data = parse_body(&body)?;
    run(&state, Operation::Create, items_path(&vault), data).await
}

pub async fn read_item_handler(
    State(state): State<ApiState>,
    Path((vault, id)): Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    run(&state, Operation::Read, item_path(&vault, &id), Map::new()).await
}

/// POST and PUT on an item: the existence check picks create or update.
pub async fn write_item_handler(
    State(state): State<ApiState>,
    Path((vault, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<HttpResponse, ApiError> {
    let data = parse_body(&body)?;
    let path = item_path(&vault, &id);
    let exists = state.backend.existence_check(state.storage.as_ref(), &path).await?;
    let operation = if exists { Operation::Update } else { Operation::Create };
    run(&state, operation, path, data).await
}

pub async fn delete_item_handler(
    State(state): State<ApiState>,
    Path((vault, id)): Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    run(&state, Operation::Delete, item_path(&vault, &id), Map::new()).await
}
