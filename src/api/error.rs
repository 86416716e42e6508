use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::PluginError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let (error_kind, message) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg),
            ApiError::NotFound(msg) => ("not_found", msg),
            ApiError::MethodNotAllowed(msg) => ("method_not_allowed", msg),
            ApiError::BadGateway(msg) => ("upstream_error", msg),
            ApiError::Internal(msg) => ("internal_error", msg),
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<PluginError> for ApiError {
    fn from(err: PluginError) -> Self {
        let message = err.to_string();
        match err {
            PluginError::Validation { .. }
            | PluginError::NoVaultSpecified
            | PluginError::NotConfigured => ApiError::BadRequest(message),
            PluginError::NotFound { .. } | PluginError::UnsupportedPath(_) => {
                ApiError::NotFound(message)
            }
            PluginError::UnsupportedOperation { .. } => ApiError::MethodNotAllowed(message),
            PluginError::Upstream { .. } => ApiError::BadGateway(message),
            PluginError::Storage { .. }
            | PluginError::Serialization { .. }
            | PluginError::Config(_)
            | PluginError::Internal(_) => {
                tracing::error!(error = %message, "Request failed");
                ApiError::Internal(message)
            }
        }
    }
}
