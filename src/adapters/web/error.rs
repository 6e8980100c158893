//! HTTP error responses for web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::domain::error::TickercastError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &TickercastError) -> StatusCode {
    match err {
        TickercastError::RefreshInProgress => StatusCode::CONFLICT,
        TickercastError::Fetch(_)
        | TickercastError::Store { .. }
        | TickercastError::Io(_)
        | TickercastError::ConfigParse { .. }
        | TickercastError::ConfigMissing { .. }
        | TickercastError::ConfigInvalid { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TickercastError> for WebError {
    fn from(err: TickercastError) -> Self {
        let status = status_from_error(&err);
        let message = match &err {
            TickercastError::Fetch(_) => format!("Failed to fetch data: {err}"),
            _ => err.to_string(),
        };
        Self::new(status, message)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
