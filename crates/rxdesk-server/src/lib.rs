//! RxDesk Server
//!
//! HTTP endpoints for the record table, the chat widget and prescription
//! scanning.

pub mod http;
pub mod settings;
pub mod state;

pub use http::create_router;
pub use settings::{load_settings, Settings};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rxdesk_core::RxDeskError;
use serde::Serialize;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RxDeskError> for ServerError {
    fn from(err: RxDeskError) -> Self {
        match err {
            RxDeskError::NotFound(m) => ServerError::NotFound(m),
            RxDeskError::InvalidInput(m) => ServerError::InvalidRequest(m),
            RxDeskError::Conflict(m) => ServerError::Conflict(m),
            RxDeskError::DatabaseError(m) => ServerError::Database(m),
            RxDeskError::LanguageModelError(m) => ServerError::LanguageModel(m),
            RxDeskError::OcrError(m) => ServerError::Ocr(m),
        }
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("Blocking task failed: {}", err))
    }
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::LanguageModel(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Ocr(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
