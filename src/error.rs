use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::wizard::WizardError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),
    #[error("unknown style '{0}'")]
    StyleNotFound(String),
    #[error("unknown page type '{0}'")]
    UnknownPage(String),
    #[error("no generated page at index {0}")]
    PageNotFound(usize),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("stored image could not be decoded: {0}")]
    CorruptImage(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) | ApiError::StyleNotFound(_) | ApiError::PageNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnknownPage(_) => StatusCode::BAD_REQUEST,
            ApiError::Wizard(WizardError::NoPagesSelected) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Wizard(_) => StatusCode::CONFLICT,
            ApiError::CorruptImage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
