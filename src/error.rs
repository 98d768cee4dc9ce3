use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::expiry::InvalidDateError;

pub type AppResult<T> = Result<T, AppError>;

/// Every failure a screen can surface. At the HTTP boundary each variant
/// becomes a transient notification; none of them is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transport failure, non-success upstream status, or an undecodable body.
    #[error("network error: {0}")]
    Network(String),

    /// Form failure detected before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: u32,
        available: u32,
    },

    #[error(transparent)]
    InvalidDate(#[from] InvalidDateError),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable name used in the notification body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Network(_) => "network",
            AppError::Validation(_) => "validation",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::InvalidDate(_) => "invalid_date",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) | AppError::InvalidDate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = err.field_errors().into_keys().collect();
        fields.sort_unstable();
        AppError::Validation(format!("invalid or missing fields: {}", fields.join(", ")))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            warn!(kind = self.kind(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}
