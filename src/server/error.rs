//! HTTP error mapping.
//!
//! | Error | Status |
//! |-------|--------|
//! | `InvalidInput` | 400 |
//! | `Unauthorized` | 401 |
//! | `NotFound` | 404 |
//! | `Upstream` | 502 |
//! | `Timeout` | 504 |
//! | everything else | 500 |
//!
//! 500 bodies carry the full message; in production
//! [`redact_internal_errors`] swaps them for a generic one.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::state::AppState;
use crate::error::BillsendError;

/// Handler error; wraps the library error.
#[derive(Debug)]
pub struct ApiError(pub BillsendError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Marks a response whose body may expose internals.
#[derive(Debug, Clone, Copy)]
struct Redactable;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BillsendError::InvalidInput(_) | BillsendError::Json(_) => StatusCode::BAD_REQUEST,
            BillsendError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BillsendError::NotFound(_) => StatusCode::NOT_FOUND,
            BillsendError::Upstream(_) => StatusCode::BAD_GATEWAY,
            BillsendError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            BillsendError::Config(_) | BillsendError::Render(_) | BillsendError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "Request rejected");
        }

        let mut response = (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            response.extensions_mut().insert(Redactable);
        }
        response
    }
}

impl From<BillsendError> for ApiError {
    fn from(e: BillsendError) -> Self {
        ApiError(e)
    }
}

/// Replace internal error details with a generic message in production.
pub async fn redact_internal_errors(State(state): State<Arc<AppState>>, response: Response) -> Response {
    if state.config.is_production() && response.extensions().get::<Redactable>().is_some() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "internal server error".to_string(),
            }),
        )
            .into_response();
    }
    response
}
