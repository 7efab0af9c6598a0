use axum::response::{IntoResponse, Response};
use axum::{Json, http::StatusCode};
use lead_core::{RelayEnvelope, SubmissionError};

use crate::telegram::SendError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid JSON payload")]
    InvalidJson,
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,
    #[error("delivery failed")]
    Delivery(#[from] SendError),
    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl From<SubmissionError> for RelayError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::InvalidJson => RelayError::InvalidJson,
            SubmissionError::Invalid(errors) => RelayError::Validation(errors),
        }
    }
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidJson | RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Delivery(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body sent to the caller. Transport and internal details stay in the logs.
    pub fn envelope(&self) -> RelayEnvelope {
        match self {
            RelayError::Validation(errors) => RelayEnvelope::invalid(errors.clone()),
            RelayError::Delivery(SendError::Transport(_)) => {
                RelayEnvelope::failure("Failed to reach Telegram API")
            }
            RelayError::Delivery(err) => RelayEnvelope::failure(err.to_string()),
            RelayError::Internal(_) => RelayEnvelope::failure(INTERNAL_ERROR_MESSAGE),
            other => RelayEnvelope::failure(other.to_string()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::Delivery(err) => {
                tracing::error!(error = ?err, "lead delivery failed");
            }
            RelayError::Internal(err) => {
                tracing::error!(error = ?err, "relay internal error");
            }
            _ => {}
        }
        (self.status(), Json(self.envelope())).into_response()
    }
}
