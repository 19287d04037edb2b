use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Errors scoped to a single player session.
///
/// None of these are fatal to the server; at worst they end one connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Registration name is empty, blank or otherwise unusable.
    #[error("invalid name: {0}")]
    InvalidName(String),
    /// Action is not allowed in the current session state.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// Inbound payload could not be decoded or misses required fields.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    /// The question bank has nothing to offer.
    #[error("no questions available")]
    NoQuestions,
    /// The connection to the player dropped.
    #[error("transport failure: {0}")]
    TransportFailure(String),
}

impl SessionError {
    /// Stable machine-readable code sent to clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::InvalidName(_) => "invalid_name",
            SessionError::ProtocolViolation(_) => "protocol_violation",
            SessionError::MalformedMessage(_) => "malformed_message",
            SessionError::NoQuestions => "no_questions",
            SessionError::TransportFailure(_) => "transport_failure",
        }
    }

    /// Whether the player should be told about this error.
    ///
    /// Protocol violations are only logged; the client is expected to re-issue actions itself.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidName(_)
                | SessionError::MalformedMessage(_)
                | SessionError::NoQuestions
        )
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::MalformedMessage(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
