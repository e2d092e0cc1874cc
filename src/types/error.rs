//! Error types for the intake service
//!
//! Client-facing variants (`BadRequest`, `NotFound`) carry the message shown
//! to the submitter. Everything else is logged server-side and replaced with
//! the endpoint's generic message before it leaves the process.

use hyper::StatusCode;

/// Main error type for intake operations
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntakeError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error describes a client mistake rather than a fault
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Message safe to return to the caller.
    ///
    /// Server faults collapse to `generic` so no diagnostic detail leaks.
    pub fn public_message(&self, generic: &str) -> String {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            Self::MethodNotAllowed => "method not allowed".to_string(),
            _ => generic.to_string(),
        }
    }

    /// Convert to status code and body tuple for HTTP response
    pub fn into_status_code_and_body(self, generic: &str) -> (StatusCode, String) {
        let status = self.status_code();
        let body = self.public_message(generic);
        (status, body)
    }
}

impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<mongodb::error::Error> for IntakeError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for IntakeError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("BSON encoding failed: {}", err))
    }
}

impl From<bson::de::Error> for IntakeError {
    fn from(err: bson::de::Error) -> Self {
        Self::Database(format!("BSON decoding failed: {}", err))
    }
}

/// Result type alias for intake operations
pub type Result<T> = std::result::Result<T, IntakeError>;
