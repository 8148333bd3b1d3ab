//! Unified application error model and mapping helpers.
//! This module provides a common error enum used across the HTTP boundary and the
//! identity/upload services, along with the HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    InvalidInput { code: String, message: String },
    Conflict { code: String, message: String },
    Unauthorized { code: String, message: String },
    Forbidden { code: String, message: String },
    NotFound { code: String, message: String },
    SecurityViolation { code: String, message: String },
    Storage { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::InvalidInput { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::SecurityViolation { code, .. }
            | AppError::Storage { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidInput { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::SecurityViolation { message, .. }
            | AppError::Storage { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn invalid<S: Into<String>>(code: S, msg: S) -> Self { AppError::InvalidInput { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn unauthorized<S: Into<String>>(code: S, msg: S) -> Self { AppError::Unauthorized { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn security<S: Into<String>>(code: S, msg: S) -> Self { AppError::SecurityViolation { code: code.into(), message: msg.into() } }
    pub fn storage<S: Into<String>>(code: S, msg: S) -> Self { AppError::Storage { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::InvalidInput { .. } => 400,
            AppError::Conflict { .. } => 409,
            AppError::Unauthorized { .. } => 401,
            AppError::Forbidden { .. } => 403,
            AppError::NotFound { .. } => 404,
            AppError::SecurityViolation { .. } => 400,
            AppError::Storage { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }

    /// Message rendered to clients. Filesystem and I/O detail stays server-side;
    /// clients only ever see a fixed phrase for those variants.
    pub fn client_message(&self) -> &str {
        match self {
            AppError::SecurityViolation { .. } => "rejected file destination",
            AppError::Storage { .. } => "could not store file",
            AppError::Internal { .. } => "an unexpected error occurred",
            _ => self.message(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal".into(), message: err.to_string() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = self.code_str(), "request failed: {}", self.message());
        }
        let body = serde_json::json!({
            "error": self.code_str(),
            "message": self.client_message(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AppError::invalid("bad_input", "oops").http_status(), 400);
        assert_eq!(AppError::conflict("email_taken", "dup").http_status(), 409);
        assert_eq!(AppError::unauthorized("bad_token", "no").http_status(), 401);
        assert_eq!(AppError::forbidden("not_owner", "blocked").http_status(), 403);
        assert_eq!(AppError::not_found("rental", "missing").http_status(), 404);
        assert_eq!(AppError::security("path_escape", "escape").http_status(), 400);
        assert_eq!(AppError::storage("io", "disk").http_status(), 503);
        assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
    }

    #[test]
    fn client_message_hides_storage_detail() {
        let e = AppError::security("path_escape", "/etc/passwd escaped /srv/uploads");
        assert_eq!(e.client_message(), "rejected file destination");
        let e = AppError::storage("io", "No space left on device (os error 28)");
        assert_eq!(e.client_message(), "could not store file");
        // Validation messages pass through untouched
        let e = AppError::invalid("weak_password", "password too short");
        assert_eq!(e.client_message(), "password too short");
    }
}
