// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the transport and the stores.

use serde_json::Value;

/// Message used when a failed response carries no readable `message`.
pub const GENERIC_FAILURE_MESSAGE: &str = "Network response was not ok";

/// Application error type.
///
/// Transport, storage and validation layers return these; the stores catch
/// them and turn them into notices instead of handing them to the UI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// A 2xx body that does not have the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Refused locally because the current identity lacks the role.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Build an API error from a status code and the (possibly unparseable) body.
    pub fn from_status(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string();

        AppError::Api {
            status,
            message,
            body,
        }
    }

    /// HTTP status, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401 responses (expired or missing session).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Server-provided message when there is one, otherwise `fallback`.
    ///
    /// Validation and role-gate messages are already user-facing and are
    /// returned as-is.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Api { message, .. } if message != GENERIC_FAILURE_MESSAGE => {
                message.clone()
            }
            AppError::Validation(msg) => msg.clone(),
            AppError::Forbidden(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_status_uses_server_message() {
        let err = AppError::from_status(401, Some(json!({"message": "Email atau password salah"})));
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Email atau password salah");
    }

    #[test]
    fn test_from_status_without_body_is_generic() {
        let err = AppError::from_status(500, None);
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.user_message("Failed to load products."), "Failed to load products.");
    }
}
