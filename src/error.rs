//! Error types and handling for the `StyleCast` application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Main error type for the `StyleCast` application
#[derive(Error, Debug)]
pub enum StyleCastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// The weather provider does not know the requested city
    #[error("City not found: {city}")]
    CityNotFound { city: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Style/user store errors
    #[error("Store error: {message}")]
    Store { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl StyleCastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            StyleCastError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            StyleCastError::Api { .. } => {
                "Unable to reach external services. Please try again later.".to_string()
            }
            StyleCastError::CityNotFound { city } => {
                format!("City not found: {city}")
            }
            StyleCastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            StyleCastError::Store { .. } => {
                "Unable to read or write style data. Please try again later.".to_string()
            }
            StyleCastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            StyleCastError::General { message } => message.clone(),
        }
    }

    /// HTTP status this error collapses to. Every downstream failure becomes
    /// a generic 500; only bad input and unknown cities surface differently.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            StyleCastError::CityNotFound { .. } => StatusCode::NOT_FOUND,
            StyleCastError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for StyleCastError {
    fn from(err: anyhow::Error) -> Self {
        StyleCastError::General {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for StyleCastError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::warn!("Request rejected: {self}");
        }
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
