use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Failure kinds reported by the z-score engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    RangeInvalid,
    EmptyInput,
    DataUnavailable,
    UnknownNormalizationTicker,
    InvalidPrice,
    InsufficientSamples,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RangeInvalid => "RangeInvalid",
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::DataUnavailable => "DataUnavailable",
            ErrorKind::UnknownNormalizationTicker => "UnknownNormalizationTicker",
            ErrorKind::InvalidPrice => "InvalidPrice",
            ErrorKind::InsufficientSamples => "InsufficientSamples",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine error. Every component fails fast with exactly one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid date range: {0}")]
    RangeInvalid(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Provider had no data. `transient` marks transport failures that a
    /// retrying fetcher may try again.
    #[error("Data unavailable: {message}")]
    DataUnavailable { message: String, transient: bool },

    #[error("Unknown normalization ticker: {0}")]
    UnknownNormalizationTicker(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Insufficient samples: {0}")]
    InsufficientSamples(String),
}

impl EngineError {
    /// Permanent "no data" failure (unknown ticker, empty range).
    pub fn unavailable(message: impl Into<String>) -> Self {
        EngineError::DataUnavailable {
            message: message.into(),
            transient: false,
        }
    }

    /// Transport-level failure (timeout, connection reset, 5xx).
    pub fn transient(message: impl Into<String>) -> Self {
        EngineError::DataUnavailable {
            message: message.into(),
            transient: true,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::RangeInvalid(_) => ErrorKind::RangeInvalid,
            EngineError::EmptyInput(_) => ErrorKind::EmptyInput,
            EngineError::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            EngineError::UnknownNormalizationTicker(_) => ErrorKind::UnknownNormalizationTicker,
            EngineError::InvalidPrice(_) => ErrorKind::InvalidPrice,
            EngineError::InsufficientSamples(_) => ErrorKind::InsufficientSamples,
        }
    }

    /// Prefix the message, keeping the kind.
    pub fn context(self, prefix: impl fmt::Display) -> Self {
        let wrap = |m: String| format!("{}: {}", prefix, m);
        match self {
            EngineError::RangeInvalid(m) => EngineError::RangeInvalid(wrap(m)),
            EngineError::EmptyInput(m) => EngineError::EmptyInput(wrap(m)),
            EngineError::DataUnavailable { message, transient } => EngineError::DataUnavailable {
                message: wrap(message),
                transient,
            },
            EngineError::UnknownNormalizationTicker(m) => {
                EngineError::UnknownNormalizationTicker(wrap(m))
            }
            EngineError::InvalidPrice(m) => EngineError::InvalidPrice(wrap(m)),
            EngineError::InsufficientSamples(m) => EngineError::InsufficientSamples(wrap(m)),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::DataUnavailable { transient: true, .. })
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::RangeInvalid | ErrorKind::EmptyInput => StatusCode::BAD_REQUEST,
            ErrorKind::UnknownNormalizationTicker
            | ErrorKind::InvalidPrice
            | ErrorKind::InsufficientSamples => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::DataUnavailable => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, None, msg.clone()),
            AppError::Engine(e) => (e.status(), Some(e.kind()), e.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", message);
        }

        let body = Json(json!({
            "error": message,
            "kind": kind.map(|k| k.as_str()),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
