//! Domain-specific error types for newsprobe

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::clients::ModelError;

/// Main error type for the newsprobe pipeline and dashboard server
#[derive(Error, Debug)]
pub enum NewsProbeError {
    /// Rejected before any stage runs: empty query, empty pipeline, malformed request
    #[error("Input error: {message}")]
    Input { message: String },

    /// A stage aborted the run; no partial report exists
    #[error("Stage '{stage}' failed: {message}")]
    StageFailure { stage: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Capability error: {message}")]
    Capability { message: String },

    #[error("Language model error: {message}")]
    Model { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl NewsProbeError {
    pub fn input(message: impl Into<String>) -> Self {
        NewsProbeError::Input {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        NewsProbeError::Config {
            message: message.into(),
        }
    }

    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        NewsProbeError::StageFailure {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, NewsProbeError::Input { .. })
    }

    pub fn is_stage_failure(&self) -> bool {
        matches!(self, NewsProbeError::StageFailure { .. })
    }

    /// True when the terminal stage produced output that could not be coerced into a report
    pub fn is_schema_validation(&self) -> bool {
        matches!(
            self,
            NewsProbeError::StageFailure { message, .. } if message.starts_with(SCHEMA_VALIDATION_PREFIX)
        )
    }

    fn status_code(&self) -> StatusCode {
        match self {
            NewsProbeError::Input { .. } => StatusCode::BAD_REQUEST,
            NewsProbeError::StageFailure { .. }
            | NewsProbeError::Capability { .. }
            | NewsProbeError::Model { .. } => StatusCode::BAD_GATEWAY,
            NewsProbeError::Config { .. }
            | NewsProbeError::Serialization { .. }
            | NewsProbeError::Persistence { .. }
            | NewsProbeError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(crate) const SCHEMA_VALIDATION_PREFIX: &str = "schema validation failed";

impl From<ModelError> for NewsProbeError {
    fn from(err: ModelError) -> Self {
        NewsProbeError::Model {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for NewsProbeError {
    fn from(err: serde_json::Error) -> Self {
        NewsProbeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for NewsProbeError {
    fn from(err: toml::de::Error) -> Self {
        NewsProbeError::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}

impl From<reqwest::Error> for NewsProbeError {
    fn from(err: reqwest::Error) -> Self {
        NewsProbeError::Capability {
            message: format!("HTTP client error: {}", err),
        }
    }
}

impl From<std::io::Error> for NewsProbeError {
    fn from(err: std::io::Error) -> Self {
        NewsProbeError::Persistence {
            message: err.to_string(),
        }
    }
}

/// Convert NewsProbeError to an HTTP JSON error body
impl IntoResponse for NewsProbeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            json!({"error": {"code": status.as_u16(), "message": self.to_string()}}).to_string(),
        )
            .into_response()
    }
}

/// Result type alias for newsprobe operations
pub type Result<T> = std::result::Result<T, NewsProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_validation_is_stage_failure() {
        let err = NewsProbeError::stage(
            "news_report_generator",
            format!("{}: missing field `query_summary`", SCHEMA_VALIDATION_PREFIX),
        );
        assert!(err.is_stage_failure());
        assert!(err.is_schema_validation());
        assert!(!err.is_input());
    }

    #[test]
    fn test_conversions_pick_variant() {
        let err: NewsProbeError = ModelError::NotConfigured("OPENAI_API_KEY".into()).into();
        assert!(matches!(err, NewsProbeError::Model { .. }));

        let err: NewsProbeError = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(matches!(err, NewsProbeError::Serialization { .. }));

        let err: NewsProbeError = toml::from_str::<toml::Value>("a = ").unwrap_err().into();
        assert!(matches!(err, NewsProbeError::Config { .. }));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: NewsProbeError = io.into();
        assert!(matches!(err, NewsProbeError::Persistence { .. }));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            NewsProbeError::input("empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            NewsProbeError::stage("web_crawler", "boom").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
