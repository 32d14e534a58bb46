use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("No such driver type: {0}")]
    UnknownDriver(String),

    #[error("No such database: {0}")]
    UnknownDatabase(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("BSON conversion error: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type BenchResult<T> = Result<T, BenchError>;

impl BenchError {
    /// Configuration errors are the caller's fault and are never retried.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BenchError::UnknownDriver(_) | BenchError::UnknownDatabase(_) | BenchError::Config(_)
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            BenchError::UnknownDriver(_) => "UnknownDriver",
            BenchError::UnknownDatabase(_) => "UnknownDatabase",
            BenchError::Parse(_) => "Parse",
            BenchError::Config(_) => "Config",
            BenchError::Database(_) => "Database",
            BenchError::Bson(_) => "Bson",
            BenchError::Io(_) => "Io",
            BenchError::Json(_) => "Json",
            BenchError::Toml(_) => "Toml",
            BenchError::Internal(_) => "Internal",
        }
    }
}

impl serde::Serialize for BenchError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl From<tokio::task::JoinError> for BenchError {
    fn from(err: tokio::task::JoinError) -> Self {
        BenchError::Internal(format!("blocking task failed: {}", err))
    }
}

impl IntoResponse for BenchError {
    fn into_response(self) -> Response {
        let status = match &self {
            BenchError::UnknownDriver(_)
            | BenchError::UnknownDatabase(_)
            | BenchError::Parse(_)
            | BenchError::Bson(_)
            | BenchError::Json(_) => StatusCode::BAD_REQUEST,
            // Default to 500
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16(),
            "type": self.kind(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BenchError::UnknownDriver("psycopg".to_string());
        assert_eq!(err.to_string(), "No such driver type: psycopg");

        let err = BenchError::UnknownDatabase("prod".to_string());
        assert_eq!(err.to_string(), "No such database: prod");

        let err = BenchError::Parse("expected value at line 1 column 1".to_string());
        assert_eq!(err.to_string(), "Parse error: expected value at line 1 column 1");

        let err = BenchError::Internal("join failed".to_string());
        assert_eq!(err.to_string(), "Internal error: join failed");
    }

    #[test]
    fn test_config_error_classification() {
        assert!(BenchError::UnknownDriver("x".into()).is_config_error());
        assert!(BenchError::UnknownDatabase("x".into()).is_config_error());
        assert!(BenchError::Config("x".into()).is_config_error());
        assert!(!BenchError::Parse("x".into()).is_config_error());
        assert!(!BenchError::Internal("x".into()).is_config_error());
    }

    #[test]
    fn test_status_codes() {
        let resp = BenchError::UnknownDriver("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = BenchError::Parse("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = BenchError::Internal("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_serializes_as_message() {
        let err = BenchError::UnknownDriver("foo".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!("No such driver type: foo"));
    }
}
