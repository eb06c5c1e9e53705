//! Template synthesis and submission errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("No published image for service '{service}'")]
    MissingImage { service: String },

    #[error("Duplicate template resource: {0}")]
    DuplicateResource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
