use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("Service node '{id}' has no entry in the services table")]
    MissingServiceConfig { id: String },

    #[error("Failed to parse configuration of service '{service}': {message}")]
    ConfigParse { service: String, message: String },

    #[error("Duplicate service node id: {0}")]
    DuplicateServiceId(String),

    #[error(
        "Services '{first}' and '{second}' resolve to the same name '{slug}'\nHint: give every service a distinct name"
    )]
    DuplicateServiceName {
        first: String,
        second: String,
        slug: String,
    },

    #[error("Service name '{0}' contains no letters or digits")]
    InvalidServiceName(String),

    #[error("The graph contains no service nodes")]
    NoServices,
}

pub type Result<T> = std::result::Result<T, FlowError>;
