//! AWS backend errors

use thiserror::Error;
use topoflow_build::BuildError;
use topoflow_cloud::CloudError;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{operation} failed: {message}")]
    Sdk { operation: &'static str, message: String },

    #[error("{operation} returned no {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}

impl AwsError {
    pub fn sdk(operation: &'static str, err: impl std::fmt::Display) -> Self {
        AwsError::Sdk {
            operation,
            message: err.to_string(),
        }
    }
}

impl From<AwsError> for BuildError {
    fn from(err: AwsError) -> Self {
        BuildError::Registry(err.to_string())
    }
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        CloudError::ApiError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
