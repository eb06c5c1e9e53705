use std::path::PathBuf;
use thiserror::Error;
use topoflow_build::BuildError;
use topoflow_cloud::CloudError;
use topoflow_config::ConfigError;
use topoflow_core::FlowError;

/// Who has to act on a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed
    InvalidInput,
    /// An external call failed or timed out, or the settings are wrong
    Infrastructure,
}

impl ErrorKind {
    /// Process exit status for the CLI
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::InvalidInput => 2,
            ErrorKind::Infrastructure => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Failed to read request from {path}: {source}")]
    ReadRequest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Input(#[from] FlowError),

    #[error(transparent)]
    Publish(#[from] BuildError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Settings(#[from] ConfigError),
}

impl DeployError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeployError::ReadRequest { .. } | DeployError::Input(_) => ErrorKind::InvalidInput,
            DeployError::Publish(err) if is_bad_tag(err) => ErrorKind::InvalidInput,
            DeployError::Publish(_) | DeployError::Cloud(_) | DeployError::Settings(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// Message for the terminal, with hints where the error type has them
    pub fn user_message(&self) -> String {
        match self {
            DeployError::Publish(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// The image tag comes from the request's `version` key
fn is_bad_tag(err: &BuildError) -> bool {
    match err {
        BuildError::InvalidTag { .. } => true,
        BuildError::Service { source, .. } => is_bad_tag(source),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topoflow_build::PublishStage;

    #[test]
    fn test_input_errors_are_invalid_input() {
        let err = DeployError::from(FlowError::MissingServiceConfig {
            id: "c1".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.kind().exit_code(), 2);

        let err = DeployError::from(
            BuildError::InvalidTag {
                tag: "-dev".to_string(),
            }
            .for_service("api", PublishStage::Build),
        );
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_external_failures_are_infrastructure() {
        let err = DeployError::from(
            BuildError::PushFailed {
                message: "denied".to_string(),
            }
            .for_service("api", PublishStage::Push),
        );
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert_eq!(err.kind().exit_code(), 1);

        let err = DeployError::from(CloudError::Timeout {
            operation: "stack submission".to_string(),
            secs: 120,
        });
        assert_eq!(err.kind(), ErrorKind::Infrastructure);

        let err = DeployError::from(ConfigError::Invalid("bad".to_string()));
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn test_user_message_names_service() {
        let err = DeployError::from(
            BuildError::BuildFailed("exit 1".to_string()).for_service("orders", PublishStage::Build),
        );
        assert!(err.user_message().contains("orders"));
        assert!(err.user_message().contains("image build"));
    }
}
