use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Invalid image tag: {tag}")]
    InvalidTag { tag: String },

    #[error("Registry authentication failed for {registry}: {message}")]
    AuthFailed { registry: String, message: String },

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Dockerfile template error: {0}")]
    Template(#[from] tera::Error),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service '{service}' failed at {stage}: {source}")]
    Service {
        service: String,
        stage: PublishStage,
        #[source]
        source: Box<BuildError>,
    },
}

/// Step of the per-service publish sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Context,
    Build,
    Repository,
    Authorize,
    Tag,
    Push,
}

impl std::fmt::Display for PublishStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStage::Context => write!(f, "build context"),
            PublishStage::Build => write!(f, "image build"),
            PublishStage::Repository => write!(f, "repository creation"),
            PublishStage::Authorize => write!(f, "registry authorization"),
            PublishStage::Tag => write!(f, "image tag"),
            PublishStage::Push => write!(f, "image push"),
        }
    }
}

impl BuildError {
    /// Attach the failing service and stage
    pub fn for_service(self, service: impl Into<String>, stage: PublishStage) -> Self {
        BuildError::Service {
            service: service.into(),
            stage,
            source: Box::new(self),
        }
    }

    /// Human-facing message with a hint for the common failures
    pub fn user_message(&self) -> String {
        match self {
            BuildError::Service {
                service,
                stage,
                source,
            } => format!(
                "Service '{}' failed at {}.\n{}",
                service,
                stage,
                source.user_message()
            ),
            BuildError::ContextNotFound(path) => format!(
                "Build context not found: {}\n\
                 \n\
                 Check build.context_root in the settings file.",
                path.display()
            ),
            BuildError::BuildFailed(msg) => format!(
                "Image build failed: {}\n\
                 \n\
                 The generated Dockerfile expects the requirements file and entrypoint\n\
                 named in the build settings to exist in the build context.",
                msg
            ),
            BuildError::DockerConnection(e) => format!(
                "Could not talk to Docker: {}\n\
                 \n\
                 Hint: make sure the Docker daemon is running.",
                e
            ),
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
