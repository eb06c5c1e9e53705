//! Image build and publish for topoflow
//!
//! Packs each service's build context with a generated Dockerfile, builds
//! the image through Docker, makes sure its registry repository exists and
//! pushes it under a fully-qualified URI.

pub mod auth;
pub mod builder;
pub mod context;
pub mod dockerfile;
pub mod engine;
pub mod error;
pub mod publisher;
pub mod pusher;

pub use auth::{DockerConfigAuth, RegistryAuthorization, registry_host};
pub use builder::ImageBuilder;
pub use context::ContextBuilder;
pub use dockerfile::DockerfileTemplate;
pub use engine::{
    ContainerEngine, ContainerRegistry, DockerEngine, DockerRegistry, RepositoryOutcome,
};
pub use error::{BuildError, BuildResult, PublishStage};
pub use publisher::ImagePublisher;
pub use pusher::{ImagePusher, validate_tag};

pub use bollard::auth::DockerCredentials;
