//! Container engine and registry abstractions
//!
//! The publisher only talks to these traits so that the Docker daemon and
//! the registry backend can be swapped (or faked in tests).

use crate::auth::{DockerConfigAuth, RegistryAuthorization, registry_host};
use crate::builder::ImageBuilder;
use crate::error::{BuildError, BuildResult};
use crate::pusher::ImagePusher;
use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;

/// Builds, tags and pushes images
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Build a packed tar.gz context into a local image named `tag`
    async fn build_image(&self, context: Vec<u8>, tag: &str) -> BuildResult<()>;

    /// Give the local image `source` the name `repository:tag`
    ///
    /// `repository` includes the registry host.
    async fn tag_image(&self, source: &str, repository: &str, tag: &str) -> BuildResult<()>;

    /// Push `repository:tag`
    ///
    /// Returns the reference that was pushed.
    async fn push_image(
        &self,
        repository: &str,
        tag: &str,
        credentials: Option<DockerCredentials>,
    ) -> BuildResult<String>;
}

/// Docker daemon reached through bollard
pub struct DockerEngine {
    builder: ImageBuilder,
    pusher: ImagePusher,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self {
            builder: ImageBuilder::new(docker.clone()),
            pusher: ImagePusher::new(docker),
        }
    }

    /// Connect using `DOCKER_HOST` or the platform default socket
    pub fn connect() -> BuildResult<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self::new(docker))
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn build_image(&self, context: Vec<u8>, tag: &str) -> BuildResult<()> {
        self.builder.build_image(context, tag).await
    }

    async fn tag_image(&self, source: &str, repository: &str, tag: &str) -> BuildResult<()> {
        self.builder.tag_image(source, repository, tag).await
    }

    async fn push_image(
        &self,
        repository: &str,
        tag: &str,
        credentials: Option<DockerCredentials>,
    ) -> BuildResult<String> {
        self.pusher.push(repository, tag, credentials).await
    }
}

/// Result of asking the registry for a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOutcome {
    Created,
    AlreadyExists,
}

/// Image registry holding one repository per service
#[async_trait]
pub trait ContainerRegistry: Send + Sync {
    /// Registry name for logs (e.g. "ecr")
    fn name(&self) -> &str;

    /// Create the repository unless it already exists
    ///
    /// An existing repository is not an error.
    async fn ensure_repository(&self, name: &str) -> BuildResult<RepositoryOutcome>;

    /// Registry host and push credentials
    async fn authorize(&self) -> BuildResult<RegistryAuthorization>;
}

/// Plain Docker registry (Docker Hub, GHCR, a local `registry:2`)
///
/// Repositories are created implicitly on first push; credentials come from
/// `docker login`.
pub struct DockerRegistry {
    host: String,
    auth: DockerConfigAuth,
}

impl DockerRegistry {
    pub fn new(address: &str) -> BuildResult<Self> {
        Self::with_auth(address, DockerConfigAuth::new())
    }

    pub fn with_auth(address: &str, auth: DockerConfigAuth) -> BuildResult<Self> {
        let host = registry_host(address);
        if host.is_empty() {
            return Err(BuildError::Registry(
                "registry address must not be empty".to_string(),
            ));
        }
        Ok(Self { host, auth })
    }
}

#[async_trait]
impl ContainerRegistry for DockerRegistry {
    fn name(&self) -> &str {
        "docker"
    }

    async fn ensure_repository(&self, name: &str) -> BuildResult<RepositoryOutcome> {
        tracing::debug!("{}/{} is created on first push", self.host, name);
        Ok(RepositoryOutcome::AlreadyExists)
    }

    async fn authorize(&self) -> BuildResult<RegistryAuthorization> {
        let credentials = self.auth.get_credentials(&self.host)?;
        if credentials.is_none() {
            tracing::warn!("No docker login found for {}, pushing anonymously", self.host);
        }
        Ok(RegistryAuthorization {
            registry: self.host.clone(),
            credentials,
        })
    }
}
