//! Per-service image publishing
//!
//! For every service: pack the context, build `<slug>:<tag>` locally, make
//! sure the registry repository exists, tag the image with its registry
//! name and push it.

use crate::context::ContextBuilder;
use crate::dockerfile::DockerfileTemplate;
use crate::engine::{ContainerEngine, ContainerRegistry, RepositoryOutcome};
use crate::error::{BuildError, BuildResult, PublishStage};
use crate::pusher::validate_tag;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use topoflow_config::{BuildSettings, Timeouts};
use topoflow_core::{ImageReference, Service};

/// Turns services into pushed images
///
/// For each service: pack context, build, ensure the repository, authorize,
/// tag and push. Every external call runs under its configured timeout, and
/// a failure names the service and the step that failed.
pub struct ImagePublisher<E, R> {
    engine: E,
    registry: R,
    context_root: PathBuf,
    dockerfile: DockerfileTemplate,
    timeouts: Timeouts,
}

impl<E, R> ImagePublisher<E, R>
where
    E: ContainerEngine,
    R: ContainerRegistry,
{
    pub fn new(engine: E, registry: R, build: &BuildSettings, timeouts: &Timeouts) -> Self {
        Self {
            engine,
            registry,
            context_root: build.context_root.clone(),
            dockerfile: DockerfileTemplate::from_settings(build),
            timeouts: timeouts.clone(),
        }
    }

    /// Publish every service in order, stopping at the first failure
    ///
    /// The map is keyed by service id.
    pub async fn publish_all(
        &self,
        services: &[Service],
    ) -> BuildResult<HashMap<String, ImageReference>> {
        let mut images = HashMap::with_capacity(services.len());
        for service in services {
            let image = self.publish(service).await?;
            images.insert(service.id.clone(), image);
        }
        Ok(images)
    }

    /// Publish one service and return where its image landed
    pub async fn publish(&self, service: &Service) -> BuildResult<ImageReference> {
        let slug = service.slug();
        let tag = service.tag().to_string();
        let fail = |stage: PublishStage| {
            let name = service.name.clone();
            move |e: BuildError| e.for_service(name, stage)
        };

        validate_tag(&tag).map_err(fail(PublishStage::Build))?;

        let context = self
            .pack_context(&slug)
            .await
            .map_err(fail(PublishStage::Context))?;

        let local_tag = format!("{}:{}", slug, tag);
        with_timeout(
            "image build",
            self.timeouts.build(),
            self.engine.build_image(context, &local_tag),
        )
        .await
        .map_err(fail(PublishStage::Build))?;

        let repository = service.repository_name();
        let outcome = with_timeout(
            "repository creation",
            self.timeouts.registry(),
            self.registry.ensure_repository(&repository),
        )
        .await
        .map_err(fail(PublishStage::Repository))?;
        match outcome {
            RepositoryOutcome::Created => {
                tracing::info!(registry = self.registry.name(), "Created repository {}", repository)
            }
            RepositoryOutcome::AlreadyExists => {
                tracing::debug!(registry = self.registry.name(), "Repository {} exists", repository)
            }
        }

        let authorization = with_timeout(
            "registry authorization",
            self.timeouts.registry(),
            self.registry.authorize(),
        )
        .await
        .map_err(fail(PublishStage::Authorize))?;

        let image = ImageReference::new(&service.id, authorization.registry, repository, tag);
        let image_name = image.image_name();

        with_timeout(
            "image tag",
            self.timeouts.registry(),
            self.engine.tag_image(&local_tag, &image_name, &image.tag),
        )
        .await
        .map_err(fail(PublishStage::Tag))?;

        with_timeout(
            "image push",
            self.timeouts.push(),
            self.engine
                .push_image(&image_name, &image.tag, authorization.credentials),
        )
        .await
        .map_err(fail(PublishStage::Push))?;

        tracing::info!(service = %service.name, "Published {}", image);
        Ok(image)
    }

    /// Tar and gzip the build context off the async workers
    async fn pack_context(&self, slug: &str) -> BuildResult<Vec<u8>> {
        let context_path = ContextBuilder::resolve_context(&self.context_root, slug)?;
        let dockerfile = self.dockerfile.render()?;
        tokio::task::spawn_blocking(move || {
            ContextBuilder::create_context(&context_path, &dockerfile)
        })
        .await
        .map_err(|e| BuildError::Io(std::io::Error::other(e)))?
    }
}

async fn with_timeout<T>(
    operation: &str,
    limit: Duration,
    fut: impl Future<Output = BuildResult<T>>,
) -> BuildResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(BuildError::Timeout {
            operation: operation.to_string(),
            secs: limit.as_secs(),
        }),
    }
}
