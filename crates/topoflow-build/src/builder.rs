use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use bytes::Bytes;
use futures_util::stream::StreamExt;
use http_body_util::{Either, Full};

/// Builds and tags images on the Docker daemon
///
/// Build output is streamed and logged at debug level. The first error
/// reported by the daemon fails the build.
pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Build an image from a packed context
    pub async fn build_image(&self, context_data: Vec<u8>, tag: &str) -> BuildResult<()> {
        tracing::info!("Building image: {}", tag);

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag,
            rm: true,
            forcerm: true, // remove intermediate containers even on failure
            pull: true,
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);

        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(output) => {
                    self.handle_build_output(tag, output)?;
                }
                Err(e) => {
                    return Err(BuildError::DockerConnection(e));
                }
            }
        }

        tracing::info!("Successfully built: {}", tag);
        Ok(())
    }

    fn handle_build_output(&self, tag: &str, output: bollard::models::BuildInfo) -> BuildResult<()> {
        if let Some(stream) = output.stream {
            let line = stream.trim_end();
            if !line.is_empty() {
                tracing::debug!(image = tag, "{}", line);
            }
        }

        if let Some(error) = output.error {
            return Err(BuildError::BuildFailed(error));
        }

        if let Some(error_detail) = output.error_detail {
            let error_msg = error_detail
                .message
                .unwrap_or_else(|| "Unknown build error".to_string());
            return Err(BuildError::BuildFailed(error_msg));
        }

        if let Some(status) = output.status {
            tracing::debug!(image = tag, "{}", status);
        }

        Ok(())
    }

    /// Give a local image a registry name
    pub async fn tag_image(&self, source: &str, repository: &str, tag: &str) -> BuildResult<()> {
        tracing::debug!("Tagging {} as {}:{}", source, repository, tag);

        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions {
            repo: repository,
            tag,
        };

        self.docker.tag_image(source, Some(options)).await?;
        Ok(())
    }
}
