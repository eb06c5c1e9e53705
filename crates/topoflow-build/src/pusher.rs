//! Image push
//!
//! Pushes a built and tagged image to its registry.

use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::models::PushImageInfo;
use futures_util::StreamExt;

/// Pushes tagged images to their registry
pub struct ImagePusher {
    docker: Docker,
}

impl ImagePusher {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Push `image:tag` to the registry
    ///
    /// # Arguments
    /// * `image` - image name including the registry host, without tag
    /// * `tag` - image tag
    /// * `credentials` - registry credentials, `None` for anonymous push
    ///
    /// # Returns
    /// The full image name that was pushed
    pub async fn push(
        &self,
        image: &str,
        tag: &str,
        credentials: Option<DockerCredentials>,
    ) -> BuildResult<String> {
        let full_image = format!("{}:{}", image, tag);

        validate_tag(tag)?;

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        tracing::info!("Pushing {}", full_image);

        #[allow(deprecated)]
        let mut stream = self.docker.push_image(image, Some(options), credentials);

        let mut last_status = String::new();
        let mut error_message: Option<String> = None;

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    } else {
                        handle_progress(&full_image, &info, &mut last_status);
                    }
                }
                Err(e) => {
                    return Err(BuildError::PushFailed {
                        message: e.to_string(),
                    });
                }
            }
        }

        if let Some(err) = error_message {
            return Err(BuildError::PushFailed { message: err });
        }

        tracing::info!("Pushed {}", full_image);
        Ok(full_image)
    }
}

fn handle_progress(image: &str, info: &PushImageInfo, last_status: &mut String) {
    if let Some(status) = &info.status {
        match status.as_str() {
            // per-layer progress is too noisy to log
            "Pushing" | "Preparing" | "Waiting" => {}
            _ => {
                if status != last_status {
                    tracing::debug!(image, "{}", status);
                    *last_status = status.clone();
                }
            }
        }
    }
}

/// Docker tag constraints
///
/// - at most 128 characters
/// - letters, digits, `.`, `-`, `_` only
/// - must not start with `.` or `-`
pub fn validate_tag(tag: &str) -> BuildResult<()> {
    if tag.is_empty() {
        return Err(BuildError::InvalidTag {
            tag: "(empty)".to_string(),
        });
    }

    if tag.len() > 128 {
        return Err(BuildError::InvalidTag {
            tag: format!("Tag too long ({} characters, max 128)", tag.len()),
        });
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidTag {
            tag: tag.to_string(),
        });
    }

    for c in tag.chars() {
        if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' {
            return Err(BuildError::InvalidTag {
                tag: format!("Invalid character '{}' in tag: {}", c, tag),
            });
        }
    }

    Ok(())
}
