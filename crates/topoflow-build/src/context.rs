use crate::error::{BuildError, BuildResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::{Path, PathBuf};
use tar::Builder;

/// Build context packing
///
/// A context is a gzip-compressed tar of the service directory with the
/// generated Dockerfile added at its root.
pub struct ContextBuilder;

impl ContextBuilder {
    /// Pick the build context of a service
    ///
    /// `<root>/<slug>` when that directory exists, otherwise `<root>` itself.
    pub fn resolve_context(root: &Path, slug: &str) -> BuildResult<PathBuf> {
        let service_dir = root.join(slug);
        if service_dir.is_dir() {
            tracing::debug!(
                "Using service directory as build context: {}",
                service_dir.display()
            );
            return Ok(service_dir);
        }

        if !root.is_dir() {
            return Err(BuildError::ContextNotFound(root.to_path_buf()));
        }

        Ok(root.to_path_buf())
    }

    /// Pack a directory plus the generated Dockerfile as a tar.gz archive
    pub fn create_context(context_path: &Path, dockerfile: &str) -> BuildResult<Vec<u8>> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        if !context_path.is_dir() {
            return Err(BuildError::ContextNotFound(context_path.to_path_buf()));
        }

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            tar.append_dir_all(".", context_path)?;

            // The generated Dockerfile shadows any Dockerfile in the context
            let mut header = tar::Header::new_gnu();
            header.set_path("Dockerfile")?;
            header.set_size(dockerfile.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append(&header, dockerfile.as_bytes())?;

            tar.into_inner()?.finish()?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "Build context is large ({}MB); consider a .dockerignore or a per-service directory",
                size / 1024 / 1024
            );
        }
    }
}
