//! Generated Dockerfile
//!
//! Every service is built from the same template; only the file names it
//! assumes come from the build settings.

use crate::error::BuildResult;
use tera::{Context, Tera};
use topoflow_config::BuildSettings;

const TEMPLATE: &str = r#"FROM {{ base_image }}
WORKDIR /app
COPY {{ requirements_file }} .
RUN pip install --no-cache-dir -r {{ requirements_file }}
COPY . .
CMD ["python", "{{ entrypoint }}"]
"#;

#[derive(Debug, Clone)]
pub struct DockerfileTemplate {
    base_image: String,
    requirements_file: String,
    entrypoint: String,
}

impl DockerfileTemplate {
    pub fn from_settings(settings: &BuildSettings) -> Self {
        Self {
            base_image: settings.base_image.clone(),
            requirements_file: settings.requirements_file.clone(),
            entrypoint: settings.entrypoint.clone(),
        }
    }

    pub fn render(&self) -> BuildResult<String> {
        let mut context = Context::new();
        context.insert("base_image", &self.base_image);
        context.insert("requirements_file", &self.requirements_file);
        context.insert("entrypoint", &self.entrypoint);
        Ok(Tera::one_off(TEMPLATE, &context, false)?)
    }
}

impl Default for DockerfileTemplate {
    fn default() -> Self {
        Self::from_settings(&BuildSettings::default())
    }
}
