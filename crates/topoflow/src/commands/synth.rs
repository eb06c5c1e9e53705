use crate::Format;
use std::path::Path;
use topoflow::{DeployError, interpret_services, preview_images, read_request};
use topoflow_cloud::TemplateSynthesizer;
use topoflow_config::Settings;

pub fn handle(
    config: Option<&Path>,
    request: &str,
    registry: Option<String>,
    format: Format,
) -> Result<(), DeployError> {
    let settings = super::load_settings(config)?;
    let request = read_request(request)?;
    let services = interpret_services(&request)?;

    let registry = registry.unwrap_or_else(|| predicted_registry(&settings));
    let images = preview_images(&services, &registry);
    let template = TemplateSynthesizer::from_settings(&settings.deploy).synthesize(&services, &images)?;

    let rendered = match format {
        Format::Yaml => template.render_yaml()?,
        Format::Json => template.render_json()?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Registry host to show when none is given on the command line
fn predicted_registry(settings: &Settings) -> String {
    if let Some(address) = &settings.registry.address {
        return topoflow_build::registry_host(address);
    }
    match &settings.aws.region {
        Some(region) => format!("<account-id>.dkr.ecr.{}.amazonaws.com", region),
        None => "<registry>".to_string(),
    }
}
