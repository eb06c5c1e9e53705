//! The deploy pipeline
//!
//! interpret -> publish images -> synthesize template -> submit stack,
//! one service at a time.

use crate::error::DeployError;
use std::collections::HashMap;
use std::time::Duration;
use topoflow_build::{ContainerEngine, ContainerRegistry, ImagePublisher};
use topoflow_cloud::{
    CloudError, DeploymentTemplate, StackSubmission, TemplateSubmitter, TemplateSynthesizer,
};
use topoflow_config::Settings;
use topoflow_core::{DeployRequest, DeployResponse, FlowError, ImageReference, Service, interpret};

/// Runs a deploy request end to end
pub struct Deployer<E, R, S> {
    publisher: ImagePublisher<E, R>,
    synthesizer: TemplateSynthesizer,
    submitter: S,
    stack_name: String,
    submit_timeout: Duration,
}

impl<E, R, S> Deployer<E, R, S>
where
    E: ContainerEngine,
    R: ContainerRegistry,
    S: TemplateSubmitter,
{
    pub fn new(engine: E, registry: R, submitter: S, settings: &Settings) -> Self {
        Self {
            publisher: ImagePublisher::new(engine, registry, &settings.build, &settings.timeouts),
            synthesizer: TemplateSynthesizer::from_settings(&settings.deploy),
            submitter,
            stack_name: settings.deploy.stack_name.clone(),
            submit_timeout: settings.timeouts.submit(),
        }
    }

    /// Run the whole pipeline for one request
    ///
    /// Images already pushed stay in the registry when a later step fails.
    pub async fn run(&self, request: &DeployRequest) -> Result<DeployResponse, DeployError> {
        let services = interpret_services(request)?;
        tracing::info!("Deploying {} service(s)", services.len());

        let images = self.publisher.publish_all(&services).await?;
        tracing::info!("Published {} image(s)", images.len());

        let template = self.synthesizer.synthesize(&services, &images)?;
        tracing::info!(
            resources = template.resource_count(),
            "Synthesized deployment template"
        );

        let stack_id = self.submit(&template).await?;
        Ok(DeployResponse::started(stack_id))
    }

    async fn submit(&self, template: &DeploymentTemplate) -> Result<String, DeployError> {
        let submission = StackSubmission::new(&self.stack_name, template)?;
        tracing::info!(
            provider = self.submitter.name(),
            "Submitting stack {}",
            submission.stack_name
        );

        match tokio::time::timeout(self.submit_timeout, self.submitter.submit(&submission)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CloudError::Timeout {
                operation: "stack submission".to_string(),
                secs: self.submit_timeout.as_secs(),
            }
            .into()),
        }
    }
}

/// Interpret a request, rejecting graphs without services
pub fn interpret_services(request: &DeployRequest) -> Result<Vec<Service>, DeployError> {
    let services = interpret(request)?;
    if services.is_empty() {
        return Err(FlowError::NoServices.into());
    }
    Ok(services)
}

/// Image references the publisher would produce, without building anything
pub fn preview_images(services: &[Service], registry: &str) -> HashMap<String, ImageReference> {
    services
        .iter()
        .map(|s| {
            (
                s.id.clone(),
                ImageReference::new(&s.id, registry, s.repository_name(), s.tag()),
            )
        })
        .collect()
}
