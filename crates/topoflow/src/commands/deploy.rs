use colored::Colorize;
use std::path::Path;
use topoflow::{DeployError, Deployer, read_request};
use topoflow_build::{BuildError, DockerEngine, DockerRegistry};
use topoflow_cloud::CloudError;
use topoflow_cloud_aws::{CloudFormationSubmitter, EcrRegistry, load_aws_config};
use topoflow_config::RegistryProvider;

pub async fn handle(config: Option<&Path>, request: &str) -> Result<(), DeployError> {
    let settings = super::load_settings(config)?;
    let request = read_request(request)?;

    let engine = DockerEngine::connect()?;
    let aws = load_aws_config(&settings.aws).await;
    let submitter = CloudFormationSubmitter::new(&aws);

    let response = match settings.registry.provider {
        RegistryProvider::Ecr => {
            Deployer::new(engine, EcrRegistry::new(&aws), submitter, &settings)
                .run(&request)
                .await?
        }
        RegistryProvider::Docker => {
            let address = settings.registry.address.as_deref().ok_or_else(|| {
                BuildError::Registry("registry.address is required for the docker provider".into())
            })?;
            Deployer::new(engine, DockerRegistry::new(address)?, submitter, &settings)
                .run(&request)
                .await?
        }
    };

    eprintln!(
        "{} {}",
        "✓ Deployment started:".green().bold(),
        response.stack_id.cyan()
    );
    let body = serde_json::to_string_pretty(&response).map_err(CloudError::from)?;
    println!("{}", body);
    Ok(())
}
