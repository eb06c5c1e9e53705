//! AWS backends for topoflow
//!
//! ECR as the image registry and CloudFormation as the template submitter.

pub mod cloudformation;
pub mod ecr;
pub mod error;

pub use cloudformation::CloudFormationSubmitter;
pub use ecr::EcrRegistry;
pub use error::{AwsError, Result};

use aws_config::{BehaviorVersion, Region, SdkConfig};
use topoflow_config::AwsSettings;

/// Load the shared SDK configuration
///
/// Credentials and region follow the usual AWS chain (environment, profile,
/// instance metadata); `aws.region` in the settings overrides the region.
pub async fn load_aws_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let config = loader.load().await;

    match config.region() {
        Some(region) => tracing::debug!("AWS region: {}", region),
        None => tracing::warn!("No AWS region configured; set aws.region or AWS_REGION"),
    }
    config
}
