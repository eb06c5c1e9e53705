//! AWS CloudFormation submitter

use crate::error::AwsError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::DisplayErrorContext;
use aws_sdk_cloudformation::types::Capability;
use topoflow_cloud::{Result, StackSubmission, TemplateSubmitter};

/// Submits templates with CloudFormation CreateStack
pub struct CloudFormationSubmitter {
    client: Client,
}

impl CloudFormationSubmitter {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TemplateSubmitter for CloudFormationSubmitter {
    fn name(&self) -> &str {
        "cloudformation"
    }

    async fn submit(&self, submission: &StackSubmission) -> Result<String> {
        tracing::info!("Creating stack {}", submission.stack_name);

        let output = self
            .client
            .create_stack()
            .stack_name(&submission.stack_name)
            .template_body(&submission.template_body)
            .set_capabilities(Some(capabilities(&submission.capabilities)))
            .send()
            .await
            .map_err(|e| AwsError::sdk("CreateStack", DisplayErrorContext(&e)))?;

        let stack_id = output.stack_id().ok_or(AwsError::MissingField {
            operation: "CreateStack",
            field: "StackId",
        })?;

        tracing::info!("Stack creation started: {}", stack_id);
        Ok(stack_id.to_string())
    }
}

fn capabilities(names: &[String]) -> Vec<Capability> {
    names.iter().map(|name| Capability::from(name.as_str())).collect()
}
