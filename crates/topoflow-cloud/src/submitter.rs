//! Template submission

use crate::error::Result;
use crate::template::DeploymentTemplate;
use async_trait::async_trait;

/// Lets the stack create IAM resources
pub const CAPABILITY_IAM: &str = "CAPABILITY_IAM";

/// One create-stack call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSubmission {
    pub stack_name: String,
    /// Rendered template document
    pub template_body: String,
    pub capabilities: Vec<String>,
}

impl StackSubmission {
    pub fn new(stack_name: impl Into<String>, template: &DeploymentTemplate) -> Result<Self> {
        Ok(Self {
            stack_name: stack_name.into(),
            template_body: template.render_json()?,
            capabilities: vec![CAPABILITY_IAM.to_string()],
        })
    }
}

/// Control plane that executes deployment templates
#[async_trait]
pub trait TemplateSubmitter: Send + Sync {
    /// Provider name for logs (e.g. "cloudformation")
    fn name(&self) -> &str;

    /// Create a new stack and return its identifier
    ///
    /// There is no update path: an existing stack with the same name is an
    /// error reported by the provider.
    async fn submit(&self, submission: &StackSubmission) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSubmitter {
        stacks: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TemplateSubmitter for RecordingSubmitter {
        fn name(&self) -> &str {
            "recording"
        }

        async fn submit(&self, submission: &StackSubmission) -> Result<String> {
            let mut stacks = self.stacks.lock().unwrap();
            if stacks.contains(&submission.stack_name) {
                return Err(CloudError::ApiError(format!(
                    "Stack [{}] already exists",
                    submission.stack_name
                )));
            }
            stacks.push(submission.stack_name.clone());
            Ok(format!("stack/{}/1", submission.stack_name))
        }
    }

    #[test]
    fn test_submission_body_is_template_json() {
        let submission =
            StackSubmission::new("MicroservicesStack", &DeploymentTemplate::new()).unwrap();

        assert_eq!(submission.stack_name, "MicroservicesStack");
        assert_eq!(submission.capabilities, vec!["CAPABILITY_IAM"]);
        let body: serde_json::Value = serde_json::from_str(&submission.template_body).unwrap();
        assert_eq!(body["AWSTemplateFormatVersion"], "2010-09-09");
    }

    #[tokio::test]
    async fn test_resubmitting_surfaces_provider_error() {
        let submitter = RecordingSubmitter::default();
        let submission =
            StackSubmission::new("MicroservicesStack", &DeploymentTemplate::new()).unwrap();

        let id = submitter.submit(&submission).await.unwrap();
        assert_eq!(id, "stack/MicroservicesStack/1");
        assert!(matches!(
            submitter.submit(&submission).await,
            Err(CloudError::ApiError(_))
        ));
    }
}
