//! Deployment template synthesis for topoflow
//!
//! Turns interpreted services and their published images into a
//! CloudFormation template, and defines the capability that submits it.

pub mod error;
pub mod submitter;
pub mod template;

pub use error::{CloudError, Result};
pub use submitter::{CAPABILITY_IAM, StackSubmission, TemplateSubmitter};
pub use template::{
    CLUSTER_LOGICAL_ID, DeploymentTemplate, Resource, TEMPLATE_FORMAT_VERSION,
    TemplateSynthesizer,
};
