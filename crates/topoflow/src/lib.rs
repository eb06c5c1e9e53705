//! topoflow
//!
//! Deploys a microservice topology exported from a diagram editor: every
//! service node becomes a container image in the registry and an ECS Fargate
//! service in a CloudFormation stack.

pub mod error;
pub mod pipeline;
pub mod request;

pub use error::{DeployError, ErrorKind};
pub use pipeline::{Deployer, interpret_services, preview_images};
pub use request::read_request;
