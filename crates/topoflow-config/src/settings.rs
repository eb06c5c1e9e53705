//! Settings model
//!
//! Every field has a default, so a settings file only needs the values that
//! differ:
//!
//! ```yaml
//! aws:
//!   region: ap-northeast-1
//! deploy:
//!   stack_name: ShopStack
//!   network:
//!     subnets: [subnet-0a1b2c, subnet-3d4e5f]
//!     security_groups: [sg-012345]
//! timeouts:
//!   push_secs: 1800
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder subnets submitted until the operator configures real ones
pub const PLACEHOLDER_SUBNETS: [&str; 2] = ["<subnet-id-1>", "<subnet-id-2>"];

/// Placeholder security group submitted until the operator configures a real one
pub const PLACEHOLDER_SECURITY_GROUP: &str = "<security-group-id>";

/// topoflow settings file (`topoflow.yaml`)
///
/// Every section is optional; missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub aws: AwsSettings,
    pub registry: RegistrySettings,
    pub build: BuildSettings,
    pub deploy: DeploySettings,
    pub timeouts: Timeouts,
}

impl Settings {
    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.deploy.stack_name.trim().is_empty() {
            return Err(ConfigError::Invalid("deploy.stack_name is empty".into()));
        }
        if self.deploy.cluster_name.trim().is_empty() {
            return Err(ConfigError::Invalid("deploy.cluster_name is empty".into()));
        }
        if self.registry.provider == RegistryProvider::Docker && self.registry.address.is_none() {
            return Err(ConfigError::Invalid(
                "registry.address is required for the docker registry provider".into(),
            ));
        }
        if self.deploy.network.subnets.is_empty() {
            return Err(ConfigError::Invalid(
                "deploy.network.subnets must list at least one subnet".into(),
            ));
        }
        for (name, secs) in [
            ("build_secs", self.timeouts.build_secs),
            ("registry_secs", self.timeouts.registry_secs),
            ("push_secs", self.timeouts.push_secs),
            ("submit_secs", self.timeouts.submit_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid(format!(
                    "timeouts.{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    /// Falls back to the SDK's region chain (AWS_REGION, profile) when unset
    pub region: Option<String>,
}

/// Where images are pushed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub provider: RegistryProvider,
    /// Registry host for the docker provider (e.g. `localhost:5000`)
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryProvider {
    /// Amazon ECR: repositories are created, credentials come from the registry
    #[default]
    Ecr,
    /// Plain registry: credentials come from the Docker config.json
    Docker,
}

/// Image build settings
///
/// The Dockerfile template is fixed; only the file names it assumes are
/// configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Directory the build contexts are taken from
    pub context_root: PathBuf,
    pub base_image: String,
    pub requirements_file: String,
    pub entrypoint: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            context_root: PathBuf::from("."),
            base_image: "python:3.9-slim".to_string(),
            requirements_file: "requirements.txt".to_string(),
            entrypoint: "app.py".to_string(),
        }
    }
}

/// Stack and task sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    pub stack_name: String,
    pub cluster_name: String,
    /// Task CPU units
    pub cpu: String,
    /// Task memory (MiB)
    pub memory: String,
    /// Role the agent uses to pull images from the registry
    pub execution_role_arn: Option<String>,
    pub network: NetworkSettings,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            stack_name: "MicroservicesStack".to_string(),
            cluster_name: "MicroservicesCluster".to_string(),
            cpu: "256".to_string(),
            memory: "512".to_string(),
            execution_role_arn: None,
            network: NetworkSettings::default(),
        }
    }
}

/// awsvpc network of every service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub assign_public_ip: bool,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            subnets: PLACEHOLDER_SUBNETS.iter().map(|s| s.to_string()).collect(),
            security_groups: vec![PLACEHOLDER_SECURITY_GROUP.to_string()],
            assign_public_ip: true,
        }
    }
}

impl NetworkSettings {
    /// Whether any placeholder value is still in place
    pub fn has_placeholders(&self) -> bool {
        self.subnets
            .iter()
            .chain(self.security_groups.iter())
            .any(|v| v.starts_with('<') && v.ends_with('>'))
    }
}

/// Upper bounds for external calls, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub build_secs: u64,
    pub registry_secs: u64,
    pub push_secs: u64,
    pub submit_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            build_secs: 900,
            registry_secs: 60,
            push_secs: 900,
            submit_secs: 120,
        }
    }
}

impl Timeouts {
    pub fn build(&self) -> Duration {
        Duration::from_secs(self.build_secs)
    }

    pub fn registry(&self) -> Duration {
        Duration::from_secs(self.registry_secs)
    }

    pub fn push(&self) -> Duration {
        Duration::from_secs(self.push_secs)
    }

    pub fn submit(&self) -> Duration {
        Duration::from_secs(self.submit_secs)
    }
}
