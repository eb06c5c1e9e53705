//! CloudFormation template for an ECS cluster of services
//!
//! One `AWS::ECS::Cluster` shared by all services, plus a task definition
//! and a Fargate service per service.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use topoflow_config::{DeploySettings, NetworkSettings};
use topoflow_core::{ImageReference, Service};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Logical id of the shared cluster resource
pub const CLUSTER_LOGICAL_ID: &str = "ECSCluster";

const LAUNCH_TYPE: &str = "FARGATE";

/// A CloudFormation template restricted to the resources topoflow emits
///
/// Serializes to the CloudFormation document shape, so the same value backs
/// both `topo synth` output and the CreateStack body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentTemplate {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    /// Resources by logical id
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, Resource>,
}

impl DeploymentTemplate {
    pub fn new() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            resources: BTreeMap::new(),
        }
    }

    fn insert(&mut self, logical_id: String, resource: Resource) -> Result<()> {
        if self.resources.contains_key(&logical_id) {
            return Err(CloudError::DuplicateResource(logical_id));
        }
        self.resources.insert(logical_id, resource);
        Ok(())
    }

    pub fn cluster_count(&self) -> usize {
        self.resources
            .values()
            .filter(|r| matches!(r, Resource::Cluster(_)))
            .count()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn task_definition(&self, logical_id: &str) -> Option<&TaskDefinitionProperties> {
        match self.resources.get(logical_id) {
            Some(Resource::TaskDefinition(props)) => Some(props),
            _ => None,
        }
    }

    pub fn service(&self, logical_id: &str) -> Option<&ServiceProperties> {
        match self.resources.get(logical_id) {
            Some(Resource::Service(props)) => Some(props),
            _ => None,
        }
    }

    pub fn render_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for DeploymentTemplate {
    fn default() -> Self {
        Self::new()
    }
}

/// A template resource, written as `Type` plus `Properties`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", content = "Properties")]
pub enum Resource {
    #[serde(rename = "AWS::ECS::Cluster")]
    Cluster(ClusterProperties),
    #[serde(rename = "AWS::ECS::TaskDefinition")]
    TaskDefinition(TaskDefinitionProperties),
    #[serde(rename = "AWS::ECS::Service")]
    Service(ServiceProperties),
}

/// Properties of the `AWS::ECS::Cluster` shared by every service
///
/// The cluster name comes from `deploy.cluster_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterProperties {
    pub cluster_name: String,
}

/// Fargate task definition for one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDefinitionProperties {
    /// Service slug
    pub family: String,
    pub network_mode: String,
    pub requires_compatibilities: Vec<String>,
    pub cpu: String,
    pub memory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,
    pub container_definitions: Vec<ContainerDefinition>,
}

/// The single essential container of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDefinition {
    pub name: String,
    pub image: String,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
    pub environment: Vec<KeyValuePair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValuePair {
    pub name: String,
    pub value: String,
}

/// Properties of an `AWS::ECS::Service`
///
/// Each service runs one Fargate task from its own task definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceProperties {
    /// Service slug
    pub service_name: String,
    pub cluster: Ref,
    pub task_definition: Ref,
    pub desired_count: u32,
    pub launch_type: String,
    pub network_configuration: NetworkConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkConfiguration {
    pub awsvpc_configuration: AwsvpcConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AwsvpcConfiguration {
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    /// `ENABLED` or `DISABLED`
    pub assign_public_ip: String,
}

impl From<&NetworkSettings> for AwsvpcConfiguration {
    fn from(network: &NetworkSettings) -> Self {
        Self {
            subnets: network.subnets.clone(),
            security_groups: network.security_groups.clone(),
            assign_public_ip: if network.assign_public_ip {
                "ENABLED".to_string()
            } else {
                "DISABLED".to_string()
            },
        }
    }
}

/// Intrinsic `{ "Ref": "<logical id>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "Ref")]
    pub logical_id: String,
}

impl Ref {
    pub fn to(logical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
        }
    }
}

/// Turns interpreted services and their pushed images into a template
pub struct TemplateSynthesizer {
    cluster_name: String,
    cpu: String,
    memory: String,
    execution_role_arn: Option<String>,
    network: NetworkSettings,
}

impl TemplateSynthesizer {
    pub fn from_settings(settings: &DeploySettings) -> Self {
        Self {
            cluster_name: settings.cluster_name.clone(),
            cpu: settings.cpu.clone(),
            memory: settings.memory.clone(),
            execution_role_arn: settings.execution_role_arn.clone(),
            network: settings.network.clone(),
        }
    }

    /// Build the template for `services`
    ///
    /// `images` is keyed by service id; every service needs an entry.
    pub fn synthesize(
        &self,
        services: &[Service],
        images: &HashMap<String, ImageReference>,
    ) -> Result<DeploymentTemplate> {
        let mut template = DeploymentTemplate::new();
        template.insert(
            CLUSTER_LOGICAL_ID.to_string(),
            Resource::Cluster(ClusterProperties {
                cluster_name: self.cluster_name.clone(),
            }),
        )?;

        for service in services {
            let image = images
                .get(&service.id)
                .ok_or_else(|| CloudError::MissingImage {
                    service: service.name.clone(),
                })?;

            let logical = service.logical_name();
            let task_id = format!("{}TaskDefinition", logical);

            template.insert(
                task_id.clone(),
                Resource::TaskDefinition(self.task_definition(service, image)),
            )?;
            template.insert(
                format!("{}Service", logical),
                Resource::Service(ServiceProperties {
                    service_name: service.slug(),
                    cluster: Ref::to(CLUSTER_LOGICAL_ID),
                    task_definition: Ref::to(task_id.as_str()),
                    desired_count: 1,
                    launch_type: LAUNCH_TYPE.to_string(),
                    network_configuration: NetworkConfiguration {
                        awsvpc_configuration: AwsvpcConfiguration::from(&self.network),
                    },
                }),
            )?;

            tracing::debug!(service = %service.name, "Added {} and {}Service", task_id, logical);
        }

        if self.network.has_placeholders() {
            tracing::warn!(
                "Network settings still contain placeholders (deploy.network); \
                 services will not start until real subnets and security groups are set"
            );
        }

        Ok(template)
    }

    fn task_definition(&self, service: &Service, image: &ImageReference) -> TaskDefinitionProperties {
        let slug = service.slug();
        let environment = service
            .config
            .environment_pairs()
            .into_iter()
            .map(|(name, value)| KeyValuePair { name, value })
            .collect();

        TaskDefinitionProperties {
            family: slug.clone(),
            network_mode: "awsvpc".to_string(),
            requires_compatibilities: vec![LAUNCH_TYPE.to_string()],
            cpu: self.cpu.clone(),
            memory: self.memory.clone(),
            execution_role_arn: self.execution_role_arn.clone(),
            container_definitions: vec![ContainerDefinition {
                name: slug,
                image: image.uri(),
                essential: true,
                port_mappings: vec![PortMapping {
                    container_port: service.port(),
                    protocol: "tcp".to_string(),
                }],
                environment,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topoflow_core::ServiceConfig;

    const HOST: &str = "123456789.dkr.ecr.us-east-1.amazonaws.com";

    fn service(id: &str, name: &str, yaml: &str) -> Service {
        Service::new(id, name, ServiceConfig::parse(yaml).unwrap())
    }

    fn images_for(services: &[Service]) -> HashMap<String, ImageReference> {
        services
            .iter()
            .map(|s| {
                (
                    s.id.clone(),
                    ImageReference::new(&s.id, HOST, s.repository_name(), s.tag()),
                )
            })
            .collect()
    }

    fn synthesize(services: &[Service]) -> DeploymentTemplate {
        TemplateSynthesizer::from_settings(&DeploySettings::default())
            .synthesize(services, &images_for(services))
            .unwrap()
    }

    fn container<'a>(template: &'a DeploymentTemplate, logical: &str) -> &'a ContainerDefinition {
        &template
            .task_definition(&format!("{}TaskDefinition", logical))
            .unwrap()
            .container_definitions[0]
    }

    #[test]
    fn test_port_from_config() {
        let services = vec![service("c1", "api", "port: 9090\n")];
        let template = synthesize(&services);

        let port = &container(&template, "Api").port_mappings[0];
        assert_eq!(port.container_port, 9090);
        assert_eq!(port.protocol, "tcp");
    }

    #[test]
    fn test_default_port() {
        let services = vec![service("c1", "api", "")];
        let template = synthesize(&services);
        assert_eq!(container(&template, "Api").port_mappings[0].container_port, 8080);
    }

    #[test]
    fn test_environment_pairs() {
        let services = vec![service(
            "c1",
            "api",
            "environment:\n  B_KEY: two\n  A_KEY: 1\n",
        )];
        let template = synthesize(&services);

        assert_eq!(
            container(&template, "Api").environment,
            vec![
                KeyValuePair {
                    name: "A_KEY".to_string(),
                    value: "1".to_string()
                },
                KeyValuePair {
                    name: "B_KEY".to_string(),
                    value: "two".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_resource_counts() {
        let services = vec![
            service("c1", "Service 1", ""),
            service("c2", "Service 2", ""),
            service("c3", "billing", ""),
        ];
        let template = synthesize(&services);

        assert_eq!(template.cluster_count(), 1);
        assert_eq!(template.resource_count(), 1 + 2 * services.len());
        assert!(template.service("Service1Service").is_some());
        assert!(template.service("BillingService").is_some());
    }

    #[test]
    fn test_empty_service_list_has_only_cluster() {
        let template = synthesize(&[]);
        assert_eq!(template.cluster_count(), 1);
        assert_eq!(template.resource_count(), 1);
    }

    #[test]
    fn test_task_definition_fields() {
        let services = vec![service("c1", "User Service", "version: \"2.0\"\n")];
        let template = synthesize(&services);

        let task = template
            .task_definition("UserServiceTaskDefinition")
            .unwrap();
        assert_eq!(task.family, "user-service");
        assert_eq!(task.network_mode, "awsvpc");
        assert_eq!(task.requires_compatibilities, vec!["FARGATE"]);
        assert_eq!(task.cpu, "256");
        assert_eq!(task.memory, "512");
        assert_eq!(task.execution_role_arn, None);

        let container = &task.container_definitions[0];
        assert_eq!(container.name, "user-service");
        assert_eq!(
            container.image,
            format!("{}/user-service-repo:2.0", HOST)
        );

        let svc = template.service("UserServiceService").unwrap();
        assert_eq!(svc.service_name, "user-service");
        assert_eq!(svc.desired_count, 1);
        assert_eq!(svc.launch_type, "FARGATE");
        assert_eq!(svc.cluster, Ref::to("ECSCluster"));
        assert_eq!(svc.task_definition, Ref::to("UserServiceTaskDefinition"));
        assert_eq!(
            svc.network_configuration.awsvpc_configuration.assign_public_ip,
            "ENABLED"
        );
    }

    #[test]
    fn test_missing_image() {
        let services = vec![service("c1", "api", "")];
        let result = TemplateSynthesizer::from_settings(&DeploySettings::default())
            .synthesize(&services, &HashMap::new());
        assert!(matches!(result, Err(CloudError::MissingImage { service }) if service == "api"));
    }

    #[test]
    fn test_render_json_shape() {
        let services = vec![service("c1", "api", "port: 9090\n")];
        let json: serde_json::Value =
            serde_json::from_str(&synthesize(&services).render_json().unwrap()).unwrap();

        assert_eq!(json["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(json["Resources"]["ECSCluster"]["Type"], "AWS::ECS::Cluster");
        assert_eq!(
            json["Resources"]["ECSCluster"]["Properties"]["ClusterName"],
            "MicroservicesCluster"
        );
        assert_eq!(
            json["Resources"]["ApiService"]["Properties"]["ServiceName"],
            "api"
        );
        assert_eq!(
            json["Resources"]["ApiService"]["Properties"]["Cluster"]["Ref"],
            "ECSCluster"
        );
        assert_eq!(
            json["Resources"]["ApiTaskDefinition"]["Properties"]["ContainerDefinitions"][0]
                ["PortMappings"][0]["ContainerPort"],
            9090
        );
        assert_eq!(
            json["Resources"]["ApiService"]["Properties"]["NetworkConfiguration"]
                ["AwsvpcConfiguration"]["Subnets"][0],
            "<subnet-id-1>"
        );
        assert!(
            json["Resources"]["ApiTaskDefinition"]["Properties"]
                .get("ExecutionRoleArn")
                .is_none()
        );
    }

    #[test]
    fn test_render_yaml() {
        let services = vec![service("c1", "api", "")];
        let yaml = synthesize(&services).render_yaml().unwrap();
        assert!(yaml.contains("AWSTemplateFormatVersion:"));
        assert!(yaml.contains("2010-09-09"));
        assert!(yaml.contains("Type: AWS::ECS::TaskDefinition"));
    }
}
