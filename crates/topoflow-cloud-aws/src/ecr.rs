//! Amazon ECR registry

use crate::error::AwsError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecr::Client;
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types::AuthorizationData;
use topoflow_build::{
    BuildResult, ContainerRegistry, RegistryAuthorization, RepositoryOutcome,
};

/// Amazon ECR as the image registry
///
/// One private repository per service. Push credentials come from
/// GetAuthorizationToken and are valid for twelve hours.
pub struct EcrRegistry {
    client: Client,
}

impl EcrRegistry {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContainerRegistry for EcrRegistry {
    fn name(&self) -> &str {
        "ecr"
    }

    async fn ensure_repository(&self, name: &str) -> BuildResult<RepositoryOutcome> {
        match self
            .client
            .create_repository()
            .repository_name(name)
            .send()
            .await
        {
            Ok(_) => Ok(RepositoryOutcome::Created),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_repository_already_exists_exception()) =>
            {
                Ok(RepositoryOutcome::AlreadyExists)
            }
            Err(err) => Err(AwsError::sdk("CreateRepository", DisplayErrorContext(&err)).into()),
        }
    }

    async fn authorize(&self) -> BuildResult<RegistryAuthorization> {
        let output = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| AwsError::sdk("GetAuthorizationToken", DisplayErrorContext(&e)))?;

        authorization_from(output.authorization_data())
    }
}

/// Registry host and credentials from the first authorization entry
fn authorization_from(data: &[AuthorizationData]) -> BuildResult<RegistryAuthorization> {
    let entry = data.first().ok_or(AwsError::MissingField {
        operation: "GetAuthorizationToken",
        field: "authorizationData",
    })?;
    let token = entry.authorization_token().ok_or(AwsError::MissingField {
        operation: "GetAuthorizationToken",
        field: "authorizationToken",
    })?;
    let endpoint = entry.proxy_endpoint().ok_or(AwsError::MissingField {
        operation: "GetAuthorizationToken",
        field: "proxyEndpoint",
    })?;

    RegistryAuthorization::from_token(endpoint, token)
}
