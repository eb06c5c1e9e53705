//! Registry authentication
//!
//! Turns registry tokens or the Docker config.json into bollard
//! `DockerCredentials`.

use crate::error::{BuildError, BuildResult};
use base64::Engine;
use bollard::auth::DockerCredentials;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Credentials for pushing to one registry
#[derive(Debug, Clone)]
pub struct RegistryAuthorization {
    /// Registry host without scheme, used as the image name prefix
    pub registry: String,
    pub credentials: Option<DockerCredentials>,
}

impl RegistryAuthorization {
    /// Build from a registry endpoint and a base64 `user:password` token
    ///
    /// ECR hands out exactly this pair: `proxyEndpoint` is an `https://` URL
    /// and the token decodes to `AWS:<password>`.
    pub fn from_token(endpoint: &str, token: &str) -> BuildResult<Self> {
        let registry = registry_host(endpoint);
        let credentials = decode_auth(token, &registry)?.ok_or_else(|| BuildError::AuthFailed {
            registry: registry.clone(),
            message: "token is not of the form user:password".to_string(),
        })?;

        Ok(Self {
            registry,
            credentials: Some(credentials),
        })
    }
}

/// Strip scheme and trailing slash from a registry endpoint
///
/// # Examples
/// - `https://123456789.dkr.ecr.us-east-1.amazonaws.com` -> `123456789.dkr.ecr.us-east-1.amazonaws.com`
/// - `localhost:5000/` -> `localhost:5000`
pub fn registry_host(endpoint: &str) -> String {
    let host = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .unwrap_or(endpoint);
    host.trim_end_matches('/').to_string()
}

/// Decode a base64 `username:password` auth string
fn decode_auth(auth_b64: &str, registry: &str) -> BuildResult<Option<DockerCredentials>> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth_b64.trim())
        .map_err(|e| BuildError::AuthFailed {
            registry: registry.to_string(),
            message: format!("Failed to decode auth: {}", e),
        })?;

    let auth_str = String::from_utf8(decoded).map_err(|e| BuildError::AuthFailed {
        registry: registry.to_string(),
        message: format!("Invalid UTF-8 in auth: {}", e),
    })?;

    if let Some((username, password)) = auth_str.split_once(':') {
        Ok(Some(DockerCredentials {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            serveraddress: Some(registry.to_string()),
            ..Default::default()
        }))
    } else {
        Ok(None)
    }
}

/// Subset of the Docker config.json
#[derive(Debug, Deserialize)]
struct DockerConfig {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
}

#[derive(Debug, Deserialize)]
struct AuthEntry {
    /// Base64 encoded "username:password"
    auth: Option<String>,
}

/// Credentials stored by `docker login`
#[derive(Debug)]
pub struct DockerConfigAuth {
    config_path: PathBuf,
}

impl Default for DockerConfigAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerConfigAuth {
    /// Uses `$DOCKER_CONFIG/config.json`, defaulting to `~/.docker/config.json`
    pub fn new() -> Self {
        let config_path = std::env::var("DOCKER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|h| h.join(".docker"))
                    .unwrap_or_else(|| PathBuf::from(".docker"))
            })
            .join("config.json");

        Self { config_path }
    }

    pub fn with_config_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Look up credentials for a registry host
    ///
    /// A missing config.json or registry entry means anonymous access.
    pub fn get_credentials(&self, registry: &str) -> BuildResult<Option<DockerCredentials>> {
        if !self.config_path.exists() {
            tracing::debug!("Docker config.json not found at {:?}", self.config_path);
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&self.config_path).map_err(|e| BuildError::AuthFailed {
                registry: registry.to_string(),
                message: format!("Failed to read config.json: {}", e),
            })?;

        let config: DockerConfig =
            serde_json::from_str(&content).map_err(|e| BuildError::AuthFailed {
                registry: registry.to_string(),
                message: format!("Failed to parse config.json: {}", e),
            })?;

        // `docker login` may store the key with a scheme
        let entry = config.auths.get(registry).or_else(|| {
            config
                .auths
                .iter()
                .find(|(key, _)| registry_host(key) == registry)
                .map(|(_, entry)| entry)
        });

        match entry.and_then(|e| e.auth.as_deref()) {
            Some(auth_b64) => {
                tracing::debug!("Found credentials in auths for {}", registry);
                decode_auth(auth_b64, registry)
            }
            None => {
                tracing::debug!("No credentials found for {}", registry);
                Ok(None)
            }
        }
    }
}
