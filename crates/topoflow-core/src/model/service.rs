//! Service definition

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Container port used when the configuration leaves `port` out
pub const DEFAULT_PORT: u16 = 8080;

/// Image tag used when the configuration leaves `version` out
pub const DEFAULT_TAG: &str = "latest";

/// A deployable service extracted from one graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Graph node id, unique within one request
    pub id: String,
    /// Display name from the services table
    pub name: String,
    pub config: ServiceConfig,
}

impl Service {
    pub fn new(id: impl Into<String>, name: impl Into<String>, config: ServiceConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            config,
        }
    }

    /// Lowercase kebab-case name used for images, repositories and families
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// PascalCase name used as a prefix for template logical ids
    pub fn logical_name(&self) -> String {
        logical_name(&self.name)
    }

    /// Registry repository holding this service's image
    pub fn repository_name(&self) -> String {
        format!("{}-repo", self.slug())
    }

    pub fn port(&self) -> u16 {
        self.config.port()
    }

    pub fn tag(&self) -> &str {
        self.config.tag()
    }
}

/// Parsed per-service configuration
///
/// YAML form:
/// ```yaml
/// port: 9090
/// version: "1.2.0"
/// environment:
///   LOG_LEVEL: debug
///   WORKERS: 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Image tag; `version: 2` and `version: "2"` mean the same
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, EnvValue>,
    /// Keys with no meaning for the deployment
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ServiceConfig {
    /// Parse configuration text
    ///
    /// Empty text and a bare `null` document yield the default configuration.
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_value(value)?;
        if config.port == Some(0) {
            return Err(serde::de::Error::custom("port must be between 1 and 65535"));
        }
        Ok(config)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn tag(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_TAG)
    }

    /// Environment as name/value string pairs, sorted by name
    pub fn environment_pairs(&self) -> Vec<(String, String)> {
        self.environment
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

/// Scalar environment value
///
/// YAML users write `WORKERS: 4` or `DEBUG: true`; both end up as strings in
/// the container environment. A key with no value (`TOKEN:`) becomes an
/// empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    String(String),
    Bool(bool),
    Number(serde_yaml::Number),
    Empty,
}

impl std::fmt::Display for EnvValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvValue::String(s) => write!(f, "{}", s),
            EnvValue::Bool(b) => write!(f, "{}", b),
            EnvValue::Number(n) => write!(f, "{}", n),
            EnvValue::Empty => Ok(()),
        }
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EnvValue>::deserialize(deserializer)?
        .map(|value| value.to_string())
        .filter(|value| !value.is_empty()))
}

impl From<&str> for EnvValue {
    fn from(s: &str) -> Self {
        EnvValue::String(s.to_string())
    }
}

/// `Service 1` -> `service-1`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// `api gateway` -> `ApiGateway`
pub fn logical_name(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
