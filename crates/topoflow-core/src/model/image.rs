use serde::{Deserialize, Serialize};

/// Pushed image of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub service_id: String,
    /// Registry host without scheme (e.g. `123456789.dkr.ecr.us-east-1.amazonaws.com`)
    pub registry: String,
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    pub fn new(
        service_id: impl Into<String>,
        registry: impl Into<String>,
        repository: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            registry: registry.into(),
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// `registry/repository` without tag
    pub fn image_name(&self) -> String {
        format!("{}/{}", self.registry, self.repository)
    }

    /// Fully-qualified URI `registry/repository:tag`
    pub fn uri(&self) -> String {
        format!("{}:{}", self.image_name(), self.tag)
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri() {
        let image = ImageReference::new(
            "c1",
            "123456789.dkr.ecr.ap-northeast-1.amazonaws.com",
            "api-repo",
            "latest",
        );
        assert_eq!(
            image.uri(),
            "123456789.dkr.ecr.ap-northeast-1.amazonaws.com/api-repo:latest"
        );
        assert_eq!(
            image.image_name(),
            "123456789.dkr.ecr.ap-northeast-1.amazonaws.com/api-repo"
        );
    }
}
