//! Reading the request document

use crate::error::DeployError;
use std::io::Read;
use std::path::Path;
use topoflow_core::{DeployRequest, parse_request};

/// Read and parse a request from a file, or from stdin when `source` is `-`
pub fn read_request(source: &str) -> Result<DeployRequest, DeployError> {
    let text = if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| DeployError::ReadRequest {
                path: "<stdin>".into(),
                source: e,
            })?;
        text
    } else {
        std::fs::read_to_string(Path::new(source)).map_err(|e| DeployError::ReadRequest {
            path: source.into(),
            source: e,
        })?
    };

    tracing::debug!("Request: {} bytes", text.len());
    Ok(parse_request(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_read_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"graph":{"cells":[{"id":"c1","type":"custom.Service"}]},
                "services":{"c1":{"name":"api","yaml":""}}}"#,
        )
        .unwrap();

        let request = read_request(path.to_str().unwrap()).unwrap();
        assert_eq!(request.graph.cells.len(), 1);
        assert_eq!(request.services["c1"].name, "api");
    }

    #[test]
    fn test_read_request_missing_file() {
        let err = read_request("/nonexistent/request.json").unwrap_err();
        assert!(matches!(err, DeployError::ReadRequest { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_read_request_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, r#"{"graph":{}}"#).unwrap();

        let err = read_request(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, DeployError::Input(_)));
    }
}
