//! Graph interpretation
//!
//! Turns the diagram editor's export into the list of services to deploy.

use crate::error::{FlowError, Result};
use crate::model::{DeployRequest, Service, ServiceConfig};
use std::collections::HashMap;

/// Parse a request body
pub fn parse_request(json: &str) -> Result<DeployRequest> {
    Ok(serde_json::from_str(json)?)
}

/// Extract every service node of the graph
///
/// Services are returned in graph order. A service node without a
/// services-table entry fails the whole request.
pub fn interpret(request: &DeployRequest) -> Result<Vec<Service>> {
    let mut services: Vec<Service> = Vec::new();
    let mut slugs: HashMap<String, String> = HashMap::new();
    let mut logical_names: HashMap<String, String> = HashMap::new();

    for cell in request.graph.cells.iter().filter(|c| c.is_service()) {
        if services.iter().any(|s| s.id == cell.id) {
            return Err(FlowError::DuplicateServiceId(cell.id.clone()));
        }

        let entry = request
            .services
            .get(&cell.id)
            .ok_or_else(|| FlowError::MissingServiceConfig {
                id: cell.id.clone(),
            })?;

        let config = ServiceConfig::parse(&entry.yaml).map_err(|e| FlowError::ConfigParse {
            service: entry.name.clone(),
            message: e.to_string(),
        })?;

        if !config.extra.is_empty() {
            let keys: Vec<&str> = config.extra.keys().map(String::as_str).collect();
            tracing::warn!(
                "Service '{}': ignoring unrecognized configuration keys: {}",
                entry.name,
                keys.join(", ")
            );
        }

        if let Some(yaml_name) = &config.name
            && yaml_name != &entry.name
        {
            tracing::debug!(
                "Service '{}': configuration names it '{}', using the node name",
                entry.name,
                yaml_name
            );
        }

        let service = Service::new(cell.id.clone(), entry.name.clone(), config);

        let slug = service.slug();
        if slug.is_empty() {
            return Err(FlowError::InvalidServiceName(service.name));
        }
        if let Some(first) = slugs.insert(slug.clone(), service.name.clone()) {
            return Err(FlowError::DuplicateServiceName {
                first,
                second: service.name,
                slug,
            });
        }
        let logical = service.logical_name();
        if let Some(first) = logical_names.insert(logical.clone(), service.name.clone()) {
            return Err(FlowError::DuplicateServiceName {
                first,
                second: service.name,
                slug: logical,
            });
        }

        tracing::debug!(
            "Service '{}' ({}): port {}, {} environment variable(s)",
            service.name,
            service.id,
            service.port(),
            service.config.environment.len()
        );
        services.push(service);
    }

    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> DeployRequest {
        parse_request(json).unwrap()
    }

    #[test]
    fn test_single_service() {
        let req = request(
            r#"{
                "graph": { "cells": [ { "id": "a1", "type": "custom.Service" } ] },
                "services": { "a1": { "name": "api", "yaml": "port: 9090\nenvironment:\n  MODE: prod\n" } }
            }"#,
        );

        let services = interpret(&req).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id, "a1");
        assert_eq!(services[0].name, "api");
        assert_eq!(services[0].port(), 9090);
        assert_eq!(
            services[0].config.environment_pairs(),
            vec![("MODE".to_string(), "prod".to_string())]
        );
    }

    #[test]
    fn test_missing_service_entry_fails() {
        let req = request(
            r#"{
                "graph": { "cells": [
                    { "id": "a1", "type": "custom.Service" },
                    { "id": "b2", "type": "custom.Service" }
                ] },
                "services": { "a1": { "name": "api", "yaml": "" } }
            }"#,
        );

        match interpret(&req) {
            Err(FlowError::MissingServiceConfig { id }) => assert_eq!(id, "b2"),
            other => panic!("Expected MissingServiceConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_links_and_other_cells_are_ignored() {
        let req = request(
            r#"{
                "graph": { "cells": [
                    { "id": "a1", "type": "custom.Service", "position": { "x": 50, "y": 50 } },
                    { "id": "l1", "type": "custom.CommunicationLink", "source": { "id": "a1" }, "target": { "id": "b2" } },
                    { "id": "b2", "type": "custom.Service" }
                ] },
                "services": {
                    "a1": { "name": "Service 1", "yaml": "name: Service 1\nport: 8080\n" },
                    "b2": { "name": "Service 2", "yaml": "" }
                }
            }"#,
        );

        let services = interpret(&req).unwrap();
        let ids: Vec<&str> = services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b2"]);
    }

    #[test]
    fn test_malformed_config_fails() {
        let req = request(
            r#"{
                "graph": { "cells": [ { "id": "a1", "type": "custom.Service" } ] },
                "services": { "a1": { "name": "api", "yaml": "port: [8080\n" } }
            }"#,
        );

        match interpret(&req) {
            Err(FlowError::ConfigParse { service, .. }) => assert_eq!(service, "api"),
            other => panic!("Expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_colliding_names_fail() {
        let req = request(
            r#"{
                "graph": { "cells": [
                    { "id": "a1", "type": "custom.Service" },
                    { "id": "b2", "type": "custom.Service" }
                ] },
                "services": {
                    "a1": { "name": "User Service", "yaml": "" },
                    "b2": { "name": "user-service", "yaml": "" }
                }
            }"#,
        );

        assert!(matches!(
            interpret(&req),
            Err(FlowError::DuplicateServiceName { .. })
        ));
    }

    #[test]
    fn test_duplicate_node_id_fails() {
        let req = request(
            r#"{
                "graph": { "cells": [
                    { "id": "a1", "type": "custom.Service" },
                    { "id": "a1", "type": "custom.Service" }
                ] },
                "services": { "a1": { "name": "api", "yaml": "" } }
            }"#,
        );

        assert!(matches!(
            interpret(&req),
            Err(FlowError::DuplicateServiceId(id)) if id == "a1"
        ));
    }

    #[test]
    fn test_unnamed_service_fails() {
        let req = request(
            r#"{
                "graph": { "cells": [ { "id": "a1", "type": "custom.Service" } ] },
                "services": { "a1": { "name": "---", "yaml": "" } }
            }"#,
        );

        assert!(matches!(
            interpret(&req),
            Err(FlowError::InvalidServiceName(_))
        ));
    }

    #[test]
    fn test_missing_sections_are_invalid_requests() {
        assert!(matches!(
            parse_request(r#"{ "services": {} }"#),
            Err(FlowError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_request(r#"{ "graph": {}, "services": {} }"#),
            Err(FlowError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_request(r#"{ "graph": { "cells": [] } }"#),
            Err(FlowError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_empty_graph() {
        let req = request(r#"{ "graph": { "cells": [] }, "services": {} }"#);
        assert!(interpret(&req).unwrap().is_empty());
    }
}
