//! Inbound request and outbound response documents

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cell type the diagram editor assigns to service nodes
pub const SERVICE_CELL_TYPE: &str = "custom.Service";

/// Deployment request exported by the diagram editor
///
/// ```json
/// {
///   "graph": { "cells": [ { "id": "a1", "type": "custom.Service" } ] },
///   "services": { "a1": { "name": "api", "yaml": "port: 9090\n" } }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    pub graph: Graph,
    pub services: HashMap<String, ServiceEntry>,
}

/// Topology graph (nodes and links share the `cells` array)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub cells: Vec<Cell>,
}

/// One node or link of the graph
///
/// Only cells of type `custom.Service` become services. Links and any other
/// node types are skipped, as are editor attributes such as position and
/// size, which serde ignores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Key into the request's `services` table
    pub id: String,
    /// Editor shape type, e.g. `custom.Service` or `standard.Link`
    #[serde(rename = "type")]
    pub cell_type: String,
}

impl Cell {
    pub fn is_service(&self) -> bool {
        self.cell_type == SERVICE_CELL_TYPE
    }
}

/// Side-table entry holding a node's display name and configuration text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    /// YAML mapping parsed into a `ServiceConfig`
    pub yaml: String,
}

/// Response body returned once the deployment unit has been submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub message: String,
    pub stack_id: String,
}

impl DeployResponse {
    pub fn started(stack_id: impl Into<String>) -> Self {
        Self {
            message: "Deployment started".to_string(),
            stack_id: stack_id.into(),
        }
    }
}
