use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const TWO_SERVICES: &str = r#"{
  "graph": { "cells": [
    { "id": "c1", "type": "custom.Service" },
    { "id": "c2", "type": "custom.Service" },
    { "id": "l1", "type": "standard.Link" }
  ] },
  "services": {
    "c1": { "name": "Service 1", "yaml": "port: 9090\nenvironment:\n  LOG_LEVEL: debug\n  WORKERS: 4\n" },
    "c2": { "name": "billing", "yaml": "version: \"1.4\"\n" }
  }
}"#;

/// Working directory with its own settings file so the user's settings never leak in
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("topoflow.yaml"), "").unwrap();
        Self { root }
    }

    pub fn write_settings(&self, content: &str) {
        fs::write(self.root.path().join("topoflow.yaml"), content).unwrap();
    }

    pub fn write_request(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("request.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[allow(deprecated)]
    pub fn topo(&self) -> Command {
        let mut cmd = Command::cargo_bin("topo").unwrap();
        cmd.current_dir(self.root.path())
            .env("TOPOFLOW_CONFIG", self.root.path().join("topoflow.yaml"))
            .env_remove("RUST_LOG");
        cmd
    }
}
