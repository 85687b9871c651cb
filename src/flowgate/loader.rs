//! Flow loader - YAML file loading and parsing
//!
//! Loads flow definitions, executions and recorded condition windows.

use std::fs;
use std::path::Path;

use super::types::FlowDefinition;
use crate::engine::model::Execution;
use crate::engine::{ConditionWindow, FlowgateError};

/// Loads definitions from YAML files
pub struct FlowLoader;

impl FlowLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a flow definition from a YAML file
    pub fn load_flow<P: AsRef<Path>>(&self, path: P) -> Result<FlowDefinition, FlowgateError> {
        let content = read(path.as_ref())?;
        Self::parse_yaml(&content)
    }

    /// Parse a flow definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<FlowDefinition, FlowgateError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load an execution from a YAML file, or JSON when the extension is `.json`
    pub fn load_execution<P: AsRef<Path>>(&self, path: P) -> Result<Execution, FlowgateError> {
        let path = path.as_ref();
        let content = read(path)?;
        if is_json(path) {
            Self::parse_execution_json(&content)
        } else {
            Self::parse_execution_yaml(&content)
        }
    }

    pub fn parse_execution_yaml(content: &str) -> Result<Execution, FlowgateError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn parse_execution_json(content: &str) -> Result<Execution, FlowgateError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load recorded multiple-condition windows (YAML, or JSON by extension)
    pub fn load_windows<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<ConditionWindow>, FlowgateError> {
        let path = path.as_ref();
        let content = read(path)?;
        if is_json(path) {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

impl Default for FlowLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read(path: &Path) -> Result<String, FlowgateError> {
    if !path.exists() {
        return Err(FlowgateError::config(format!(
            "File not found: {}",
            path.display()
        )));
    }
    Ok(fs::read_to_string(path)?)
}
