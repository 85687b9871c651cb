// SPDX-License-Identifier: MIT

//! Runtime variables exposed to conditions

use serde_json::{json, Map, Value};
use std::collections::HashMap;

use super::model::{Execution, Flow};

/// Variable tree for a single flow/execution pair
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    variables: Value,
}

impl RunContext {
    pub fn new(variables: Map<String, Value>) -> Self {
        Self {
            variables: Value::Object(variables),
        }
    }

    pub fn empty() -> Self {
        Self::new(Map::new())
    }

    /// Get a nested variable using dot notation (e.g., "execution.state")
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.variables.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    pub fn variables(&self) -> &Value {
        &self.variables
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::empty()
    }
}

/// Produces the run context for a flow and an optional execution.
///
/// Called once per evaluation; implementations must not assume caching.
pub trait RunContextFactory: Send + Sync {
    fn of(&self, flow: &Flow, execution: Option<&Execution>) -> RunContext;
}

/// Exposes `flow`, `execution`, `inputs` and `vars`
#[derive(Debug, Clone, Default)]
pub struct DefaultRunContextFactory;

impl DefaultRunContextFactory {
    pub fn new() -> Self {
        Self
    }

    fn inputs(execution: Option<&Execution>) -> Value {
        execution
            .map(|e| to_object(&e.inputs))
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}

impl RunContextFactory for DefaultRunContextFactory {
    fn of(&self, flow: &Flow, execution: Option<&Execution>) -> RunContext {
        let mut variables = Map::new();

        variables.insert(
            "flow".to_string(),
            json!({
                "id": flow.id,
                "namespace": flow.namespace,
                "revision": flow.revision,
            }),
        );

        if let Some(execution) = execution {
            variables.insert(
                "execution".to_string(),
                json!({
                    "id": execution.id,
                    "namespace": execution.namespace,
                    "flowId": execution.flow_id,
                    "state": execution.state.current.as_str(),
                    "startDate": execution.state.start_date().map(|d| d.to_rfc3339()),
                }),
            );
        }

        variables.insert("inputs".to_string(), Self::inputs(execution));
        variables.insert("vars".to_string(), to_object(&flow.variables));

        RunContext::new(variables)
    }
}

fn to_object(values: &HashMap<String, Value>) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}
