// SPDX-License-Identifier: MIT

//! YAML schema types for flow definitions
//!
//! These mirror the runtime model in `engine::model`, except that conditions
//! are plain data tagged by `type`. `FlowBuilder` turns them into
//! `Arc<dyn Condition>` values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::engine::model::{StateType, Task};

fn default_revision() -> u32 {
    1
}

fn default_window_secs() -> i64 {
    24 * 60 * 60
}

/// Top-level flow definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FlowDefinition {
    pub id: String,
    pub namespace: String,
    #[serde(default = "default_revision")]
    pub revision: u32,
    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub listeners: Option<Vec<ListenerDefinition>>,
    pub triggers: Option<Vec<TriggerDefinition>>,
}

/// Listener definition: optional conditions and the tasks they unlock
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ListenerDefinition {
    pub description: Option<String>,
    pub conditions: Option<Vec<ConditionDefinition>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Trigger definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TriggerDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub conditions: Option<Vec<ConditionDefinition>>,
}

/// Condition definition, selected by its `type` key
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDefinition {
    /// Boolean expression over run-context variables
    Expression { expression: String },
    /// Execution state filter
    ExecutionStatus {
        #[serde(default, rename = "in")]
        in_states: Vec<StateType>,
        #[serde(default, rename = "not_in")]
        not_in_states: Vec<StateType>,
    },
    /// Execution belongs to a given flow
    ExecutionFlow { namespace: String, flow_id: String },
    /// Flow namespace match
    FlowNamespace {
        namespace: String,
        #[serde(default)]
        prefix: bool,
    },
    /// Day of the week, e.g. "Monday" or "mon"
    DayWeek { day_of_week: String },
    /// Negation of all nested conditions
    Not { conditions: Vec<ConditionDefinition> },
    /// Any nested condition
    Or { conditions: Vec<ConditionDefinition> },
    /// Named sub-conditions satisfied across flows within a window
    Multiple {
        id: String,
        #[serde(default = "default_window_secs")]
        window_secs: i64,
        conditions: BTreeMap<String, ConditionDefinition>,
    },
}

impl ConditionDefinition {
    /// The `type` tag, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ConditionDefinition::Expression { .. } => "expression",
            ConditionDefinition::ExecutionStatus { .. } => "execution_status",
            ConditionDefinition::ExecutionFlow { .. } => "execution_flow",
            ConditionDefinition::FlowNamespace { .. } => "flow_namespace",
            ConditionDefinition::DayWeek { .. } => "day_week",
            ConditionDefinition::Not { .. } => "not",
            ConditionDefinition::Or { .. } => "or",
            ConditionDefinition::Multiple { .. } => "multiple",
        }
    }
}
