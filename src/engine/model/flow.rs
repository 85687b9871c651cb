// SPDX-License-Identifier: MIT

//! Flow definition model: flows, triggers, listeners and tasks
//!
//! Condition lists are `Option`s on purpose: an absent list on a trigger means
//! "no conditions", and on a listener it means "always run".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::execution::Execution;
use crate::engine::condition::Condition;

/// A declared task. Its body is opaque to the condition engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl Task {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            properties: HashMap::new(),
        }
    }
}

/// A task bound to the execution it will run in
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTask {
    pub task: Task,
    pub execution_id: String,
}

impl ResolvedTask {
    pub fn of(task: &Task, execution: &Execution) -> Self {
        Self {
            task: task.clone(),
            execution_id: execution.id.clone(),
        }
    }
}

/// Rule that starts a new execution when its conditions pass
#[derive(Debug, Clone)]
pub struct Trigger {
    pub id: String,
    pub kind: String,
    pub conditions: Option<Vec<Arc<dyn Condition>>>,
}

impl Trigger {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            conditions: None,
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<Arc<dyn Condition>>) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Conditions to evaluate, empty when none are set
    pub fn conditions(&self) -> &[Arc<dyn Condition>] {
        self.conditions.as_deref().unwrap_or(&[])
    }
}

/// Extra tasks tied to an execution's lifecycle
#[derive(Debug, Clone)]
pub struct Listener {
    pub description: Option<String>,
    pub conditions: Option<Vec<Arc<dyn Condition>>>,
    pub tasks: Vec<Task>,
}

impl Listener {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            description: None,
            conditions: None,
            tasks,
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<Arc<dyn Condition>>) -> Self {
        self.conditions = Some(conditions);
        self
    }
}

/// Flow definition as seen by the condition engine
#[derive(Debug, Clone)]
pub struct Flow {
    pub id: String,
    pub namespace: String,
    pub revision: u32,
    pub variables: HashMap<String, serde_json::Value>,
    pub tasks: Vec<Task>,
    pub listeners: Option<Vec<Listener>>,
    pub triggers: Option<Vec<Trigger>>,
}

impl Flow {
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            revision: 1,
            variables: HashMap::new(),
            tasks: vec![],
            listeners: None,
            triggers: None,
        }
    }

    pub fn with_listeners(mut self, listeners: Vec<Listener>) -> Self {
        self.listeners = Some(listeners);
        self
    }

    pub fn with_triggers(mut self, triggers: Vec<Trigger>) -> Self {
        self.triggers = Some(triggers);
        self
    }

    pub fn listeners(&self) -> &[Listener] {
        self.listeners.as_deref().unwrap_or(&[])
    }

    pub fn triggers(&self) -> &[Trigger] {
        self.triggers.as_deref().unwrap_or(&[])
    }

    /// `namespace.id`, used as a stable key across flows
    pub fn uid(&self) -> String {
        format!("{}.{}", self.namespace, self.id)
    }
}
