// SPDX-License-Identifier: MIT

//! Execution state model
//!
//! Executions are plain data: they are loaded from YAML/JSON, inspected by
//! conditions and never mutated by the evaluation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::flow::{Flow, ResolvedTask};

/// Status of an execution or a task run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    Created,
    Running,
    Paused,
    Restarted,
    Killing,
    Success,
    Warning,
    Failed,
    Killed,
}

impl StateType {
    /// No further progress occurs from a terminal state
    pub fn is_terminated(&self) -> bool {
        matches!(
            self,
            StateType::Success | StateType::Warning | StateType::Failed | StateType::Killed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::Created => "CREATED",
            StateType::Running => "RUNNING",
            StateType::Paused => "PAUSED",
            StateType::Restarted => "RESTARTED",
            StateType::Killing => "KILLING",
            StateType::Success => "SUCCESS",
            StateType::Warning => "WARNING",
            StateType::Failed => "FAILED",
            StateType::Killed => "KILLED",
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transition in a state history
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StateHistory {
    pub state: StateType,
    pub date: DateTime<Utc>,
}

/// Current state plus the transitions that led to it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct State {
    pub current: StateType,
    #[serde(default)]
    pub histories: Vec<StateHistory>,
}

impl State {
    pub fn new(current: StateType) -> Self {
        Self::at(current, Utc::now())
    }

    /// A state entered at a given instant
    pub fn at(current: StateType, date: DateTime<Utc>) -> Self {
        Self {
            current,
            histories: vec![StateHistory {
                state: current,
                date,
            }],
        }
    }

    /// Transition to `next`, keeping the history
    pub fn with_state(&self, next: StateType) -> Self {
        let mut histories = self.histories.clone();
        histories.push(StateHistory {
            state: next,
            date: Utc::now(),
        });
        Self {
            current: next,
            histories,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.current.is_terminated()
    }

    /// Date of the first recorded transition
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.histories.first().map(|h| h.date)
    }

    /// Date of the last recorded transition, when the state is terminal
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        if !self.is_terminated() {
            return None;
        }
        self.histories.last().map(|h| h.date)
    }
}

/// Run of a single task inside an execution
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    pub id: String,
    pub task_id: String,
    pub state: State,
}

impl TaskRun {
    pub fn new(task_id: impl Into<String>, state: State) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            state,
        }
    }
}

/// A single run of a flow
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: String,
    pub namespace: String,
    pub flow_id: String,
    #[serde(default)]
    pub flow_revision: u32,
    pub state: State,
    #[serde(default)]
    pub task_run_list: Vec<TaskRun>,
    #[serde(default)]
    pub inputs: HashMap<String, serde_json::Value>,
}

impl Execution {
    /// Create a fresh execution of `flow` in the `CREATED` state
    pub fn new(flow: &Flow) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            namespace: flow.namespace.clone(),
            flow_id: flow.id.clone(),
            flow_revision: flow.revision,
            state: State::new(StateType::Created),
            task_run_list: vec![],
            inputs: HashMap::new(),
        }
    }

    pub fn with_state(mut self, state: StateType) -> Self {
        self.state = self.state.with_state(state);
        self
    }

    pub fn with_task_run(mut self, task_run: TaskRun) -> Self {
        self.task_run_list.push(task_run);
        self
    }

    /// True once every resolved task has a task run in a terminal state
    pub fn is_terminated(&self, tasks: &[ResolvedTask]) -> bool {
        tasks.iter().all(|task| {
            self.task_run_list
                .iter()
                .any(|run| run.task_id == task.task.id && run.state.is_terminated())
        })
    }
}
