// SPDX-License-Identifier: MIT

//! Conditions over the execution being evaluated

use async_trait::async_trait;

use crate::engine::model::StateType;
use crate::engine::{Condition, ConditionError, EvaluationContext};

/// Passes when the execution state is in `in_states` (if set) and not in
/// `not_in_states`
#[derive(Debug, Clone, Default)]
pub struct ExecutionStatusCondition {
    pub in_states: Vec<StateType>,
    pub not_in_states: Vec<StateType>,
}

impl ExecutionStatusCondition {
    pub fn is_in(states: Vec<StateType>) -> Self {
        Self {
            in_states: states,
            not_in_states: vec![],
        }
    }

    pub fn not_in(states: Vec<StateType>) -> Self {
        Self {
            in_states: vec![],
            not_in_states: states,
        }
    }
}

#[async_trait]
impl Condition for ExecutionStatusCondition {
    fn name(&self) -> &str {
        "execution_status"
    }

    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        let execution = context
            .execution()
            .ok_or_else(|| ConditionError::missing_execution(self.name()))?;
        let current = execution.state.current;

        if !self.in_states.is_empty() && !self.in_states.contains(&current) {
            return Ok(false);
        }

        Ok(!self.not_in_states.contains(&current))
    }
}

/// Passes when the execution belongs to the given flow
#[derive(Debug, Clone)]
pub struct ExecutionFlowCondition {
    pub namespace: String,
    pub flow_id: String,
}

impl ExecutionFlowCondition {
    pub fn new(namespace: impl Into<String>, flow_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            flow_id: flow_id.into(),
        }
    }
}

#[async_trait]
impl Condition for ExecutionFlowCondition {
    fn name(&self) -> &str {
        "execution_flow"
    }

    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        let execution = context
            .execution()
            .ok_or_else(|| ConditionError::missing_execution(self.name()))?;

        Ok(execution.namespace == self.namespace && execution.flow_id == self.flow_id)
    }
}
