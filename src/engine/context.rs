// SPDX-License-Identifier: MIT

//! Evaluation context handed to every condition

use std::sync::Arc;

use super::model::{Execution, Flow};
use super::runtime::RunContext;
use super::storage::MultipleConditionStorage;

/// Everything a condition may look at while testing itself.
///
/// Built fresh for each evaluation call and dropped when it returns. The
/// run context always comes from the same flow/execution pair.
#[derive(Clone)]
pub struct EvaluationContext<'a> {
    flow: &'a Flow,
    execution: Option<&'a Execution>,
    run_context: RunContext,
    storage: Option<Arc<dyn MultipleConditionStorage>>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        run_context: RunContext,
        flow: &'a Flow,
        execution: Option<&'a Execution>,
        storage: Option<Arc<dyn MultipleConditionStorage>>,
    ) -> Self {
        Self {
            flow,
            execution,
            run_context,
            storage,
        }
    }

    pub fn flow(&self) -> &'a Flow {
        self.flow
    }

    pub fn execution(&self) -> Option<&'a Execution> {
        self.execution
    }

    pub fn run_context(&self) -> &RunContext {
        &self.run_context
    }

    pub fn storage(&self) -> Option<&Arc<dyn MultipleConditionStorage>> {
        self.storage.as_ref()
    }
}

impl std::fmt::Debug for EvaluationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("flow", &self.flow.uid())
            .field("execution", &self.execution.map(|e| e.id.as_str()))
            .field("has_storage", &self.storage.is_some())
            .finish()
    }
}
