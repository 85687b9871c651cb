// SPDX-License-Identifier: MIT

//! Condition service - public entry points for trigger and listener gating
//!
//! Every entry point builds (or receives) an `EvaluationContext` and hands a
//! condition list to [`evaluate_all`]. Nothing is cached: conditions may
//! depend on time or on other flows, so each call recomputes the context.

use std::sync::Arc;

use super::aggregator::evaluate_all;
use crate::engine::model::{Execution, Flow, ResolvedTask, Trigger};
use crate::engine::{
    Condition, DefaultRunContextFactory, EvaluationContext, FlowgateError,
    MultipleConditionStorage, RunContext, RunContextFactory,
};

/// Evaluates trigger and listener conditions
#[derive(Clone)]
pub struct ConditionService {
    run_context_factory: Arc<dyn RunContextFactory>,
}

impl ConditionService {
    pub fn new(run_context_factory: Arc<dyn RunContextFactory>) -> Self {
        Self {
            run_context_factory,
        }
    }

    /// Assemble a context from its parts
    pub fn condition_context<'a>(
        &self,
        run_context: RunContext,
        flow: &'a Flow,
        execution: Option<&'a Execution>,
        storage: Option<Arc<dyn MultipleConditionStorage>>,
    ) -> EvaluationContext<'a> {
        EvaluationContext::new(run_context, flow, execution, storage)
    }

    /// Same as [`Self::condition_context`] with no storage
    pub fn condition_context_without_storage<'a>(
        &self,
        run_context: RunContext,
        flow: &'a Flow,
        execution: Option<&'a Execution>,
    ) -> EvaluationContext<'a> {
        self.condition_context(run_context, flow, execution, None)
    }

    /// Build a context for `flow`/`execution`, deriving the run context from
    /// the same pair
    pub fn context_for<'a>(
        &self,
        flow: &'a Flow,
        execution: Option<&'a Execution>,
        storage: Option<Arc<dyn MultipleConditionStorage>>,
    ) -> EvaluationContext<'a> {
        let run_context = self.run_context_factory.of(flow, execution);
        self.condition_context(run_context, flow, execution, storage)
    }

    /// Test a single condition, mostly for diagnostics and tooling
    pub async fn is_condition_valid(
        &self,
        condition: Arc<dyn Condition>,
        flow: &Flow,
        execution: Option<&Execution>,
        storage: Option<Arc<dyn MultipleConditionStorage>>,
    ) -> Result<bool, FlowgateError> {
        let context = self.context_for(flow, execution, storage);
        Ok(evaluate_all(std::slice::from_ref(&condition), &context).await?)
    }

    pub async fn is_condition_valid_without_storage(
        &self,
        condition: Arc<dyn Condition>,
        flow: &Flow,
        execution: Option<&Execution>,
    ) -> Result<bool, FlowgateError> {
        self.is_condition_valid(condition, flow, execution, None)
            .await
    }

    /// Test a trigger against a context the caller already built, typically
    /// one shared by many triggers
    pub async fn is_trigger_valid_in_context(
        &self,
        trigger: &Trigger,
        context: &EvaluationContext<'_>,
    ) -> Result<bool, FlowgateError> {
        let valid = evaluate_all(trigger.conditions(), context).await?;
        log::debug!("Trigger '{}' valid: {}", trigger.id, valid);
        Ok(valid)
    }

    /// Test a trigger against a flow and its execution.
    ///
    /// The execution is mandatory here: `None` is a caller bug and is
    /// reported as [`FlowgateError::ContractViolation`] before any condition
    /// runs.
    pub async fn is_trigger_valid(
        &self,
        trigger: &Trigger,
        flow: &Flow,
        execution: Option<&Execution>,
        storage: Option<Arc<dyn MultipleConditionStorage>>,
    ) -> Result<bool, FlowgateError> {
        let execution = match execution {
            Some(execution) => execution,
            None => {
                log::warn!(
                    "Trigger '{}' on flow {} evaluated without an execution",
                    trigger.id,
                    flow.uid()
                );
                return Err(FlowgateError::contract_violation(format!(
                    "trigger '{}' requires an execution",
                    trigger.id
                )));
            }
        };

        let context = self.context_for(flow, Some(execution), storage);
        self.is_trigger_valid_in_context(trigger, &context).await
    }

    /// Tasks of every listener whose conditions pass, in declaration order.
    ///
    /// All listeners share a single context without storage.
    pub async fn find_valid_listeners(
        &self,
        flow: &Flow,
        execution: &Execution,
    ) -> Result<Vec<ResolvedTask>, FlowgateError> {
        let listeners = match &flow.listeners {
            Some(listeners) => listeners,
            None => return Ok(vec![]),
        };

        let context = self.context_for(flow, Some(execution), None);
        let mut resolved = Vec::new();

        for listener in listeners {
            let valid = match &listener.conditions {
                None => true,
                Some(conditions) => evaluate_all(conditions, &context).await?,
            };

            if valid {
                resolved.extend(
                    listener
                        .tasks
                        .iter()
                        .map(|task| ResolvedTask::of(task, execution)),
                );
            }
        }

        log::info!(
            "Execution {} of {} has {} listener task(s)",
            execution.id,
            flow.uid(),
            resolved.len()
        );

        Ok(resolved)
    }

    /// Whether the execution and every task spawned by its valid listeners
    /// have reached a terminal state
    pub async fn is_terminated_with_listeners(
        &self,
        flow: &Flow,
        execution: &Execution,
    ) -> Result<bool, FlowgateError> {
        if !execution.state.is_terminated() {
            return Ok(false);
        }

        let listeners = self.find_valid_listeners(flow, execution).await?;
        Ok(execution.is_terminated(&listeners))
    }
}

impl Default for ConditionService {
    fn default() -> Self {
        Self::new(Arc::new(DefaultRunContextFactory::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::{Listener, State, StateType, Task, TaskRun};
    use crate::engine::{ConditionError, InMemoryConditionStorage};
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Condition returning a fixed answer and counting its calls
    #[derive(Debug)]
    struct Spy {
        result: bool,
        calls: AtomicUsize,
    }

    impl Spy {
        fn new(result: bool) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Condition for Spy {
        fn name(&self) -> &str {
            "spy"
        }

        async fn test(&self, _context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result)
        }
    }

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl Condition for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn test(&self, _context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
            Err(ConditionError::Other("should not run".to_string()))
        }
    }

    /// Reports what it saw in the context
    #[derive(Debug)]
    struct SeesExecution;

    #[async_trait]
    impl Condition for SeesExecution {
        fn name(&self) -> &str {
            "sees-execution"
        }

        async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
            Ok(context.execution().is_some())
        }
    }

    #[derive(Debug)]
    struct HasStorage;

    #[async_trait]
    impl Condition for HasStorage {
        fn name(&self) -> &str {
            "has-storage"
        }

        async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
            Ok(context.storage().is_some())
        }
    }

    /// Factory that always yields the same variables
    struct FixedFactory;

    impl RunContextFactory for FixedFactory {
        fn of(&self, _flow: &Flow, _execution: Option<&Execution>) -> RunContext {
            let mut vars = Map::new();
            vars.insert("fixed".to_string(), json!(true));
            RunContext::new(vars)
        }
    }

    fn flow() -> Flow {
        Flow::new("io.flowgate.tests", "listeners")
    }

    fn task(id: &str) -> Task {
        Task::new(id, "log")
    }

    #[test]
    fn test_condition_context_without_storage_matches_explicit_none() {
        let service = ConditionService::default();
        let flow = flow();

        let a = service.condition_context_without_storage(RunContext::empty(), &flow, None);
        let b = service.condition_context(RunContext::empty(), &flow, None, None);

        assert!(a.storage().is_none());
        assert!(b.storage().is_none());
        assert_eq!(a.run_context(), b.run_context());
    }

    #[test]
    fn test_context_uses_injected_factory() {
        let service = ConditionService::new(Arc::new(FixedFactory));
        let flow = flow();
        let context = service.context_for(&flow, None, None);

        assert_eq!(context.run_context().get_path("fixed"), Some(&json!(true)));
        assert!(context.run_context().get_path("flow").is_none());
    }

    #[tokio::test]
    async fn test_single_condition_without_execution() {
        let service = ConditionService::default();
        let flow = flow();

        assert!(!service
            .is_condition_valid_without_storage(Arc::new(SeesExecution), &flow, None)
            .await
            .unwrap());

        let execution = Execution::new(&flow);
        assert!(service
            .is_condition_valid_without_storage(Arc::new(SeesExecution), &flow, Some(&execution))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_single_condition_with_storage() {
        let service = ConditionService::default();
        let flow = flow();
        let storage: Arc<dyn MultipleConditionStorage> = Arc::new(InMemoryConditionStorage::new());

        assert!(service
            .is_condition_valid(Arc::new(HasStorage), &flow, None, Some(storage))
            .await
            .unwrap());
        assert!(!service
            .is_condition_valid_without_storage(Arc::new(HasStorage), &flow, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_trigger_without_conditions_is_valid() {
        let service = ConditionService::default();
        let flow = flow();
        let execution = Execution::new(&flow);
        let trigger = Trigger::new("on-success", "flow");

        assert!(service
            .is_trigger_valid(&trigger, &flow, Some(&execution), None)
            .await
            .unwrap());

        let context = service.context_for(&flow, None, None);
        assert!(service
            .is_trigger_valid_in_context(&trigger, &context)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_trigger_short_circuits_before_failing_condition() {
        let service = ConditionService::default();
        let flow = flow();
        let execution = Execution::new(&flow);
        let trigger = Trigger::new("gated", "flow")
            .with_conditions(vec![Spy::new(false), Arc::new(Failing)]);

        assert!(!service
            .is_trigger_valid(&trigger, &flow, Some(&execution), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_trigger_condition_error_propagates() {
        let service = ConditionService::default();
        let flow = flow();
        let execution = Execution::new(&flow);
        let trigger = Trigger::new("gated", "flow")
            .with_conditions(vec![Spy::new(true), Arc::new(Failing)]);

        let err = service
            .is_trigger_valid(&trigger, &flow, Some(&execution), None)
            .await
            .unwrap_err();

        assert!(matches!(err, FlowgateError::Condition(ConditionError::Other(_))));
        assert!(!err.is_contract_violation());
    }

    #[tokio::test]
    async fn test_trigger_requires_execution() {
        let service = ConditionService::default();
        let flow = flow();
        let spy = Spy::new(true);
        let trigger = Trigger::new("gated", "flow").with_conditions(vec![spy.clone()]);

        let err = service
            .is_trigger_valid(&trigger, &flow, None, None)
            .await
            .unwrap_err();

        assert!(err.is_contract_violation());
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_shared_context_for_many_triggers() {
        let service = ConditionService::default();
        let flow = flow();
        let context = service.context_for(&flow, None, None);
        let pass = Trigger::new("pass", "schedule").with_conditions(vec![Spy::new(true)]);
        let reject = Trigger::new("reject", "schedule").with_conditions(vec![Spy::new(false)]);

        assert!(service
            .is_trigger_valid_in_context(&pass, &context)
            .await
            .unwrap());
        assert!(!service
            .is_trigger_valid_in_context(&reject, &context)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_no_listeners() {
        let service = ConditionService::default();
        let flow = flow();
        let execution = Execution::new(&flow).with_state(StateType::Success);

        assert!(service
            .find_valid_listeners(&flow, &execution)
            .await
            .unwrap()
            .is_empty());

        let flow = flow.with_listeners(vec![]);
        assert!(service
            .find_valid_listeners(&flow, &execution)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_listeners_in_declaration_order() {
        let service = ConditionService::default();
        let flow = flow().with_listeners(vec![
            Listener::new(vec![task("a1"), task("a2")]),
            Listener::new(vec![task("b1")]).with_conditions(vec![Spy::new(false)]),
            Listener::new(vec![task("c1"), task("c2")]).with_conditions(vec![Spy::new(true)]),
            Listener::new(vec![task("d1")]).with_conditions(vec![]),
        ]);
        let execution = Execution::new(&flow);

        let tasks = service.find_valid_listeners(&flow, &execution).await.unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.task.id.as_str()).collect();

        assert_eq!(ids, vec!["a1", "a2", "c1", "c2", "d1"]);
        assert!(tasks.iter().all(|t| t.execution_id == execution.id));
    }

    #[tokio::test]
    async fn test_listener_condition_error_propagates() {
        let service = ConditionService::default();
        let flow = flow().with_listeners(vec![
            Listener::new(vec![task("a1")]).with_conditions(vec![Arc::new(Failing)]),
        ]);
        let execution = Execution::new(&flow);

        assert!(service
            .find_valid_listeners(&flow, &execution)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_listeners_get_no_storage() {
        let service = ConditionService::default();
        let flow = flow().with_listeners(vec![
            Listener::new(vec![task("a1")]).with_conditions(vec![Arc::new(HasStorage)]),
        ]);
        let execution = Execution::new(&flow);

        assert!(service
            .find_valid_listeners(&flow, &execution)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_not_terminated_skips_listeners() {
        let service = ConditionService::default();
        let spy = Spy::new(true);
        let flow = flow().with_listeners(vec![
            Listener::new(vec![task("a1")]).with_conditions(vec![spy.clone()]),
        ]);
        let execution = Execution::new(&flow).with_state(StateType::Running);

        assert!(!service
            .is_terminated_with_listeners(&flow, &execution)
            .await
            .unwrap());
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_terminated_with_listeners_scenario() {
        let service = ConditionService::default();
        let flow = flow().with_listeners(vec![
            Listener::new(vec![task("t1")]),
            Listener::new(vec![task("t2")]).with_conditions(vec![Spy::new(false)]),
        ]);
        let execution = Execution::new(&flow).with_state(StateType::Success);

        let tasks = service.find_valid_listeners(&flow, &execution).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task.id, "t1");

        // t1 has not run yet
        assert!(!service
            .is_terminated_with_listeners(&flow, &execution)
            .await
            .unwrap());

        // t2 is filtered out, so only t1 has to finish
        let execution = execution
            .with_task_run(TaskRun::new("t1", State::new(StateType::Success)));
        assert!(service
            .is_terminated_with_listeners(&flow, &execution)
            .await
            .unwrap());

        let running = Execution {
            task_run_list: vec![TaskRun::new("t1", State::new(StateType::Running))],
            ..execution
        };
        assert!(!service
            .is_terminated_with_listeners(&flow, &running)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_same_inputs_same_result() {
        let service = ConditionService::default();
        let flow = flow();
        let execution = Execution::new(&flow).with_state(StateType::Failed);
        let conditions: Vec<Arc<dyn Condition>> =
            vec![Spy::new(true), Arc::new(SeesExecution), Spy::new(true)];

        let first = service.context_for(&flow, Some(&execution), None);
        let second = service.context_for(&flow, Some(&execution), None);

        assert_eq!(first.run_context(), second.run_context());
        assert_eq!(
            evaluate_all(&conditions, &first).await.unwrap(),
            evaluate_all(&conditions, &second).await.unwrap()
        );
    }
}
