// SPDX-License-Identifier: MIT

//! Flow builder - turns YAML definitions into the runtime flow model
//!
//! Conditions are validated here (expressions parsed, weekdays and windows
//! checked) so evaluation never has to deal with malformed definitions.

use chrono::{Duration, Weekday};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::conditions::{
    DayWeekCondition, ExecutionFlowCondition, ExecutionStatusCondition, ExpressionCondition,
    FlowNamespaceCondition, MultipleCondition, NotCondition, OrCondition,
};
use super::loader::FlowLoader;
use super::types::{ConditionDefinition, FlowDefinition, ListenerDefinition, TriggerDefinition};
use crate::engine::model::{Flow, Listener, Trigger};
use crate::engine::{Condition, DefinitionError, FlowgateError};

/// Builds runnable flows from definitions
pub struct FlowBuilder {
    loader: FlowLoader,
}

impl FlowBuilder {
    pub fn new() -> Self {
        Self {
            loader: FlowLoader::new(),
        }
    }

    /// Load and build a flow from a YAML file
    pub fn build_flow<P: AsRef<Path>>(&self, path: P) -> Result<Flow, FlowgateError> {
        let def = self.loader.load_flow(path)?;
        self.build_from_def(&def)
    }

    /// Build a flow from a parsed definition
    pub fn build_from_def(&self, def: &FlowDefinition) -> Result<Flow, FlowgateError> {
        let listeners = def
            .listeners
            .as_ref()
            .map(|listeners| {
                listeners
                    .iter()
                    .enumerate()
                    .map(|(index, listener)| self.build_listener(index, listener))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let triggers = def
            .triggers
            .as_ref()
            .map(|triggers| self.build_triggers(triggers))
            .transpose()?;

        log::info!(
            "Built flow {}.{} with {} listener(s) and {} trigger(s)",
            def.namespace,
            def.id,
            listeners.as_ref().map_or(0, Vec::len),
            triggers.as_ref().map_or(0, Vec::len)
        );

        Ok(Flow {
            id: def.id.clone(),
            namespace: def.namespace.clone(),
            revision: def.revision,
            variables: def.variables.clone(),
            tasks: def.tasks.clone(),
            listeners,
            triggers,
        })
    }

    fn build_listener(
        &self,
        index: usize,
        def: &ListenerDefinition,
    ) -> Result<Listener, FlowgateError> {
        if def.tasks.is_empty() {
            return Err(DefinitionError::EmptyListener(index).into());
        }

        Ok(Listener {
            description: def.description.clone(),
            conditions: self.build_optional_conditions(def.conditions.as_deref())?,
            tasks: def.tasks.clone(),
        })
    }

    fn build_triggers(&self, defs: &[TriggerDefinition]) -> Result<Vec<Trigger>, FlowgateError> {
        let mut seen = HashSet::new();
        let mut triggers = Vec::with_capacity(defs.len());

        for def in defs {
            if !seen.insert(def.id.as_str()) {
                return Err(DefinitionError::DuplicateTrigger(def.id.clone()).into());
            }
            triggers.push(Trigger {
                id: def.id.clone(),
                kind: def.kind.clone(),
                conditions: self.build_optional_conditions(def.conditions.as_deref())?,
            });
        }

        Ok(triggers)
    }

    fn build_optional_conditions(
        &self,
        defs: Option<&[ConditionDefinition]>,
    ) -> Result<Option<Vec<Arc<dyn Condition>>>, FlowgateError> {
        defs.map(|defs| self.build_conditions(defs)).transpose()
    }

    pub fn build_conditions(
        &self,
        defs: &[ConditionDefinition],
    ) -> Result<Vec<Arc<dyn Condition>>, FlowgateError> {
        defs.iter().map(|def| self.build_condition(def)).collect()
    }

    /// Build a single condition from its definition
    pub fn build_condition(
        &self,
        def: &ConditionDefinition,
    ) -> Result<Arc<dyn Condition>, FlowgateError> {
        let condition: Arc<dyn Condition> = match def {
            ConditionDefinition::Expression { expression } => {
                Arc::new(ExpressionCondition::new(expression.as_str())?)
            }
            ConditionDefinition::ExecutionStatus {
                in_states,
                not_in_states,
            } => Arc::new(ExecutionStatusCondition {
                in_states: in_states.clone(),
                not_in_states: not_in_states.clone(),
            }),
            ConditionDefinition::ExecutionFlow { namespace, flow_id } => Arc::new(
                ExecutionFlowCondition::new(namespace.as_str(), flow_id.as_str()),
            ),
            ConditionDefinition::FlowNamespace { namespace, prefix } => {
                Arc::new(FlowNamespaceCondition::new(namespace.as_str(), *prefix))
            }
            ConditionDefinition::DayWeek { day_of_week } => {
                let day = day_of_week.parse::<Weekday>().map_err(|_| {
                    invalid(def, format!("unknown day of week '{}'", day_of_week))
                })?;
                Arc::new(DayWeekCondition::new(day))
            }
            ConditionDefinition::Not { conditions } => {
                if conditions.is_empty() {
                    return Err(invalid(def, "needs at least one nested condition"));
                }
                Arc::new(NotCondition::new(self.build_conditions(conditions)?))
            }
            ConditionDefinition::Or { conditions } => {
                if conditions.is_empty() {
                    return Err(invalid(def, "needs at least one nested condition"));
                }
                Arc::new(OrCondition::new(self.build_conditions(conditions)?))
            }
            ConditionDefinition::Multiple {
                id,
                window_secs,
                conditions,
            } => {
                if *window_secs <= 0 {
                    return Err(invalid(
                        def,
                        format!("window must be positive, got {}s", window_secs),
                    ));
                }
                let window = Duration::try_seconds(*window_secs).ok_or_else(|| {
                    invalid(def, format!("window too large, got {}s", window_secs))
                })?;
                if conditions.is_empty() {
                    return Err(invalid(def, "needs at least one named condition"));
                }
                let mut built = BTreeMap::new();
                for (name, nested) in conditions {
                    built.insert(name.clone(), self.build_condition(nested)?);
                }
                Arc::new(MultipleCondition::new(id.as_str(), window, built))
            }
        };

        Ok(condition)
    }
}

impl Default for FlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(def: &ConditionDefinition, message: impl Into<String>) -> FlowgateError {
    DefinitionError::InvalidCondition(format!("{}: {}", def.kind(), message.into())).into()
}
