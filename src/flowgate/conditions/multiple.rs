// SPDX-License-Identifier: MIT

//! Conditions spanning several flows
//!
//! A `MultipleCondition` never tests its sub-conditions itself. Whoever
//! observes executions tests them and records the results in a
//! [`ConditionWindow`](crate::engine::ConditionWindow); this condition only
//! checks that every sub-condition was satisfied inside a live window.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::{Condition, ConditionError, EvaluationContext};

#[derive(Debug, Clone)]
pub struct MultipleCondition {
    pub id: String,
    pub window: Duration,
    pub conditions: BTreeMap<String, Arc<dyn Condition>>,
}

impl MultipleCondition {
    pub fn new(
        id: impl Into<String>,
        window: Duration,
        conditions: BTreeMap<String, Arc<dyn Condition>>,
    ) -> Self {
        Self {
            id: id.into(),
            window,
            conditions,
        }
    }

    /// Test each sub-condition on `context`, by name, so the results can be
    /// recorded into storage
    pub async fn sub_results(
        &self,
        context: &EvaluationContext<'_>,
    ) -> Result<BTreeMap<String, bool>, ConditionError> {
        let mut results = BTreeMap::new();
        for (name, condition) in &self.conditions {
            results.insert(name.clone(), condition.test(context).await?);
        }
        Ok(results)
    }
}

#[async_trait]
impl Condition for MultipleCondition {
    fn name(&self) -> &str {
        "multiple"
    }

    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        let storage = context
            .storage()
            .ok_or_else(|| ConditionError::missing_storage(self.name()))?;

        let window = match storage.get(context.flow(), &self.id).await? {
            Some(window) if window.is_valid_at(Utc::now()) => window,
            _ => return Ok(false),
        };

        Ok(self
            .conditions
            .keys()
            .all(|name| window.is_satisfied(name)))
    }
}
