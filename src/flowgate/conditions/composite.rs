//! Conditions combining other conditions

use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::{Condition, ConditionError, EvaluationContext};
use crate::flowgate::aggregator::evaluate_all;

/// Passes when at least one nested condition fails.
///
/// This negates the whole list: `not [a, b]` is `!(a && b)`.
#[derive(Debug, Clone)]
pub struct NotCondition {
    pub conditions: Vec<Arc<dyn Condition>>,
}

impl NotCondition {
    pub fn new(conditions: Vec<Arc<dyn Condition>>) -> Self {
        Self { conditions }
    }
}

#[async_trait]
impl Condition for NotCondition {
    fn name(&self) -> &str {
        "not"
    }

    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        Ok(!evaluate_all(&self.conditions, context).await?)
    }
}

/// Passes when any nested condition passes, stopping at the first one
#[derive(Debug, Clone)]
pub struct OrCondition {
    pub conditions: Vec<Arc<dyn Condition>>,
}

impl OrCondition {
    pub fn new(conditions: Vec<Arc<dyn Condition>>) -> Self {
        Self { conditions }
    }
}

#[async_trait]
impl Condition for OrCondition {
    fn name(&self) -> &str {
        "or"
    }

    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        for condition in &self.conditions {
            if condition.test(context).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
