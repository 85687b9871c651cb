use async_trait::async_trait;
use std::fmt::Debug;

use super::context::EvaluationContext;
use super::error::ConditionError;

/// Trait for predicates that gate triggers and listeners.
///
/// Implementations must not rely on being evaluated: aggregation stops at the
/// first condition that returns `false`, so later conditions in a list may
/// never run.
#[async_trait]
pub trait Condition: Send + Sync + Debug {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Classify the context as passing or not
    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError>;
}
