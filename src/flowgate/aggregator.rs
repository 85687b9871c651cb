//! All-must-pass evaluation of a condition list

use std::sync::Arc;

use crate::engine::{Condition, ConditionError, EvaluationContext};

/// Evaluate conditions in order, stopping at the first one that fails.
///
/// An empty list passes. Errors from a condition propagate unchanged and
/// abort the evaluation.
pub async fn evaluate_all(
    conditions: &[Arc<dyn Condition>],
    context: &EvaluationContext<'_>,
) -> Result<bool, ConditionError> {
    for (index, condition) in conditions.iter().enumerate() {
        if !condition.test(context).await? {
            log::debug!(
                "Condition #{} '{}' rejected {:?}",
                index,
                condition.name(),
                context
            );
            return Ok(false);
        }
    }

    Ok(true)
}
