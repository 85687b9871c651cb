// SPDX-License-Identifier: MIT

//! Expression conditions
//!
//! Boolean expressions over run-context variables, for example
//! `execution.state == 'FAILED' and inputs.retries > 2`.

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Expression, Literal};
pub use evaluator::evaluate;
pub use parser::parse;

use async_trait::async_trait;

use crate::engine::{Condition, ConditionError, EvaluationContext};

/// Condition backed by a parsed expression
#[derive(Debug, Clone)]
pub struct ExpressionCondition {
    source: String,
    expression: Expression,
}

impl ExpressionCondition {
    /// Parse `source`; fails on invalid syntax so errors surface at build time
    pub fn new(source: impl Into<String>) -> Result<Self, ConditionError> {
        let source = source.into();
        let expression = parse(&source)?;
        Ok(Self { source, expression })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

#[async_trait]
impl Condition for ExpressionCondition {
    fn name(&self) -> &str {
        "expression"
    }

    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        Ok(evaluate(&self.expression, context.run_context()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::{Execution, Flow, StateType};
    use crate::engine::{DefaultRunContextFactory, RunContextFactory};

    #[tokio::test]
    async fn test_expression_against_execution() {
        let flow = Flow::new("io.flowgate", "hello");
        let execution = Execution::new(&flow).with_state(StateType::Failed);
        let run_context = DefaultRunContextFactory::new().of(&flow, Some(&execution));
        let context = EvaluationContext::new(run_context, &flow, Some(&execution), None);

        let failed = ExpressionCondition::new("execution.state == 'FAILED'").unwrap();
        let other_flow = ExpressionCondition::new("flow.id == 'other'").unwrap();

        assert!(failed.test(&context).await.unwrap());
        assert!(!other_flow.test(&context).await.unwrap());
    }

    #[tokio::test]
    async fn test_expression_without_execution() {
        let flow = Flow::new("io.flowgate", "hello");
        let run_context = DefaultRunContextFactory::new().of(&flow, None);
        let context = EvaluationContext::new(run_context, &flow, None, None);

        let condition = ExpressionCondition::new("execution.state == null").unwrap();
        assert!(condition.test(&context).await.unwrap());
    }

    #[test]
    fn test_invalid_expression_rejected() {
        let err = ExpressionCondition::new("execution.state ==").unwrap_err();
        assert!(matches!(err, ConditionError::InvalidExpression { .. }));
    }
}
