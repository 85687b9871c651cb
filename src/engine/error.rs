// SPDX-License-Identifier: MIT

//! Typed error handling for flowgate-rs
//!
//! Errors are split the same way evaluation is: failures raised by a single
//! condition (`ConditionError`), problems found while turning YAML definitions
//! into a runnable flow (`DefinitionError`), and the top-level `FlowgateError`
//! returned by the service.

use thiserror::Error;

/// Top-level error type for flowgate-rs
#[derive(Debug, Error)]
pub enum FlowgateError {
    /// A condition failed while being tested
    #[error("Condition error: {0}")]
    Condition(#[from] ConditionError),

    /// The caller broke a precondition of the entry point it used
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Invalid flow or condition definition
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Configuration errors (missing env vars, missing files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by a condition's `test`
#[derive(Debug, Error)]
pub enum ConditionError {
    /// The condition inspects the execution but none was supplied
    #[error("Condition '{condition}' cannot be evaluated without an execution")]
    MissingExecution { condition: String },

    /// The condition needs cross-flow storage but none was supplied
    #[error("Condition '{condition}' cannot be evaluated without multiple condition storage")]
    MissingStorage { condition: String },

    /// Expression could not be parsed
    #[error("Invalid expression '{expression}': {message}")]
    InvalidExpression { expression: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Errors found while building a flow from its definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Listener declared without any task to run
    #[error("Listener #{0} declares no tasks")]
    EmptyListener(usize),

    /// Two triggers share the same id
    #[error("Duplicate trigger id: {0}")]
    DuplicateTrigger(String),

    /// Condition definition rejected
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
}

impl FlowgateError {
    /// Create a contract violation error
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True when the caller misused an entry point, as opposed to a
    /// condition failing or saying no.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation(_))
    }
}

impl ConditionError {
    pub fn missing_execution(condition: impl Into<String>) -> Self {
        Self::MissingExecution {
            condition: condition.into(),
        }
    }

    pub fn missing_storage(condition: impl Into<String>) -> Self {
        Self::MissingStorage {
            condition: condition.into(),
        }
    }

    pub fn invalid_expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.into(),
            message: message.into(),
        }
    }
}

impl From<&str> for FlowgateError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for FlowgateError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}
