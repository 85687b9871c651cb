use async_trait::async_trait;

use crate::engine::{Condition, ConditionError, EvaluationContext};

/// Passes when the evaluated flow lives in `namespace`, or below it when
/// `prefix` is set
#[derive(Debug, Clone)]
pub struct FlowNamespaceCondition {
    pub namespace: String,
    pub prefix: bool,
}

impl FlowNamespaceCondition {
    pub fn new(namespace: impl Into<String>, prefix: bool) -> Self {
        Self {
            namespace: namespace.into(),
            prefix,
        }
    }
}

#[async_trait]
impl Condition for FlowNamespaceCondition {
    fn name(&self) -> &str {
        "flow_namespace"
    }

    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        let namespace = &context.flow().namespace;

        if self.prefix {
            Ok(namespace == &self.namespace
                || namespace.starts_with(&format!("{}.", self.namespace)))
        } else {
            Ok(namespace == &self.namespace)
        }
    }
}
