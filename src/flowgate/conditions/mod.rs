// SPDX-License-Identifier: MIT

//! Built-in conditions
//!
//! Any type implementing [`Condition`](crate::engine::Condition) can gate a
//! trigger or a listener; these are the ones flow definitions can reference
//! by `type`.

mod composite;
mod execution;
pub mod expression;
mod flow;
mod multiple;
mod schedule;

pub use composite::{NotCondition, OrCondition};
pub use execution::{ExecutionFlowCondition, ExecutionStatusCondition};
pub use expression::ExpressionCondition;
pub use flow::FlowNamespaceCondition;
pub use multiple::MultipleCondition;
pub use schedule::DayWeekCondition;
