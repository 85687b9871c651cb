// SPDX-License-Identifier: MIT

//! Building blocks of condition evaluation: the `Condition` trait, the
//! evaluation context, runtime variables, cross-flow storage, the data model
//! and errors.

pub mod condition;
pub mod context;
pub mod error;
pub mod model;
pub mod runtime;
pub mod storage;

pub use condition::Condition;
pub use context::EvaluationContext;
pub use error::{ConditionError, DefinitionError, FlowgateError};
pub use runtime::{DefaultRunContextFactory, RunContext, RunContextFactory};
pub use storage::{ConditionWindow, InMemoryConditionStorage, MultipleConditionStorage};
