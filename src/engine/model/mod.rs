// SPDX-License-Identifier: MIT

//! Flow and execution data model

mod execution;
mod flow;

pub use execution::{Execution, State, StateHistory, StateType, TaskRun};
pub use flow::{Flow, Listener, ResolvedTask, Task, Trigger};
