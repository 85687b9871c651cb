// SPDX-License-Identifier: MIT

//! Condition evaluation for workflow triggers and listeners.
//!
//! `engine` holds the primitives (the `Condition` trait, evaluation context,
//! runtime variables, cross-flow storage, data model and errors). `flowgate`
//! holds the `ConditionService`, the built-in conditions and YAML loading.

pub mod engine;
pub mod flowgate;
