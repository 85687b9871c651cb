// SPDX-License-Identifier: MIT

pub mod aggregator;
pub mod builder;
pub mod conditions;
pub mod loader;
pub mod service;
pub mod types;

pub use aggregator::evaluate_all;
pub use builder::FlowBuilder;
pub use loader::FlowLoader;
pub use service::ConditionService;
