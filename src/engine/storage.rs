// SPDX-License-Identifier: MIT

//! Storage for conditions that span several flows
//!
//! A `ConditionWindow` collects, for one flow and one multiple-condition id,
//! which named sub-conditions have already been satisfied during a time
//! window. The evaluation engine only ever reads windows; writers are the
//! callers that observe executions.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::ConditionError;
use super::model::Flow;

/// Results collected for one multiple condition during a time window
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionWindow {
    pub namespace: String,
    pub flow_id: String,
    pub condition_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub results: HashMap<String, bool>,
}

impl ConditionWindow {
    /// Open a new empty window starting at `now`. The end saturates at the
    /// latest representable instant.
    pub fn open(flow: &Flow, condition_id: &str, window: Duration, now: DateTime<Utc>) -> Self {
        Self {
            namespace: flow.namespace.clone(),
            flow_id: flow.id.clone(),
            condition_id: condition_id.to_string(),
            start: now,
            end: now
                .checked_add_signed(window)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            results: HashMap::new(),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }

    /// Merge new results; a sub-condition once satisfied stays satisfied
    pub fn with(mut self, results: impl IntoIterator<Item = (String, bool)>) -> Self {
        for (name, passed) in results {
            let entry = self.results.entry(name).or_insert(false);
            *entry = *entry || passed;
        }
        self
    }

    pub fn is_satisfied(&self, name: &str) -> bool {
        self.results.get(name).copied().unwrap_or(false)
    }

    fn key(&self) -> WindowKey {
        WindowKey::new(&self.namespace, &self.flow_id, &self.condition_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WindowKey {
    namespace: String,
    flow_id: String,
    condition_id: String,
}

impl WindowKey {
    fn new(namespace: &str, flow_id: &str, condition_id: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            flow_id: flow_id.to_string(),
            condition_id: condition_id.to_string(),
        }
    }
}

/// Lookup service for conditions that depend on other flows
#[async_trait]
pub trait MultipleConditionStorage: Send + Sync {
    /// Window for `condition_id` on `flow`, if one was recorded
    async fn get(
        &self,
        flow: &Flow,
        condition_id: &str,
    ) -> Result<Option<ConditionWindow>, ConditionError>;

    /// Insert or replace a window
    async fn save(&self, window: ConditionWindow) -> Result<(), ConditionError>;

    /// Drop every window that is no longer valid at `now`, returning how many
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, ConditionError>;
}

/// Process-local storage, shared across clones
#[derive(Clone, Default)]
pub struct InMemoryConditionStorage {
    windows: Arc<RwLock<HashMap<WindowKey, ConditionWindow>>>,
}

impl InMemoryConditionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with previously recorded windows
    pub async fn with_windows(windows: Vec<ConditionWindow>) -> Self {
        let storage = Self::new();
        {
            let mut map = storage.windows.write().await;
            for window in windows {
                map.insert(window.key(), window);
            }
        }
        storage
    }

    /// Record sub-condition results, opening a fresh window when the current
    /// one is missing or expired.
    pub async fn record(
        &self,
        flow: &Flow,
        condition_id: &str,
        window: Duration,
        results: impl IntoIterator<Item = (String, bool)>,
        now: DateTime<Utc>,
    ) -> ConditionWindow {
        let key = WindowKey::new(&flow.namespace, &flow.id, condition_id);
        let mut windows = self.windows.write().await;

        let current = match windows.remove(&key) {
            Some(existing) if existing.is_valid_at(now) => existing,
            _ => ConditionWindow::open(flow, condition_id, window, now),
        };
        let updated = current.with(results);

        log::debug!(
            "Recorded window {}.{}:{} -> {:?}",
            flow.namespace,
            flow.id,
            condition_id,
            updated.results
        );

        windows.insert(key, updated.clone());
        updated
    }

    pub async fn len(&self) -> usize {
        self.windows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.windows.read().await.is_empty()
    }
}

#[async_trait]
impl MultipleConditionStorage for InMemoryConditionStorage {
    async fn get(
        &self,
        flow: &Flow,
        condition_id: &str,
    ) -> Result<Option<ConditionWindow>, ConditionError> {
        let windows = self.windows.read().await;
        Ok(windows
            .get(&WindowKey::new(&flow.namespace, &flow.id, condition_id))
            .cloned())
    }

    async fn save(&self, window: ConditionWindow) -> Result<(), ConditionError> {
        log::debug!(
            "Saving window {}.{}:{}",
            window.namespace,
            window.flow_id,
            window.condition_id
        );
        let mut windows = self.windows.write().await;
        windows.insert(window.key(), window);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, ConditionError> {
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, w| w.is_valid_at(now));
        Ok(before - windows.len())
    }
}
