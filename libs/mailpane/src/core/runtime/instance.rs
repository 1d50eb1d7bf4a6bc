// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{DataPredicate, DataTransform};
use crate::core::graph::DependencyStatus;
use crate::core::ids::{DefinitionId, DependencyId, InstanceId};

/// Per-instance configuration: option values plus data-flow hooks.
#[derive(Clone, Default)]
pub struct InstanceConfig {
    pub options: Map<String, Value>,
    /// `Some(false)` stores data without notifying the consumer.
    pub auto_update: Option<bool>,
    /// Returning `false` drops a payload silently.
    pub filter: Option<DataPredicate>,
    /// Takes precedence over the link definition's transform.
    pub transform: Option<DataTransform>,
}

impl InstanceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = Some(auto_update);
        self
    }

    pub fn filter(mut self, filter: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn transform(mut self, transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Overlay `overrides` on top of `self`. Option maps merge key by key; hooks
    /// and flags are replaced only when set in `overrides`.
    pub fn merged_with(&self, overrides: &InstanceConfig) -> InstanceConfig {
        let mut options = self.options.clone();
        options.extend(overrides.options.iter().map(|(k, v)| (k.clone(), v.clone())));
        InstanceConfig {
            options,
            auto_update: overrides.auto_update.or(self.auto_update),
            filter: overrides.filter.clone().or_else(|| self.filter.clone()),
            transform: overrides.transform.clone().or_else(|| self.transform.clone()),
        }
    }

    /// Whether the consumer should be notified when data is stored.
    pub fn notifies(&self) -> bool {
        self.auto_update != Some(false)
    }
}

impl std::fmt::Debug for InstanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceConfig")
            .field("options", &self.options)
            .field("auto_update", &self.auto_update)
            .field("filter", &self.filter.is_some())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Live counterpart of a link: configuration, status and the payload in transit.
#[derive(Debug, Clone)]
pub struct Instance {
    pub id: InstanceId,
    pub definition_id: DefinitionId,
    /// Graph edge this instance realizes, when created through a workspace.
    pub dependency_id: Option<DependencyId>,
    pub provider_id: String,
    pub consumer_id: String,
    pub provider_type: String,
    pub consumer_type: String,
    pub status: DependencyStatus,
    pub config: InstanceConfig,
    pub is_active: bool,
    pub is_ready: bool,
    pub current_data: Option<Value>,
    pub error: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl Instance {
    pub fn touches(&self, component_id: &str) -> bool {
        self.provider_id == component_id || self.consumer_id == component_id
    }
}

/// Result of feeding data into an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOutcome {
    /// Stored as current data (and the consumer notified unless disabled).
    Stored,
    /// Dropped by the instance filter; nothing changed.
    Filtered,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overlays_options_and_hooks() {
        let base = InstanceConfig::new()
            .option("sortOrder", json!("date"))
            .option("pageSize", json!(50))
            .filter(|_| true);
        let overrides = InstanceConfig::new()
            .option("sortOrder", json!("sender"))
            .auto_update(false);

        let merged = base.merged_with(&overrides);
        assert_eq!(merged.options.get("sortOrder"), Some(&json!("sender")));
        assert_eq!(merged.options.get("pageSize"), Some(&json!(50)));
        assert!(merged.filter.is_some());
        assert!(!merged.notifies());
    }

    #[test]
    fn test_notifies_by_default() {
        assert!(InstanceConfig::new().notifies());
        assert!(InstanceConfig::new().auto_update(true).notifies());
    }
}
