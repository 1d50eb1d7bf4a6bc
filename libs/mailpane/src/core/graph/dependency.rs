// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::DependencyStatus;
use crate::core::ids::{ChainId, DefinitionId, DependencyId};

/// Update timing for one edge. Times are in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyPerformance {
    pub update_count: u64,
    pub avg_update_time: f64,
    pub last_update_time: f64,
    pub heaviest_update: f64,
}

impl DependencyPerformance {
    pub fn record(&mut self, duration: Duration) {
        let ms = duration.as_secs_f64() * 1000.0;
        self.update_count += 1;
        // Running mean avoids keeping every sample.
        self.avg_update_time += (ms - self.avg_update_time) / self.update_count as f64;
        self.last_update_time = ms;
        if ms > self.heaviest_update {
            self.heaviest_update = ms;
        }
    }
}

/// Directed, data-typed link between a provider and a consumer component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: DependencyId,
    pub provider_id: String,
    pub consumer_id: String,
    pub provider_definition_id: DefinitionId,
    pub consumer_definition_id: DefinitionId,
    pub data_type: String,
    pub status: DependencyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_position: Option<usize>,
    #[serde(default)]
    pub performance: DependencyPerformance,
    pub created_at: DateTime<Utc>,
    /// Last status change or accepted data update.
    pub last_updated: DateTime<Utc>,
    /// Last accepted data update; drives debounce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_data_update: Option<DateTime<Utc>>,
}

impl Dependency {
    pub(crate) fn new(
        provider_id: &str,
        consumer_id: &str,
        data_type: &str,
        provider_definition_id: DefinitionId,
        consumer_definition_id: DefinitionId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DependencyId::new(),
            provider_id: provider_id.to_string(),
            consumer_id: consumer_id.to_string(),
            provider_definition_id,
            consumer_definition_id,
            data_type: data_type.to_string(),
            status: DependencyStatus::Pending,
            chain_id: None,
            chain_position: None,
            performance: DependencyPerformance::default(),
            created_at: now,
            last_updated: now,
            last_data_update: None,
        }
    }

    pub fn touches(&self, component_id: &str) -> bool {
        self.provider_id == component_id || self.consumer_id == component_id
    }

    pub fn uses_definition(&self, definition_id: &DefinitionId) -> bool {
        &self.provider_definition_id == definition_id
            || &self.consumer_definition_id == definition_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_running_average() {
        let mut perf = DependencyPerformance::default();
        perf.record(Duration::from_millis(10));
        perf.record(Duration::from_millis(30));
        perf.record(Duration::from_millis(20));

        assert_eq!(perf.update_count, 3);
        assert!((perf.avg_update_time - 20.0).abs() < 1e-9);
        assert!((perf.last_update_time - 20.0).abs() < 1e-9);
        assert!((perf.heaviest_update - 30.0).abs() < 1e-9);
    }
}
