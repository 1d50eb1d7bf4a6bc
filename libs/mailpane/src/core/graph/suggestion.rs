// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ids::SuggestionId;

/// How often a provider/consumer pair has been linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsagePattern {
    pub frequency: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Data types linked between the pair, in the order they were linked.
    pub user_actions: Vec<String>,
}

impl UsagePattern {
    pub(crate) fn new() -> Self {
        let now = Utc::now();
        Self {
            frequency: 0,
            first_seen: now,
            last_seen: now,
            user_actions: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, data_type: &str) {
        self.frequency += 1;
        self.last_seen = Utc::now();
        self.user_actions.push(data_type.to_string());
    }

    /// Milliseconds between the first and the latest observation.
    pub fn time_span_ms(&self) -> i64 {
        (self.last_seen - self.first_seen).num_milliseconds()
    }
}

/// A proposed, not yet linked provider/consumer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: SuggestionId,
    pub suggested_provider_id: String,
    pub suggested_consumer_id: String,
    pub data_type: String,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub reason: String,
    pub usage_pattern: UsagePattern,
}
