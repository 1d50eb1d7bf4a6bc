// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::DependencyStatus;
use crate::core::ids::{ChainId, DependencyId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainPerformance {
    /// Sum of the member edges' average update times (ms).
    pub total_propagation_time: f64,
    /// Member edge with the largest average update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottleneck_dependency_id: Option<DependencyId>,
}

/// Maximal linear path of same-type edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub id: ChainId,
    /// Member edges in walk order.
    pub dependencies: Vec<DependencyId>,
    pub data_type: String,
    pub has_cycle: bool,
    pub status: DependencyStatus,
    #[serde(default)]
    pub performance: ChainPerformance,
}

impl Chain {
    pub(crate) fn new(data_type: &str, dependencies: Vec<DependencyId>) -> Self {
        Self {
            id: ChainId::new(),
            dependencies,
            data_type: data_type.to_string(),
            has_cycle: false,
            status: DependencyStatus::Connected,
            performance: ChainPerformance::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn position_of(&self, dependency_id: &DependencyId) -> Option<usize> {
        self.dependencies.iter().position(|d| d == dependency_id)
    }
}

/// Component walk implied by ordered `(provider, consumer)` pairs: the first
/// provider followed by every consumer.
pub(crate) fn component_sequence<'a, I>(edges: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut sequence = Vec::new();
    for (provider, consumer) in edges {
        if sequence.is_empty() {
            sequence.push(provider);
        }
        sequence.push(consumer);
    }
    sequence
}

/// Whether any component occurs more than once in a walk.
pub(crate) fn has_repeat(sequence: &[&str]) -> bool {
    let mut seen = HashSet::with_capacity(sequence.len());
    sequence.iter().any(|component| !seen.insert(*component))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_sequence_walks_consumers() {
        let seq = component_sequence([("a", "b"), ("b", "c"), ("c", "d")]);
        assert_eq!(seq, vec!["a", "b", "c", "d"]);
        assert!(!has_repeat(&seq));
    }

    #[test]
    fn test_repeat_detects_loop_back() {
        let seq = component_sequence([("a", "b"), ("b", "a")]);
        assert!(has_repeat(&seq));
        assert!(has_repeat(&component_sequence([("a", "a")])));
    }
}
