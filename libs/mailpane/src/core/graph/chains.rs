// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Chain maintenance: folding new edges in and splitting on removal.

use super::chain::{component_sequence, has_repeat};
use super::{Chain, ChainPerformance, Dependency, DependencyStatus, LinkGraph};
use crate::core::ids::{ChainId, DependencyId};
use crate::core::observability::{LogEntry, LogLevel};
use crate::core::pubsub::{Event, GraphEvent};

impl LinkGraph {
    /// Fold a freshly created edge into the chain structure.
    ///
    /// A same-type chain ending at the edge's provider is extended at the
    /// tail, one starting at its consumer at the head. When both exist and
    /// differ they merge into a single new chain. Otherwise a singleton chain
    /// is started.
    pub(super) fn fold_into_chains(&mut self, dependency_id: &DependencyId) {
        let Some(dependency) = self.dependencies.get(dependency_id) else {
            return;
        };
        let provider_id = dependency.provider_id.clone();
        let consumer_id = dependency.consumer_id.clone();
        let data_type = dependency.data_type.clone();

        let upstream = self.chain_ending_at(&provider_id, &data_type);
        let downstream = self.chain_starting_at(&consumer_id, &data_type);

        let chain_id = match (upstream, downstream) {
            (None, None) => {
                let chain = Chain::new(&data_type, vec![dependency_id.clone()]);
                let chain_id = chain.id.clone();
                self.chains.insert(chain_id.clone(), chain);
                self.log(
                    LogEntry::new(LogLevel::Debug, "Started chain")
                        .component(provider_id)
                        .dependency(dependency_id)
                        .chain(&chain_id)
                        .data_type(data_type),
                );
                chain_id
            }
            (Some(upstream), None) => {
                if let Some(chain) = self.chains.get_mut(&upstream) {
                    chain.dependencies.push(dependency_id.clone());
                }
                upstream
            }
            (None, Some(downstream)) => {
                if let Some(chain) = self.chains.get_mut(&downstream) {
                    chain.dependencies.insert(0, dependency_id.clone());
                }
                downstream
            }
            (Some(upstream), Some(downstream)) if upstream != downstream => {
                let head = self.chains.remove(&upstream).map(|c| c.dependencies);
                let tail = self.chains.remove(&downstream).map(|c| c.dependencies);

                let mut members = head.unwrap_or_default();
                members.push(dependency_id.clone());
                members.extend(tail.unwrap_or_default());

                let merged = Chain::new(&data_type, members);
                let merged_id = merged.id.clone();
                self.chains.insert(merged_id.clone(), merged);

                for removed in [&upstream, &downstream] {
                    self.events.emit(&Event::Graph(GraphEvent::ChainRemoved {
                        chain_id: removed.clone(),
                    }));
                }
                self.log(
                    LogEntry::new(
                        LogLevel::Info,
                        format!("Merged chains {} and {}", upstream, downstream),
                    )
                    .dependency(dependency_id)
                    .chain(&merged_id)
                    .data_type(data_type),
                );
                merged_id
            }
            (Some(same), Some(_)) => {
                // The edge closes the chain on itself. Splice it between the
                // adjacent pair it bridges, else append.
                let splice_at = self.chains.get(&same).and_then(|chain| {
                    chain.dependencies.windows(2).position(|pair| {
                        let cur = self.dependencies.get(&pair[0]);
                        let next = self.dependencies.get(&pair[1]);
                        cur.is_some_and(|d| d.consumer_id == provider_id)
                            && next.is_some_and(|d| d.provider_id == consumer_id)
                    })
                });
                if let Some(chain) = self.chains.get_mut(&same) {
                    match splice_at {
                        Some(i) => chain.dependencies.insert(i + 1, dependency_id.clone()),
                        None => chain.dependencies.push(dependency_id.clone()),
                    }
                }
                same
            }
        };

        self.refresh_chain(&chain_id);
    }

    /// Drop a removed edge from its chain.
    ///
    /// Removing the only member deletes the chain; removing an end shrinks it;
    /// removing an interior edge replaces the chain with two new ones.
    pub(super) fn detach_from_chain(&mut self, chain_id: &ChainId, dependency_id: &DependencyId) {
        let Some(chain) = self.chains.get_mut(chain_id) else {
            return;
        };
        let Some(position) = chain.position_of(dependency_id) else {
            return;
        };
        let len = chain.len();

        if len == 1 {
            self.chains.remove(chain_id);
            self.events.emit(&Event::Graph(GraphEvent::ChainRemoved {
                chain_id: chain_id.clone(),
            }));
            self.log(
                LogEntry::new(LogLevel::Debug, "Removed empty chain")
                    .dependency(dependency_id)
                    .chain(chain_id),
            );
            return;
        }

        if position == 0 || position == len - 1 {
            chain.dependencies.remove(position);
            self.refresh_chain(chain_id);
            return;
        }

        let Some(chain) = self.chains.remove(chain_id) else {
            return;
        };
        let left = Chain::new(&chain.data_type, chain.dependencies[..position].to_vec());
        let right = Chain::new(&chain.data_type, chain.dependencies[position + 1..].to_vec());
        let (left_id, right_id) = (left.id.clone(), right.id.clone());
        self.chains.insert(left_id.clone(), left);
        self.chains.insert(right_id.clone(), right);

        self.events.emit(&Event::Graph(GraphEvent::ChainRemoved {
            chain_id: chain_id.clone(),
        }));
        self.log(
            LogEntry::new(
                LogLevel::Info,
                format!("Split chain {} into {} and {}", chain_id, left_id, right_id),
            )
            .dependency(dependency_id)
            .chain(chain_id)
            .data_type(chain.data_type),
        );

        self.refresh_chain(&left_id);
        self.refresh_chain(&right_id);
    }

    /// Re-index member positions and recompute cycle flag, status and
    /// performance for a chain.
    pub(super) fn refresh_chain(&mut self, chain_id: &ChainId) {
        let Some(members) = self.chains.get(chain_id).map(|c| c.dependencies.clone()) else {
            return;
        };

        for (position, id) in members.iter().enumerate() {
            if let Some(dep) = self.dependencies.get_mut(id) {
                dep.chain_id = Some(chain_id.clone());
                dep.chain_position = Some(position);
            }
        }

        let edges: Vec<&Dependency> = members
            .iter()
            .filter_map(|id| self.dependencies.get(id))
            .collect();
        let sequence = component_sequence(
            edges
                .iter()
                .map(|d| (d.provider_id.as_str(), d.consumer_id.as_str())),
        );
        let has_cycle = has_repeat(&sequence);
        let status = if has_cycle {
            DependencyStatus::CycleDetected
        } else {
            DependencyStatus::aggregate(edges.iter().map(|d| d.status))
        };
        let performance = ChainPerformance {
            total_propagation_time: edges.iter().map(|d| d.performance.avg_update_time).sum(),
            bottleneck_dependency_id: edges
                .iter()
                .filter(|d| d.performance.update_count > 0)
                .max_by(|a, b| {
                    a.performance
                        .avg_update_time
                        .total_cmp(&b.performance.avg_update_time)
                })
                .map(|d| d.id.clone()),
        };

        let Some(chain) = self.chains.get_mut(chain_id) else {
            return;
        };
        let became_cyclic = has_cycle && !chain.has_cycle;
        chain.has_cycle = has_cycle;
        chain.status = status;
        chain.performance = performance;

        if became_cyclic {
            self.log(
                LogEntry::new(LogLevel::Warn, "Chain contains a cycle").chain(chain_id),
            );
        }
        self.events.emit(&Event::Graph(GraphEvent::ChainUpdated {
            chain_id: chain_id.clone(),
            status,
            has_cycle,
        }));
    }

    /// Same-type chain whose last edge is consumed by `component_id`.
    fn chain_ending_at(&self, component_id: &str, data_type: &str) -> Option<ChainId> {
        self.chains
            .values()
            .filter(|chain| chain.data_type == data_type)
            .find(|chain| {
                chain
                    .dependencies
                    .last()
                    .and_then(|id| self.dependencies.get(id))
                    .is_some_and(|dep| dep.consumer_id == component_id)
            })
            .map(|chain| chain.id.clone())
    }

    /// Same-type chain whose first edge is provided by `component_id`.
    fn chain_starting_at(&self, component_id: &str, data_type: &str) -> Option<ChainId> {
        self.chains
            .values()
            .filter(|chain| chain.data_type == data_type)
            .find(|chain| {
                chain
                    .dependencies
                    .first()
                    .and_then(|id| self.dependencies.get(id))
                    .is_some_and(|dep| dep.provider_id == component_id)
            })
            .map(|chain| chain.id.clone())
    }
}
