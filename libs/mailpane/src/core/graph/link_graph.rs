// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use chrono::Utc;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::Dfs;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use super::{Chain, Dependency, DependencyStatus, Suggestion, UsagePattern};
use crate::core::config::GraphConfig;
use crate::core::definitions::{Definition, DefinitionRegistry, DefinitionRole};
use crate::core::error::{DependencyError, Result};
use crate::core::ids::{ChainId, DefinitionId, DependencyId, SuggestionId};
use crate::core::observability::{AuditLog, LogEntry, LogFilter, LogLevel};
use crate::core::pubsub::{Event, EventBus, GraphEvent};

type Triple = (String, String, String);

/// Directed graph of links between component instances.
///
/// Owns the [`DefinitionRegistry`] it links against, every [`Dependency`]
/// edge, the [`Chain`]s built from them, usage statistics, [`Suggestion`]s
/// and the audit log. Edges live in an arena keyed by id; the index tables and
/// the petgraph topology are updated by the same mutation that adds or removes
/// an edge.
pub struct LinkGraph {
    pub(super) definitions: DefinitionRegistry,
    pub(super) dependencies: HashMap<DependencyId, Dependency>,
    triples: HashMap<Triple, DependencyId>,
    by_provider: HashMap<String, BTreeSet<DependencyId>>,
    by_consumer: HashMap<String, BTreeSet<DependencyId>>,
    by_type: HashMap<String, BTreeSet<DependencyId>>,
    /// Component topology used for reachability queries. Node weights are
    /// component ids, edge weights dependency ids.
    topology: StableDiGraph<String, DependencyId>,
    nodes: HashMap<String, NodeIndex>,
    edges: HashMap<DependencyId, EdgeIndex>,
    pub(super) chains: BTreeMap<ChainId, Chain>,
    usage: BTreeMap<(String, String), UsagePattern>,
    suggestions: Vec<Suggestion>,
    logs: AuditLog,
    config: GraphConfig,
    pub(super) events: Arc<EventBus>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default(), Arc::new(EventBus::new()))
    }

    pub fn with_config(config: GraphConfig, events: Arc<EventBus>) -> Self {
        Self {
            definitions: DefinitionRegistry::new(),
            dependencies: HashMap::new(),
            triples: HashMap::new(),
            by_provider: HashMap::new(),
            by_consumer: HashMap::new(),
            by_type: HashMap::new(),
            topology: StableDiGraph::new(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            chains: BTreeMap::new(),
            usage: BTreeMap::new(),
            suggestions: Vec::new(),
            logs: AuditLog::with_capacity(config.logging.capacity),
            config,
            events,
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    pub fn definitions(&self) -> &DefinitionRegistry {
        &self.definitions
    }

    pub fn register_definition(&mut self, definition: Definition) -> DefinitionId {
        let component_id = definition.component_id.clone();
        let data_type = definition.data_type.clone();
        let role = definition.role;
        let id = self.definitions.register(definition);

        self.log(
            LogEntry::new(
                LogLevel::Debug,
                format!("Registered {} definition {}", role, id),
            )
            .component(component_id)
            .data_type(data_type),
        );
        self.regenerate_suggestions();
        id
    }

    /// Remove a definition, cascading to every dependency built on it.
    pub fn remove_definition(&mut self, id: &DefinitionId) -> Option<Definition> {
        let Some(definition) = self.definitions.get(id).cloned() else {
            self.log(LogEntry::new(
                LogLevel::Debug,
                format!("Definition {} not found for removal", id),
            ));
            return None;
        };

        let dependents: Vec<DependencyId> = self
            .dependencies
            .values()
            .filter(|dep| dep.uses_definition(id))
            .map(|dep| dep.id.clone())
            .collect();
        for dependency_id in &dependents {
            self.remove_dependency(dependency_id);
        }

        let removed = self.definitions.remove(id);
        self.log(
            LogEntry::new(
                LogLevel::Info,
                format!(
                    "Removed definition {} ({} dependent link(s) removed)",
                    id,
                    dependents.len()
                ),
            )
            .component(definition.component_id)
            .data_type(definition.data_type),
        );
        self.regenerate_suggestions();
        removed
    }

    /// Remove every dependency touching a component and all of its definitions.
    pub fn remove_component(&mut self, component_id: &str) -> usize {
        let touching: Vec<DependencyId> = self
            .dependencies
            .values()
            .filter(|dep| dep.touches(component_id))
            .map(|dep| dep.id.clone())
            .collect();
        for dependency_id in &touching {
            self.remove_dependency(dependency_id);
        }
        for definition_id in self.definitions.ids_for_component(component_id) {
            self.definitions.remove(&definition_id);
        }

        self.log(
            LogEntry::new(
                LogLevel::Info,
                format!("Removed component ({} link(s) removed)", touching.len()),
            )
            .component(component_id),
        );
        self.regenerate_suggestions();
        touching.len()
    }

    // =========================================================================
    // Dependencies
    // =========================================================================

    /// Link `provider_id → consumer_id` for `data_type`.
    ///
    /// Returns `None` when either side lacks a matching definition. An
    /// existing edge for the same triple is returned unchanged. An edge that
    /// closes a loop is still created, tagged [`DependencyStatus::CycleDetected`].
    pub fn create_dependency(
        &mut self,
        provider_id: &str,
        consumer_id: &str,
        data_type: &str,
    ) -> Option<Dependency> {
        let provider_definition = self
            .definitions
            .find(provider_id, data_type, DefinitionRole::Provider)
            .map(|(id, _)| id.clone());
        let consumer_definition = self
            .definitions
            .find(consumer_id, data_type, DefinitionRole::Consumer)
            .map(|(id, _)| id.clone());

        let (Some(provider_definition), Some(consumer_definition)) =
            (provider_definition, consumer_definition)
        else {
            self.log(
                LogEntry::new(
                    LogLevel::Warn,
                    format!(
                        "Cannot link {} -> {}: missing provider or consumer definition",
                        provider_id, consumer_id
                    ),
                )
                .component(provider_id)
                .data_type(data_type),
            );
            return None;
        };

        let key = triple(provider_id, consumer_id, data_type);
        if let Some(existing) = self.triples.get(&key).cloned() {
            self.log(
                LogEntry::new(
                    LogLevel::Debug,
                    format!("Link {} -> {} already exists", provider_id, consumer_id),
                )
                .component(provider_id)
                .dependency(&existing)
                .data_type(data_type),
            );
            return self.dependencies.get(&existing).cloned();
        }

        let is_cycle = self.would_create_cycle(provider_id, consumer_id);

        let mut dependency = Dependency::new(
            provider_id,
            consumer_id,
            data_type,
            provider_definition,
            consumer_definition,
        );
        dependency.status = if is_cycle {
            DependencyStatus::CycleDetected
        } else {
            DependencyStatus::Connected
        };
        let id = dependency.id.clone();
        let status = dependency.status;
        self.insert_dependency(dependency);

        if is_cycle {
            self.log(
                LogEntry::new(
                    LogLevel::Warn,
                    format!(
                        "Cycle detected linking {} -> {}",
                        provider_id, consumer_id
                    ),
                )
                .component(provider_id)
                .dependency(&id)
                .data_type(data_type),
            );
            self.events.emit(&Event::Graph(GraphEvent::CycleDetected {
                dependency_id: id.clone(),
                provider_id: provider_id.to_string(),
                consumer_id: consumer_id.to_string(),
            }));
        } else {
            self.log(
                LogEntry::new(
                    LogLevel::Info,
                    format!("Linked {} -> {}", provider_id, consumer_id),
                )
                .component(provider_id)
                .dependency(&id)
                .data_type(data_type),
            );
            self.usage
                .entry((provider_id.to_string(), consumer_id.to_string()))
                .or_insert_with(UsagePattern::new)
                .record(data_type);
            self.regenerate_suggestions();
        }

        self.fold_into_chains(&id);

        self.events.emit(&Event::Graph(GraphEvent::DependencyCreated {
            dependency_id: id.clone(),
            provider_id: provider_id.to_string(),
            consumer_id: consumer_id.to_string(),
            data_type: data_type.to_string(),
            status,
        }));

        self.dependencies.get(&id).cloned()
    }

    /// Remove an edge, splitting or shrinking its chain.
    pub fn remove_dependency(&mut self, id: &DependencyId) -> Option<Dependency> {
        let Some(dependency) = self.dependencies.remove(id) else {
            self.log(LogEntry::new(
                LogLevel::Debug,
                format!("Dependency {} not found for removal", id),
            ));
            return None;
        };

        self.triples.remove(&triple(
            &dependency.provider_id,
            &dependency.consumer_id,
            &dependency.data_type,
        ));
        remove_from_index(&mut self.by_provider, &dependency.provider_id, id);
        remove_from_index(&mut self.by_consumer, &dependency.consumer_id, id);
        remove_from_index(&mut self.by_type, &dependency.data_type, id);
        if let Some(edge) = self.edges.remove(id) {
            self.topology.remove_edge(edge);
        }
        self.prune_node(&dependency.provider_id);
        self.prune_node(&dependency.consumer_id);

        if let Some(chain_id) = dependency.chain_id.clone() {
            self.detach_from_chain(&chain_id, id);
        }

        self.log(
            LogEntry::new(
                LogLevel::Info,
                format!(
                    "Removed link {} -> {}",
                    dependency.provider_id, dependency.consumer_id
                ),
            )
            .component(dependency.provider_id.clone())
            .dependency(id)
            .data_type(dependency.data_type.clone()),
        );
        self.events.emit(&Event::Graph(GraphEvent::DependencyRemoved {
            dependency_id: id.clone(),
            provider_id: dependency.provider_id.clone(),
            consumer_id: dependency.consumer_id.clone(),
        }));

        self.reevaluate_cycles();
        self.regenerate_suggestions();
        Some(dependency)
    }

    pub fn update_dependency_status(
        &mut self,
        id: &DependencyId,
        status: DependencyStatus,
    ) -> Result<()> {
        let Some(dependency) = self.dependencies.get_mut(id) else {
            return Err(DependencyError::DependencyNotFound(id.to_string()));
        };
        let previous = dependency.status;
        dependency.status = status;
        dependency.last_updated = Utc::now();
        let chain_id = dependency.chain_id.clone();
        let component_id = dependency.provider_id.clone();

        let level = if status == DependencyStatus::Error {
            LogLevel::Error
        } else {
            LogLevel::Debug
        };
        self.log(
            LogEntry::new(level, format!("Status {} -> {}", previous, status))
                .component(component_id)
                .dependency(id),
        );
        self.events
            .emit(&Event::Graph(GraphEvent::DependencyStatusChanged {
                dependency_id: id.clone(),
                status,
            }));

        if let Some(chain_id) = chain_id {
            self.refresh_chain(&chain_id);
        }
        Ok(())
    }

    /// Whether an update on `id` arrives sooner than the provider definition's
    /// `debounce_ms` after the previous accepted update. Advisory: callers skip
    /// re-emitting rather than being delayed.
    pub fn should_debounce(&self, id: &DependencyId) -> bool {
        let Some(dependency) = self.dependencies.get(id) else {
            return false;
        };
        let Some(debounce_ms) = self
            .definitions
            .get(&dependency.provider_definition_id)
            .and_then(|def| def.debounce_ms)
        else {
            return false;
        };
        let Some(last) = dependency.last_data_update else {
            return false;
        };
        let elapsed = Utc::now() - last;
        elapsed.num_milliseconds() < debounce_ms as i64
    }

    /// Record an accepted data update on an edge and how long it took.
    pub fn record_update(&mut self, id: &DependencyId, duration: Duration) -> Result<()> {
        let Some(dependency) = self.dependencies.get_mut(id) else {
            return Err(DependencyError::DependencyNotFound(id.to_string()));
        };
        let now = Utc::now();
        dependency.performance.record(duration);
        dependency.last_updated = now;
        dependency.last_data_update = Some(now);
        let chain_id = dependency.chain_id.clone();
        let component_id = dependency.provider_id.clone();
        let data_type = dependency.data_type.clone();

        self.log(
            LogEntry::new(LogLevel::Debug, "Data update propagated")
                .component(component_id)
                .dependency(id)
                .data_type(data_type)
                .duration_ms(duration.as_secs_f64() * 1000.0),
        );

        if let Some(chain_id) = chain_id {
            self.refresh_chain(&chain_id);
        }
        Ok(())
    }

    // =========================================================================
    // Cycle detection
    // =========================================================================

    /// Whether adding `provider → consumer` would close a loop: a self-loop,
    /// or a path of existing edges (any data type) from `consumer` back to
    /// `provider`. Iterative DFS over an immutable borrow of the topology.
    pub fn would_create_cycle(&self, provider_id: &str, consumer_id: &str) -> bool {
        if provider_id == consumer_id {
            return true;
        }
        let (Some(&start), Some(&target)) =
            (self.nodes.get(consumer_id), self.nodes.get(provider_id))
        else {
            return false;
        };

        let mut dfs = Dfs::new(&self.topology, start);
        while let Some(node) = dfs.next(&self.topology) {
            if node == target {
                return true;
            }
        }
        false
    }

    /// Clear `CycleDetected` from edges that no longer close a loop.
    fn reevaluate_cycles(&mut self) {
        let tagged: Vec<(DependencyId, String, String)> = self
            .dependencies
            .values()
            .filter(|dep| dep.status == DependencyStatus::CycleDetected)
            .map(|dep| {
                (
                    dep.id.clone(),
                    dep.provider_id.clone(),
                    dep.consumer_id.clone(),
                )
            })
            .collect();

        for (id, provider_id, consumer_id) in tagged {
            if self.would_create_cycle(&provider_id, &consumer_id) {
                continue;
            }
            self.log(
                LogEntry::new(
                    LogLevel::Info,
                    format!("Cycle resolved for {} -> {}", provider_id, consumer_id),
                )
                .component(provider_id)
                .dependency(&id),
            );
            // Still present: `tagged` was collected from the arena.
            let _ = self.update_dependency_status(&id, DependencyStatus::Connected);
        }
    }

    // =========================================================================
    // Suggestions
    // =========================================================================

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn usage(&self, provider_id: &str, consumer_id: &str) -> Option<&UsagePattern> {
        self.usage
            .get(&(provider_id.to_string(), consumer_id.to_string()))
    }

    /// Rebuild suggestions from scratch: for every pair linked at least
    /// `min_frequency` times, propose each unlinked provider/consumer
    /// definition pair of a shared data type.
    fn regenerate_suggestions(&mut self) {
        let settings = &self.config.suggestions;
        let mut suggestions: Vec<Suggestion> = Vec::new();

        for ((provider_id, consumer_id), pattern) in &self.usage {
            if pattern.frequency < settings.min_frequency {
                continue;
            }
            let confidence = settings.confidence(pattern.frequency);

            for provided in self.definitions.by_component(provider_id) {
                if !provided.role.provides() {
                    continue;
                }
                let data_type = &provided.data_type;
                let consumable = self
                    .definitions
                    .by_component(consumer_id)
                    .into_iter()
                    .any(|def| def.role.consumes() && &def.data_type == data_type);
                if !consumable {
                    continue;
                }
                let key = triple(provider_id, consumer_id, data_type);
                let already_suggested = suggestions.iter().any(|s| {
                    s.suggested_provider_id == *provider_id
                        && s.suggested_consumer_id == *consumer_id
                        && s.data_type == *data_type
                });
                if self.triples.contains_key(&key) || already_suggested {
                    continue;
                }

                suggestions.push(Suggestion {
                    id: SuggestionId::new(),
                    suggested_provider_id: provider_id.clone(),
                    suggested_consumer_id: consumer_id.clone(),
                    data_type: data_type.clone(),
                    confidence,
                    reason: format!(
                        "{} and {} have been linked {} times",
                        provider_id, consumer_id, pattern.frequency
                    ),
                    usage_pattern: pattern.clone(),
                });
            }
        }

        let changed = !(suggestions.is_empty() && self.suggestions.is_empty());
        self.suggestions = suggestions;
        if changed {
            self.events
                .emit(&Event::Graph(GraphEvent::SuggestionsUpdated {
                    count: self.suggestions.len(),
                }));
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn dependency(&self, id: &DependencyId) -> Option<&Dependency> {
        self.dependencies.get(id)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.values()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    pub fn find_dependency(
        &self,
        provider_id: &str,
        consumer_id: &str,
        data_type: &str,
    ) -> Option<&Dependency> {
        self.triples
            .get(&triple(provider_id, consumer_id, data_type))
            .and_then(|id| self.dependencies.get(id))
    }

    pub fn dependencies_by_provider(&self, provider_id: &str) -> Vec<&Dependency> {
        self.resolve(self.by_provider.get(provider_id))
    }

    pub fn dependencies_by_consumer(&self, consumer_id: &str) -> Vec<&Dependency> {
        self.resolve(self.by_consumer.get(consumer_id))
    }

    pub fn dependencies_by_type(&self, data_type: &str) -> Vec<&Dependency> {
        self.resolve(self.by_type.get(data_type))
    }

    pub fn chain(&self, id: &ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    /// Chains with at least one member edge touching `component_id`.
    pub fn chains_by_component(&self, component_id: &str) -> Vec<&Chain> {
        self.chains
            .values()
            .filter(|chain| {
                chain.dependencies.iter().any(|id| {
                    self.dependencies
                        .get(id)
                        .is_some_and(|dep| dep.touches(component_id))
                })
            })
            .collect()
    }

    pub fn chains_by_type(&self, data_type: &str) -> Vec<&Chain> {
        self.chains
            .values()
            .filter(|chain| chain.data_type == data_type)
            .collect()
    }

    /// All retained audit entries, oldest first.
    pub fn logs(&self) -> Vec<&LogEntry> {
        self.logs.entries().collect()
    }

    pub fn filtered_logs(&self, filter: &LogFilter) -> Vec<&LogEntry> {
        self.logs.filtered(filter)
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    /// Graphviz rendering of the component topology. Edges closing a loop or
    /// in error are drawn red, inactive ones gray.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph dependencies {\n");
        let mut components: Vec<&String> = self.topology.node_weights().collect();
        components.sort();
        for component in components {
            let _ = writeln!(dot, "    \"{}\";", component);
        }

        let mut edges: Vec<&Dependency> = self.dependencies.values().collect();
        edges.sort_by(|a, b| {
            (&a.provider_id, &a.consumer_id, &a.data_type)
                .cmp(&(&b.provider_id, &b.consumer_id, &b.data_type))
        });
        for dep in edges {
            let color = match dep.status {
                DependencyStatus::CycleDetected | DependencyStatus::Error => "red",
                DependencyStatus::Suspended | DependencyStatus::Disconnected => "gray",
                _ => "black",
            };
            let _ = writeln!(
                dot,
                "    \"{}\" -> \"{}\" [label=\"{}\", color={}];",
                dep.provider_id, dep.consumer_id, dep.data_type, color
            );
        }
        dot.push_str("}\n");
        dot
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(super) fn log(&mut self, entry: LogEntry) {
        let stored = self.logs.append(entry);
        self.events.emit(&Event::Log(stored));
    }

    fn insert_dependency(&mut self, dependency: Dependency) {
        let id = dependency.id.clone();
        let from = self.ensure_node(&dependency.provider_id);
        let to = self.ensure_node(&dependency.consumer_id);
        let edge = self.topology.add_edge(from, to, id.clone());
        self.edges.insert(id.clone(), edge);

        self.triples.insert(
            triple(
                &dependency.provider_id,
                &dependency.consumer_id,
                &dependency.data_type,
            ),
            id.clone(),
        );
        self.by_provider
            .entry(dependency.provider_id.clone())
            .or_default()
            .insert(id.clone());
        self.by_consumer
            .entry(dependency.consumer_id.clone())
            .or_default()
            .insert(id.clone());
        self.by_type
            .entry(dependency.data_type.clone())
            .or_default()
            .insert(id.clone());
        self.dependencies.insert(id, dependency);
    }

    fn ensure_node(&mut self, component_id: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(component_id) {
            return idx;
        }
        let idx = self.topology.add_node(component_id.to_string());
        self.nodes.insert(component_id.to_string(), idx);
        idx
    }

    /// Drop a component node once no edge references it.
    fn prune_node(&mut self, component_id: &str) {
        let Some(&idx) = self.nodes.get(component_id) else {
            return;
        };
        let connected = self
            .topology
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
            .is_some()
            || self
                .topology
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_some();
        if !connected {
            self.topology.remove_node(idx);
            self.nodes.remove(component_id);
        }
    }

    fn resolve(&self, ids: Option<&BTreeSet<DependencyId>>) -> Vec<&Dependency> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.dependencies.get(id))
                .collect()
        })
        .unwrap_or_default()
    }
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LinkGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkGraph")
            .field("definitions", &self.definitions.len())
            .field("dependencies", &self.dependencies.len())
            .field("chains", &self.chains.len())
            .field("suggestions", &self.suggestions.len())
            .field("logs", &self.logs.len())
            .finish()
    }
}

fn triple(provider_id: &str, consumer_id: &str, data_type: &str) -> Triple {
    (
        provider_id.to_string(),
        consumer_id.to_string(),
        data_type.to_string(),
    )
}

fn remove_from_index(
    index: &mut HashMap<String, BTreeSet<DependencyId>>,
    key: &str,
    id: &DependencyId,
) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}
