// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Per-session context owning the link graph, the runtime manager and the
//! event bus they share.
//!
//! A link is one edge seen two ways: a graph [`Dependency`](crate::Dependency)
//! carrying topology (chains, cycles, performance) and a runtime
//! [`Instance`] carrying configuration and data. The workspace creates,
//! updates and removes both together and mirrors instance status onto the
//! edge. Either store can still be used on its own.

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::WorkspaceConfig;
use crate::core::definitions::Definition;
use crate::core::error::{DependencyError, Result};
use crate::core::graph::{DependencyStatus, LinkGraph};
use crate::core::ids::{DefinitionId, DependencyId, InstanceId};
use crate::core::pubsub::EventBus;
use crate::core::runtime::{
    ComponentCommunication, ComponentLifecycle, DataOutcome, Instance, InstanceConfig,
    LinkDefinition, RuntimeManager,
};

/// Both ids of a link created through [`Workspace::link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHandle {
    pub dependency_id: DependencyId,
    pub instance_id: InstanceId,
}

pub struct Workspace {
    config: WorkspaceConfig,
    events: Arc<EventBus>,
    graph: LinkGraph,
    runtime: RuntimeManager,
}

impl Workspace {
    pub fn new(config: WorkspaceConfig, communication: Arc<dyn ComponentCommunication>) -> Self {
        let events = Arc::new(EventBus::new());
        let graph = LinkGraph::with_config(config.graph(), events.clone());
        let runtime =
            RuntimeManager::with_config(config.runtime.clone(), communication, events.clone());
        Self {
            config,
            events,
            graph,
            runtime,
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut LinkGraph {
        &mut self.graph
    }

    pub fn runtime(&self) -> &RuntimeManager {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut RuntimeManager {
        &mut self.runtime
    }

    pub fn register_definition(&mut self, definition: Definition) -> DefinitionId {
        self.graph.register_definition(definition)
    }

    pub fn register_link_definition(&mut self, definition: LinkDefinition) -> DefinitionId {
        self.runtime.register_definition(definition)
    }

    /// Link two components: graph edge first, then the runtime instance.
    ///
    /// A newly created edge is rolled back when the instance cannot be
    /// created. An edge that closes a cycle yields an instance in
    /// `CycleDetected`, which carries no data.
    pub fn link(
        &mut self,
        provider_id: &str,
        consumer_id: &str,
        data_type: &str,
        link_definition_id: &DefinitionId,
        config: Option<InstanceConfig>,
    ) -> Result<LinkHandle> {
        let link_type = self
            .runtime
            .definition(link_definition_id)
            .map(|def| def.data_type.clone())
            .ok_or_else(|| DependencyError::DefinitionNotFound(link_definition_id.to_string()))?;
        if link_type != data_type {
            return Err(DependencyError::Validation(format!(
                "Link definition {} carries {}, not {}",
                link_definition_id, link_type, data_type
            )));
        }

        let existed = self
            .graph
            .find_dependency(provider_id, consumer_id, data_type)
            .is_some();
        let dependency = self
            .graph
            .create_dependency(provider_id, consumer_id, data_type)
            .ok_or_else(|| {
                DependencyError::DefinitionNotFound(format!(
                    "{} -> {} ({})",
                    provider_id, consumer_id, data_type
                ))
            })?;

        let instance_id = match self.runtime.create_dependency(
            link_definition_id,
            provider_id,
            consumer_id,
            config,
        ) {
            Ok(id) => id,
            Err(err) => {
                if !existed {
                    self.graph.remove_dependency(&dependency.id);
                    self.release_cleared_cycles();
                }
                return Err(err);
            }
        };
        self.runtime
            .attach_dependency(&instance_id, dependency.id.clone())?;

        if dependency.status == DependencyStatus::CycleDetected {
            self.runtime.set_dependency_status(
                &instance_id,
                DependencyStatus::CycleDetected,
                None,
            )?;
        }

        tracing::info!(
            "[Workspace] Linked {} -> {} ({}) as {}",
            provider_id,
            consumer_id,
            data_type,
            instance_id
        );
        Ok(LinkHandle {
            dependency_id: dependency.id,
            instance_id,
        })
    }

    /// Remove both views of a link.
    pub fn unlink(&mut self, instance_id: &InstanceId) -> Option<Instance> {
        let instance = self.runtime.remove_dependency(instance_id)?;
        if let Some(dependency_id) = &instance.dependency_id {
            self.graph.remove_dependency(dependency_id);
            self.release_cleared_cycles();
        }
        Some(instance)
    }

    /// Push provider data into every active push link, skipping links still
    /// inside their debounce window. Returns the instances that stored it.
    pub fn publish(&mut self, provider_id: &str, data: Value) -> Vec<InstanceId> {
        let mut stored = Vec::new();
        for instance_id in self.runtime.push_targets(provider_id) {
            let dependency_id = self
                .runtime
                .instance(&instance_id)
                .and_then(|instance| instance.dependency_id.clone());

            if let Some(dependency_id) = &dependency_id {
                if self.graph.should_debounce(dependency_id) {
                    tracing::debug!("[Workspace] Debounced update on {}", instance_id);
                    continue;
                }
            }

            let started = Instant::now();
            match self.runtime.update_dependency_data(&instance_id, data.clone()) {
                Ok(DataOutcome::Stored) => {
                    if let Some(dependency_id) = &dependency_id {
                        let _ = self.graph.record_update(dependency_id, started.elapsed());
                    }
                    self.mirror_status(&instance_id);
                    stored.push(instance_id);
                }
                Ok(DataOutcome::Filtered) => {}
                Err(err) => {
                    tracing::warn!("[Workspace] Update on {} failed: {}", instance_id, err);
                }
            }
        }
        stored
    }

    /// Pull through [`RuntimeManager::request_data`] and reflect the outcome
    /// on the graph edge.
    pub async fn request(
        &mut self,
        instance_id: &InstanceId,
        params: Option<Value>,
    ) -> Result<DataOutcome> {
        let started = Instant::now();
        let result = self.runtime.request_data(instance_id, params).await;
        self.after_pull(instance_id, &result, started);
        result
    }

    /// Drain queued pulls, reflecting each outcome on its graph edge.
    pub async fn sync_pending(&mut self) -> Vec<(InstanceId, Result<DataOutcome>)> {
        let started = Instant::now();
        let results = self.runtime.sync_pending().await;
        for (instance_id, result) in &results {
            self.after_pull(instance_id, result, started);
        }
        results
    }

    pub fn set_status(
        &mut self,
        instance_id: &InstanceId,
        status: DependencyStatus,
        error: Option<String>,
    ) -> Result<()> {
        self.runtime
            .set_dependency_status(instance_id, status, error)?;
        self.mirror_status(instance_id);
        Ok(())
    }

    pub fn suspend(&mut self, instance_id: &InstanceId) -> Result<()> {
        self.runtime.suspend(instance_id)?;
        self.mirror_status(instance_id);
        Ok(())
    }

    pub fn resume(&mut self, instance_id: &InstanceId) -> Result<()> {
        self.runtime.resume(instance_id)?;
        self.mirror_status(instance_id);
        Ok(())
    }

    /// Route a component lifecycle signal to both stores.
    pub fn handle_lifecycle(&mut self, event: &ComponentLifecycle) -> usize {
        match event {
            ComponentLifecycle::Unregistered { component_id } => {
                let removed = self.runtime.handle_lifecycle(event);
                self.graph.remove_component(component_id);
                self.release_cleared_cycles();
                removed
            }
            ComponentLifecycle::VisibilityChanged { component_id, .. } => {
                let changed = self.runtime.handle_lifecycle(event);
                for instance_id in self.runtime.instance_ids_touching(component_id) {
                    self.mirror_status(&instance_id);
                }
                changed
            }
            ComponentLifecycle::Registered { .. } | ComponentLifecycle::Updated { .. } => {
                self.runtime.handle_lifecycle(event)
            }
        }
    }

    fn after_pull(
        &mut self,
        instance_id: &InstanceId,
        result: &Result<DataOutcome>,
        started: Instant,
    ) {
        if let Ok(DataOutcome::Stored) = result {
            let dependency_id = self
                .runtime
                .instance(instance_id)
                .and_then(|instance| instance.dependency_id.clone());
            if let Some(dependency_id) = dependency_id {
                let _ = self.graph.record_update(&dependency_id, started.elapsed());
            }
        }
        self.mirror_status(instance_id);
    }

    /// Reconnect instances held in `CycleDetected` whose edge the graph no
    /// longer tags as closing a loop.
    fn release_cleared_cycles(&mut self) {
        let cleared: Vec<InstanceId> = self
            .runtime
            .instances()
            .filter(|instance| instance.status == DependencyStatus::CycleDetected)
            .filter(|instance| {
                instance
                    .dependency_id
                    .as_ref()
                    .and_then(|id| self.graph.dependency(id))
                    .is_some_and(|dep| dep.status != DependencyStatus::CycleDetected)
            })
            .map(|instance| instance.id.clone())
            .collect();

        for instance_id in cleared {
            tracing::info!("[Workspace] Cycle cleared, reconnecting {}", instance_id);
            if let Err(err) =
                self.runtime
                    .set_dependency_status(&instance_id, DependencyStatus::Connected, None)
            {
                tracing::warn!("[Workspace] Failed to reconnect {}: {}", instance_id, err);
            }
        }
    }

    /// Copy an instance's status onto its graph edge. The `CycleDetected` tag
    /// is owned by the graph and never copied in either direction.
    fn mirror_status(&mut self, instance_id: &InstanceId) {
        let Some((dependency_id, status)) = self.runtime.instance(instance_id).and_then(|instance| {
            instance
                .dependency_id
                .clone()
                .map(|dependency_id| (dependency_id, instance.status))
        }) else {
            return;
        };
        let Some(current) = self.graph.dependency(&dependency_id).map(|dep| dep.status) else {
            return;
        };
        if current == status
            || current == DependencyStatus::CycleDetected
            || status == DependencyStatus::CycleDetected
        {
            return;
        }
        let _ = self.graph.update_dependency_status(&dependency_id, status);
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("graph", &self.graph)
            .field("runtime", &self.runtime)
            .finish()
    }
}
