// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use chrono::Utc;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use super::{
    ComponentCommunication, ComponentLifecycle, DataOutcome, Instance, InstanceConfig,
    LinkDefinition,
};
use crate::core::config::RuntimeConfig;
use crate::core::error::{DependencyError, Result};
use crate::core::graph::DependencyStatus;
use crate::core::ids::{DefinitionId, DependencyId, InstanceId};
use crate::core::pubsub::{Event, EventBus, RuntimeEvent};

/// Notification kind used to deliver data to a consumer.
pub const DATA_NOTIFICATION: &str = "dependency:data";

/// Request method used to pull data from a provider.
pub const DATA_REQUEST: &str = "dependency:request";

type InstanceKey = (String, String, DefinitionId);

/// Turns links into live [`Instance`]s and moves data across them.
///
/// Every operation except [`request_data`](Self::request_data) and
/// [`sync_pending`](Self::sync_pending) runs to completion without yielding.
/// Initial and re-sync pulls requested by synchronous operations are queued
/// and drained by `sync_pending`.
pub struct RuntimeManager {
    definitions: HashMap<DefinitionId, LinkDefinition>,
    instances: HashMap<InstanceId, Instance>,
    by_triple: HashMap<InstanceKey, InstanceId>,
    by_provider: HashMap<String, BTreeSet<InstanceId>>,
    by_consumer: HashMap<String, BTreeSet<InstanceId>>,
    pending_sync: VecDeque<InstanceId>,
    communication: Arc<dyn ComponentCommunication>,
    events: Arc<EventBus>,
    config: RuntimeConfig,
}

impl RuntimeManager {
    pub fn new(communication: Arc<dyn ComponentCommunication>) -> Self {
        Self::with_config(
            RuntimeConfig::default(),
            communication,
            Arc::new(EventBus::new()),
        )
    }

    pub fn with_config(
        config: RuntimeConfig,
        communication: Arc<dyn ComponentCommunication>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            definitions: HashMap::new(),
            instances: HashMap::new(),
            by_triple: HashMap::new(),
            by_provider: HashMap::new(),
            by_consumer: HashMap::new(),
            pending_sync: VecDeque::new(),
            communication,
            events,
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn communication(&self) -> &Arc<dyn ComponentCommunication> {
        &self.communication
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    // =========================================================================
    // Link definitions
    // =========================================================================

    pub fn register_definition(&mut self, mut definition: LinkDefinition) -> DefinitionId {
        let id = definition.id.get_or_insert_with(DefinitionId::new).clone();
        tracing::debug!(
            "[RuntimeManager] Registered link definition '{}' ({}, {})",
            definition.name,
            id,
            definition.sync
        );
        self.definitions.insert(id.clone(), definition);
        id
    }

    pub fn definition(&self, id: &DefinitionId) -> Option<&LinkDefinition> {
        self.definitions.get(id)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &LinkDefinition> {
        self.definitions.values()
    }

    /// Remove a link definition and every instance created from it.
    pub fn remove_definition(&mut self, id: &DefinitionId) -> Option<LinkDefinition> {
        let definition = self.definitions.remove(id)?;
        let dependents: Vec<InstanceId> = self
            .instances
            .values()
            .filter(|instance| &instance.definition_id == id)
            .map(|instance| instance.id.clone())
            .collect();
        for instance_id in &dependents {
            self.remove_dependency(instance_id);
        }
        tracing::info!(
            "[RuntimeManager] Removed link definition {} ({} instance(s))",
            id,
            dependents.len()
        );
        Some(definition)
    }

    // =========================================================================
    // Instances
    // =========================================================================

    /// Instantiate `definition_id` between two components.
    ///
    /// Component types are checked against the definition, option defaults
    /// are merged with `config` and validated. An instance that already exists
    /// for the same provider, consumer and definition has its configuration
    /// updated in place.
    pub fn create_dependency(
        &mut self,
        definition_id: &DefinitionId,
        provider_id: &str,
        consumer_id: &str,
        config: Option<InstanceConfig>,
    ) -> Result<InstanceId> {
        let definition = self
            .definitions
            .get(definition_id)
            .cloned()
            .ok_or_else(|| DependencyError::DefinitionNotFound(definition_id.to_string()))?;

        self.check_component_type(provider_id, &definition.provider_type)?;
        self.check_component_type(consumer_id, &definition.consumer_type)?;

        let key: InstanceKey = (
            provider_id.to_string(),
            consumer_id.to_string(),
            definition_id.clone(),
        );
        let existing = self.by_triple.get(&key).cloned();

        let base = existing
            .as_ref()
            .and_then(|id| self.instances.get(id))
            .map(|instance| instance.config.clone())
            .unwrap_or_else(|| InstanceConfig {
                options: definition.default_options(),
                ..Default::default()
            });
        let merged = match &config {
            Some(overrides) => base.merged_with(overrides),
            None => base,
        };
        if let Err(err) = definition.validate_options(&merged.options) {
            tracing::warn!(
                "[RuntimeManager] Rejected configuration for {} -> {}: {}",
                provider_id,
                consumer_id,
                err
            );
            return Err(err);
        }

        if let Some(existing) = existing {
            if let Some(instance) = self.instances.get_mut(&existing) {
                instance.config = merged;
                instance.last_updated = Utc::now();
            }
            tracing::debug!(
                "[RuntimeManager] Instance {} already exists, configuration updated",
                existing
            );
            self.emit(RuntimeEvent::InstanceConfigUpdated {
                instance_id: existing.clone(),
            });
            return Ok(existing);
        }

        let instance = Instance {
            id: InstanceId::new(),
            definition_id: definition_id.clone(),
            dependency_id: None,
            provider_id: provider_id.to_string(),
            consumer_id: consumer_id.to_string(),
            provider_type: definition.provider_type.clone(),
            consumer_type: definition.consumer_type.clone(),
            status: DependencyStatus::Connected,
            config: merged,
            is_active: true,
            is_ready: false,
            current_data: None,
            error: None,
            last_updated: Utc::now(),
        };
        let id = instance.id.clone();

        self.by_triple.insert(key, id.clone());
        self.by_provider
            .entry(provider_id.to_string())
            .or_default()
            .insert(id.clone());
        self.by_consumer
            .entry(consumer_id.to_string())
            .or_default()
            .insert(id.clone());
        self.instances.insert(id.clone(), instance);

        tracing::info!(
            "[RuntimeManager] Created instance {} ({} -> {}, {})",
            id,
            provider_id,
            consumer_id,
            definition.sync
        );
        self.emit(RuntimeEvent::InstanceCreated {
            instance_id: id.clone(),
            provider_id: provider_id.to_string(),
            consumer_id: consumer_id.to_string(),
        });

        if definition.sync.pushes() {
            self.communication.register_push_handler(provider_id, &id);
        }
        if definition.sync.pulls() {
            self.queue_sync(&id);
        }
        Ok(id)
    }

    /// Merge `partial` into an instance's configuration. Nothing changes when
    /// the merged result fails validation.
    pub fn update_dependency_config(
        &mut self,
        id: &InstanceId,
        partial: InstanceConfig,
    ) -> Result<()> {
        let instance = self
            .instances
            .get(id)
            .ok_or_else(|| DependencyError::DependencyNotFound(id.to_string()))?;
        let definition = self
            .definitions
            .get(&instance.definition_id)
            .ok_or_else(|| {
                DependencyError::DefinitionNotFound(instance.definition_id.to_string())
            })?;

        let merged = instance.config.merged_with(&partial);
        if let Err(err) = definition.validate_options(&merged.options) {
            tracing::warn!("[RuntimeManager] Rejected configuration update for {}: {}", id, err);
            return Err(err);
        }

        if let Some(instance) = self.instances.get_mut(id) {
            instance.config = merged;
            instance.last_updated = Utc::now();
        }
        tracing::debug!("[RuntimeManager] Updated configuration of {}", id);
        self.emit(RuntimeEvent::InstanceConfigUpdated {
            instance_id: id.clone(),
        });
        Ok(())
    }

    /// Feed a payload into an instance: validator, then filter, then transform.
    ///
    /// A filtered payload changes nothing and notifies nobody. A stored payload
    /// becomes the instance's current data and is sent to the consumer unless
    /// `auto_update` is `false`.
    pub fn update_dependency_data(&mut self, id: &InstanceId, raw: Value) -> Result<DataOutcome> {
        let instance = self
            .instances
            .get(id)
            .ok_or_else(|| DependencyError::DependencyNotFound(id.to_string()))?;
        let definition = self
            .definitions
            .get(&instance.definition_id)
            .ok_or_else(|| {
                DependencyError::DefinitionNotFound(instance.definition_id.to_string())
            })?;

        let validator = definition.validator.clone();
        let filter = instance.config.filter.clone();
        let transform = instance
            .config
            .transform
            .clone()
            .or_else(|| definition.transform.clone());
        let notify = instance.config.notifies();
        let provider_id = instance.provider_id.clone();
        let consumer_id = instance.consumer_id.clone();

        if let Some(validator) = validator {
            if !validator(&raw) {
                tracing::warn!("[RuntimeManager] Data rejected by validator on {}", id);
                return Err(DependencyError::Validation(format!(
                    "Data rejected by link definition validator on {}",
                    id
                )));
            }
        }
        if let Some(filter) = filter {
            if !filter(&raw) {
                tracing::debug!("[RuntimeManager] Data filtered on {}", id);
                return Ok(DataOutcome::Filtered);
            }
        }
        let data = match transform {
            Some(transform) => transform(raw),
            None => raw,
        };

        let mut became_ready = None;
        if let Some(instance) = self.instances.get_mut(id) {
            instance.current_data = Some(data.clone());
            instance.last_updated = Utc::now();
            instance.is_ready = true;
            instance.error = None;
            if matches!(
                instance.status,
                DependencyStatus::Pending | DependencyStatus::Connected | DependencyStatus::Error
            ) {
                instance.status = DependencyStatus::Ready;
                instance.is_active = true;
                became_ready = Some(instance.status);
            }
        }

        if let Some(status) = became_ready {
            self.emit(RuntimeEvent::StatusChanged {
                instance_id: id.clone(),
                status,
                error: None,
            });
        }
        self.emit(RuntimeEvent::DataUpdated {
            instance_id: id.clone(),
            provider_id: provider_id.clone(),
            consumer_id: consumer_id.clone(),
            data: data.clone(),
        });

        if notify {
            if let Err(err) =
                self.communication
                    .send_notification(&provider_id, &consumer_id, DATA_NOTIFICATION, data)
            {
                tracing::warn!(
                    "[RuntimeManager] Failed to notify {} for {}: {}",
                    consumer_id,
                    id,
                    err
                );
                return Err(err);
            }
        }
        Ok(DataOutcome::Stored)
    }

    /// Ask the provider for data and feed the response through
    /// [`update_dependency_data`](Self::update_dependency_data).
    ///
    /// Only valid for `pull` and `both` links. A failed or timed out request
    /// puts the instance into `Error` and is returned to the caller.
    pub async fn request_data(
        &mut self,
        id: &InstanceId,
        params: Option<Value>,
    ) -> Result<DataOutcome> {
        let instance = self
            .instances
            .get(id)
            .ok_or_else(|| DependencyError::DependencyNotFound(id.to_string()))?;
        let definition = self
            .definitions
            .get(&instance.definition_id)
            .ok_or_else(|| {
                DependencyError::DefinitionNotFound(instance.definition_id.to_string())
            })?;

        if !definition.sync.pulls() {
            return Err(DependencyError::UnsupportedStrategy {
                instance_id: id.to_string(),
                strategy: definition.sync.to_string(),
            });
        }

        let payload = json!({
            "dataType": definition.data_type,
            "params": params.unwrap_or(Value::Null),
        });
        tracing::debug!(
            "[RuntimeManager] Requesting data for {} from {}",
            id,
            instance.provider_id
        );
        let request = self.communication.send_request(
            &instance.consumer_id,
            &instance.provider_id,
            DATA_REQUEST,
            payload,
        );

        let response = match self.config.pull_timeout() {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or_else(|_| Err(DependencyError::Timeout(limit.as_millis() as u64))),
            None => request.await,
        };

        match response {
            Ok(data) => self.update_dependency_data(id, data),
            Err(err) => {
                let err = match err {
                    DependencyError::Timeout(_) | DependencyError::PullFailed(_) => err,
                    other => DependencyError::PullFailed(other.to_string()),
                };
                self.record_failure(id, &err);
                Err(err)
            }
        }
    }

    /// Drain queued initial and re-sync pulls. Instances removed or made
    /// inactive since they were queued are skipped.
    pub async fn sync_pending(&mut self) -> Vec<(InstanceId, Result<DataOutcome>)> {
        let mut results = Vec::new();
        while let Some(id) = self.pending_sync.pop_front() {
            let active = self.instances.get(&id).is_some_and(|i| i.is_active);
            if !active {
                continue;
            }
            let result = self.request_data(&id, None).await;
            results.push((id, result));
        }
        results
    }

    /// Set an instance's status. Entering an active status from an inactive
    /// one queues a re-sync for pull links.
    pub fn set_dependency_status(
        &mut self,
        id: &InstanceId,
        status: DependencyStatus,
        error: Option<String>,
    ) -> Result<()> {
        let instance = self
            .instances
            .get_mut(id)
            .ok_or_else(|| DependencyError::DependencyNotFound(id.to_string()))?;

        let was_active = instance.is_active;
        instance.status = status;
        instance.is_active = status.is_active();
        instance.is_ready = status == DependencyStatus::Ready;
        instance.error = error.clone();
        instance.last_updated = Utc::now();
        let now_active = instance.is_active;
        let pulls = self
            .definitions
            .get(&instance.definition_id)
            .is_some_and(|d| d.sync.pulls());

        match &error {
            Some(message) => tracing::warn!("[RuntimeManager] {} -> {} ({})", id, status, message),
            None => tracing::debug!("[RuntimeManager] {} -> {}", id, status),
        }
        self.emit(RuntimeEvent::StatusChanged {
            instance_id: id.clone(),
            status,
            error,
        });

        if !was_active && now_active && pulls {
            self.queue_sync(id);
        }
        Ok(())
    }

    /// `Connected/Ready → Suspended`.
    pub fn suspend(&mut self, id: &InstanceId) -> Result<()> {
        let status = self.status_of(id)?;
        if !status.can_suspend() {
            return Err(DependencyError::Validation(format!(
                "Cannot suspend {} while {}",
                id, status
            )));
        }
        self.set_dependency_status(id, DependencyStatus::Suspended, None)
    }

    /// `Suspended → Connected`.
    pub fn resume(&mut self, id: &InstanceId) -> Result<()> {
        let status = self.status_of(id)?;
        if status != DependencyStatus::Suspended {
            return Err(DependencyError::Validation(format!(
                "Cannot resume {} while {}",
                id, status
            )));
        }
        self.set_dependency_status(id, DependencyStatus::Connected, None)
    }

    pub fn remove_dependency(&mut self, id: &InstanceId) -> Option<Instance> {
        let Some(instance) = self.instances.remove(id) else {
            tracing::debug!("[RuntimeManager] Instance {} not found for removal", id);
            return None;
        };

        self.by_triple.remove(&(
            instance.provider_id.clone(),
            instance.consumer_id.clone(),
            instance.definition_id.clone(),
        ));
        remove_from_index(&mut self.by_provider, &instance.provider_id, id);
        remove_from_index(&mut self.by_consumer, &instance.consumer_id, id);
        self.pending_sync.retain(|queued| queued != id);
        self.communication
            .unregister_push_handler(&instance.provider_id, id);

        tracing::info!(
            "[RuntimeManager] Removed instance {} ({} -> {})",
            id,
            instance.provider_id,
            instance.consumer_id
        );
        self.emit(RuntimeEvent::InstanceRemoved {
            instance_id: id.clone(),
        });
        Some(instance)
    }

    /// Record which graph edge an instance realizes.
    pub fn attach_dependency(
        &mut self,
        id: &InstanceId,
        dependency_id: DependencyId,
    ) -> Result<()> {
        let instance = self
            .instances
            .get_mut(id)
            .ok_or_else(|| DependencyError::DependencyNotFound(id.to_string()))?;
        instance.dependency_id = Some(dependency_id);
        Ok(())
    }

    // =========================================================================
    // Component-level operations
    // =========================================================================

    /// Active push instances a provider's updates flow into.
    pub fn push_targets(&self, provider_id: &str) -> Vec<InstanceId> {
        self.by_provider
            .get(provider_id)
            .into_iter()
            .flatten()
            .filter(|id| {
                self.instances.get(*id).is_some_and(|instance| {
                    instance.is_active
                        && self
                            .definitions
                            .get(&instance.definition_id)
                            .is_some_and(|d| d.sync.pushes())
                })
            })
            .cloned()
            .collect()
    }

    /// Push provider data into every active push instance. Returns the
    /// instances that stored it.
    pub fn notify_component_dependencies(
        &mut self,
        provider_id: &str,
        data: Value,
    ) -> Vec<InstanceId> {
        let mut stored = Vec::new();
        for id in self.push_targets(provider_id) {
            match self.update_dependency_data(&id, data.clone()) {
                Ok(DataOutcome::Stored) => stored.push(id),
                Ok(DataOutcome::Filtered) => {}
                Err(err) => {
                    tracing::warn!("[RuntimeManager] Push to {} failed: {}", id, err);
                }
            }
        }
        stored
    }

    /// Clear data and errors on every instance touching a component and queue
    /// pull links for re-sync.
    pub fn reset_component_dependencies(&mut self, component_id: &str) -> usize {
        let ids = self.instance_ids_touching(component_id);
        for id in &ids {
            let pulls = self
                .instances
                .get(id)
                .and_then(|i| self.definitions.get(&i.definition_id))
                .is_some_and(|d| d.sync.pulls());

            let Some(instance) = self.instances.get_mut(id) else {
                continue;
            };
            instance.current_data = None;
            instance.error = None;
            instance.is_ready = false;
            if matches!(
                instance.status,
                DependencyStatus::Ready | DependencyStatus::Error
            ) {
                instance.status = DependencyStatus::Connected;
                instance.is_active = true;
            }
            instance.last_updated = Utc::now();
            let status = instance.status;
            let active = instance.is_active;

            self.emit(RuntimeEvent::StatusChanged {
                instance_id: id.clone(),
                status,
                error: None,
            });
            if pulls && active {
                self.queue_sync(id);
            }
        }
        tracing::info!(
            "[RuntimeManager] Reset {} instance(s) of {}",
            ids.len(),
            component_id
        );
        ids.len()
    }

    /// Apply a component lifecycle signal. Returns the number of instances
    /// affected.
    pub fn handle_lifecycle(&mut self, event: &ComponentLifecycle) -> usize {
        match event {
            ComponentLifecycle::Unregistered { component_id } => {
                let ids = self.instance_ids_touching(component_id);
                for id in &ids {
                    self.remove_dependency(id);
                }
                tracing::info!(
                    "[RuntimeManager] {} unregistered, removed {} instance(s)",
                    component_id,
                    ids.len()
                );
                ids.len()
            }
            ComponentLifecycle::VisibilityChanged {
                component_id,
                visible,
            } => {
                let mut changed = 0;
                for id in self.instance_ids_touching(component_id) {
                    let Some(status) = self.instances.get(&id).map(|i| i.status) else {
                        continue;
                    };
                    let result = if *visible && status == DependencyStatus::Suspended {
                        self.resume(&id)
                    } else if !*visible && status.can_suspend() {
                        self.suspend(&id)
                    } else {
                        continue;
                    };
                    if result.is_ok() {
                        changed += 1;
                    }
                }
                tracing::debug!(
                    "[RuntimeManager] {} visibility -> {}, {} instance(s) changed",
                    component_id,
                    visible,
                    changed
                );
                changed
            }
            ComponentLifecycle::Registered { component_id }
            | ComponentLifecycle::Updated { component_id } => {
                tracing::debug!("[RuntimeManager] Lifecycle signal for {}", component_id);
                0
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn instance(&self, id: &InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn find_instance(
        &self,
        provider_id: &str,
        consumer_id: &str,
        definition_id: &DefinitionId,
    ) -> Option<&Instance> {
        self.by_triple
            .get(&(
                provider_id.to_string(),
                consumer_id.to_string(),
                definition_id.clone(),
            ))
            .and_then(|id| self.instances.get(id))
    }

    pub fn instances_by_provider(&self, provider_id: &str) -> Vec<&Instance> {
        self.resolve(self.by_provider.get(provider_id))
    }

    pub fn instances_by_consumer(&self, consumer_id: &str) -> Vec<&Instance> {
        self.resolve(self.by_consumer.get(consumer_id))
    }

    /// Instances waiting for an initial or re-sync pull.
    pub fn pending_sync(&self) -> impl Iterator<Item = &InstanceId> {
        self.pending_sync.iter()
    }

    pub fn instance_ids_touching(&self, component_id: &str) -> Vec<InstanceId> {
        let mut ids = BTreeSet::new();
        ids.extend(self.by_provider.get(component_id).into_iter().flatten().cloned());
        ids.extend(self.by_consumer.get(component_id).into_iter().flatten().cloned());
        ids.into_iter().collect()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_component_type(&self, component_id: &str, expected: &str) -> Result<()> {
        let info = self
            .communication
            .get_component(component_id)
            .ok_or_else(|| DependencyError::ComponentNotFound(component_id.to_string()))?;
        if info.component_type != expected {
            tracing::warn!(
                "[RuntimeManager] {} is a {}, link expects {}",
                component_id,
                info.component_type,
                expected
            );
            return Err(DependencyError::TypeMismatch {
                component_id: component_id.to_string(),
                expected: expected.to_string(),
                actual: info.component_type,
            });
        }
        Ok(())
    }

    fn status_of(&self, id: &InstanceId) -> Result<DependencyStatus> {
        self.instances
            .get(id)
            .map(|i| i.status)
            .ok_or_else(|| DependencyError::DependencyNotFound(id.to_string()))
    }

    fn queue_sync(&mut self, id: &InstanceId) {
        if !self.pending_sync.contains(id) {
            tracing::debug!("[RuntimeManager] Queued sync for {}", id);
            self.pending_sync.push_back(id.clone());
        }
    }

    fn record_failure(&mut self, id: &InstanceId, err: &DependencyError) {
        let message = err.to_string();
        if let Some(instance) = self.instances.get_mut(id) {
            instance.status = DependencyStatus::Error;
            instance.error = Some(message.clone());
            instance.is_active = false;
            instance.is_ready = false;
            instance.last_updated = Utc::now();
        }
        tracing::error!("[RuntimeManager] Request for {} failed: {}", id, message);
        self.emit(RuntimeEvent::RequestFailed {
            instance_id: id.clone(),
            error: message.clone(),
        });
        self.emit(RuntimeEvent::StatusChanged {
            instance_id: id.clone(),
            status: DependencyStatus::Error,
            error: Some(message),
        });
    }

    fn emit(&self, event: RuntimeEvent) {
        self.events.emit(&Event::Runtime(event));
    }

    fn resolve(&self, ids: Option<&BTreeSet<InstanceId>>) -> Vec<&Instance> {
        ids.map(|ids| ids.iter().filter_map(|id| self.instances.get(id)).collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for RuntimeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeManager")
            .field("definitions", &self.definitions.len())
            .field("instances", &self.instances.len())
            .field("pending_sync", &self.pending_sync.len())
            .field("config", &self.config)
            .finish()
    }
}

fn remove_from_index(
    index: &mut HashMap<String, BTreeSet<InstanceId>>,
    key: &str,
    id: &InstanceId,
) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}
