// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Boundary to the component layer: component lookup, request/response and
//! one-way notifications between component instances.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::{DependencyError, Result};
use crate::core::ids::InstanceId;

/// Boxed future type for async trait methods (required for dyn compatibility).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub id: String,
    pub component_type: String,
}

/// Lifecycle signals raised by the component layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentLifecycle {
    Registered { component_id: String },
    Unregistered { component_id: String },
    Updated { component_id: String },
    VisibilityChanged { component_id: String, visible: bool },
}

impl ComponentLifecycle {
    pub fn component_id(&self) -> &str {
        match self {
            Self::Registered { component_id }
            | Self::Unregistered { component_id }
            | Self::Updated { component_id }
            | Self::VisibilityChanged { component_id, .. } => component_id,
        }
    }
}

/// Transport between component instances.
///
/// The returned request future owns everything it needs, so callers may hold
/// it across their own mutations.
pub trait ComponentCommunication: Send + Sync {
    fn get_component(&self, component_id: &str) -> Option<ComponentInfo>;

    fn send_request(
        &self,
        from: &str,
        to: &str,
        method: &str,
        payload: Value,
    ) -> BoxFuture<'static, Result<Value>>;

    fn send_notification(&self, from: &str, to: &str, kind: &str, payload: Value) -> Result<()>;

    /// Called when a push-capable instance is created for `provider_id`.
    fn register_push_handler(&self, _provider_id: &str, _instance_id: &InstanceId) {}

    /// Called when that instance goes away.
    fn unregister_push_handler(&self, _provider_id: &str, _instance_id: &InstanceId) {}
}

/// Answers a request addressed to a component: `(method, payload) → response`.
pub type Responder = Arc<dyn Fn(&str, &Value) -> Result<Value> + Send + Sync>;

/// A notification delivered through [`LocalCommunication`].
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub kind: String,
    pub payload: Value,
}

/// In-process [`ComponentCommunication`] for tools and tests.
///
/// Components are registered with a type; requests are answered by per-component
/// responders (optionally after a simulated latency) and notifications are
/// recorded in delivery order.
#[derive(Default)]
pub struct LocalCommunication {
    components: Mutex<HashMap<String, ComponentInfo>>,
    responders: Mutex<HashMap<String, Responder>>,
    latency: Mutex<HashMap<String, Duration>>,
    notifications: Mutex<Vec<Notification>>,
    push_handlers: Mutex<HashMap<String, BTreeSet<InstanceId>>>,
}

impl LocalCommunication {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_component(
        &self,
        component_id: impl Into<String>,
        component_type: impl Into<String>,
    ) {
        let id = component_id.into();
        self.components.lock().insert(
            id.clone(),
            ComponentInfo {
                id,
                component_type: component_type.into(),
            },
        );
    }

    pub fn unregister_component(&self, component_id: &str) {
        self.components.lock().remove(component_id);
        self.responders.lock().remove(component_id);
        self.latency.lock().remove(component_id);
    }

    pub fn respond_with(
        &self,
        component_id: impl Into<String>,
        responder: impl Fn(&str, &Value) -> Result<Value> + Send + Sync + 'static,
    ) {
        self.responders
            .lock()
            .insert(component_id.into(), Arc::new(responder));
    }

    /// Delay every response from `component_id`.
    pub fn set_latency(&self, component_id: impl Into<String>, latency: Duration) {
        self.latency.lock().insert(component_id.into(), latency);
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn notifications_to(&self, component_id: &str) -> Vec<Notification> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.to == component_id)
            .cloned()
            .collect()
    }

    pub fn clear_notifications(&self) {
        self.notifications.lock().clear();
    }

    pub fn push_handlers(&self, provider_id: &str) -> Vec<InstanceId> {
        self.push_handlers
            .lock()
            .get(provider_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl ComponentCommunication for LocalCommunication {
    fn get_component(&self, component_id: &str) -> Option<ComponentInfo> {
        self.components.lock().get(component_id).cloned()
    }

    fn send_request(
        &self,
        _from: &str,
        to: &str,
        method: &str,
        payload: Value,
    ) -> BoxFuture<'static, Result<Value>> {
        let responder = self.responders.lock().get(to).cloned();
        let latency = self.latency.lock().get(to).copied();
        let result = match responder {
            Some(responder) => responder(method, &payload),
            None => Err(DependencyError::Communication(format!(
                "Component '{}' does not answer requests",
                to
            ))),
        };

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }

    fn send_notification(&self, from: &str, to: &str, kind: &str, payload: Value) -> Result<()> {
        if !self.components.lock().contains_key(to) {
            return Err(DependencyError::ComponentNotFound(to.to_string()));
        }
        self.notifications.lock().push(Notification {
            from: from.to_string(),
            to: to.to_string(),
            kind: kind.to_string(),
            payload,
        });
        Ok(())
    }

    fn register_push_handler(&self, provider_id: &str, instance_id: &InstanceId) {
        self.push_handlers
            .lock()
            .entry(provider_id.to_string())
            .or_default()
            .insert(instance_id.clone());
    }

    fn unregister_push_handler(&self, provider_id: &str, instance_id: &InstanceId) {
        let mut handlers = self.push_handlers.lock();
        if let Some(ids) = handlers.get_mut(provider_id) {
            ids.remove(instance_id);
            if ids.is_empty() {
                handlers.remove(provider_id);
            }
        }
    }
}

impl std::fmt::Debug for LocalCommunication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCommunication")
            .field("components", &self.components.lock().len())
            .field("notifications", &self.notifications.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_request_routed_to_responder() {
        let comm = LocalCommunication::new();
        comm.register_component("folders", "folderExplorer");
        comm.respond_with("folders", |method, payload| {
            Ok(json!({ "method": method, "echo": payload }))
        });

        let response = comm
            .send_request("list", "folders", "dependency:request", json!({"a": 1}))
            .await
            .unwrap();
        assert_eq!(response["method"], "dependency:request");
        assert_eq!(response["echo"], json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_request_without_responder_fails() {
        let comm = LocalCommunication::new();
        let err = comm
            .send_request("a", "b", "dependency:request", Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, DependencyError::Communication(_)));
    }

    #[test]
    fn test_notification_requires_known_component() {
        let comm = LocalCommunication::new();
        assert!(comm
            .send_notification("a", "b", "dependency:data", json!(1))
            .is_err());

        comm.register_component("b", "emailDetail");
        comm.send_notification("a", "b", "dependency:data", json!(1))
            .unwrap();
        assert_eq!(comm.notifications_to("b").len(), 1);
        assert_eq!(comm.notifications()[0].kind, "dependency:data");
    }
}
