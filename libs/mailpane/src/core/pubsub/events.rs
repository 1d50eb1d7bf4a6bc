// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::error::Result;
use crate::core::graph::DependencyStatus;
use crate::core::ids::{ChainId, DependencyId, InstanceId};
use crate::core::observability::LogEntry;
use serde::{Deserialize, Serialize};

/// Common topic constants for dependency system events
pub mod topics {
    /// Graph topology changes (dependencies, chains, suggestions)
    pub const GRAPH: &str = "graph:topology";

    /// Audit log entries as they are appended
    pub const LOGS: &str = "graph:logs";

    /// Runtime instance lifecycle and status changes
    pub const RUNTIME: &str = "runtime:instances";

    /// Data accepted on a runtime instance
    pub const DATA: &str = "runtime:data";

    /// Get topic for a specific component
    pub fn component(component_id: &str) -> String {
        format!("component:{}", component_id)
    }
}

/// Trait for objects that can receive events
pub trait EventListener: Send {
    fn on_event(&mut self, event: &Event) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Graph(GraphEvent),
    Runtime(RuntimeEvent),
    Log(LogEntry),
    Custom {
        topic: String,
        data: serde_json::Value,
    },
}

impl Event {
    /// Get the topic this event is published on.
    pub fn topic(&self) -> String {
        match self {
            Event::Graph(_) => topics::GRAPH.to_string(),
            Event::Runtime(RuntimeEvent::DataUpdated { .. }) => topics::DATA.to_string(),
            Event::Runtime(_) => topics::RUNTIME.to_string(),
            Event::Log(_) => topics::LOGS.to_string(),
            Event::Custom { topic, .. } => topic.clone(),
        }
    }

    /// Create a custom event
    pub fn custom(topic: impl Into<String>, data: serde_json::Value) -> Self {
        Event::Custom {
            topic: topic.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphEvent {
    DependencyCreated {
        dependency_id: DependencyId,
        provider_id: String,
        consumer_id: String,
        data_type: String,
        status: DependencyStatus,
    },
    DependencyRemoved {
        dependency_id: DependencyId,
        provider_id: String,
        consumer_id: String,
    },
    DependencyStatusChanged {
        dependency_id: DependencyId,
        status: DependencyStatus,
    },
    CycleDetected {
        dependency_id: DependencyId,
        provider_id: String,
        consumer_id: String,
    },
    ChainUpdated {
        chain_id: ChainId,
        status: DependencyStatus,
        has_cycle: bool,
    },
    ChainRemoved {
        chain_id: ChainId,
    },
    SuggestionsUpdated {
        count: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuntimeEvent {
    InstanceCreated {
        instance_id: InstanceId,
        provider_id: String,
        consumer_id: String,
    },
    InstanceConfigUpdated {
        instance_id: InstanceId,
    },
    InstanceRemoved {
        instance_id: InstanceId,
    },
    StatusChanged {
        instance_id: InstanceId,
        status: DependencyStatus,
        error: Option<String>,
    },
    DataUpdated {
        instance_id: InstanceId,
        provider_id: String,
        consumer_id: String,
        data: serde_json::Value,
    },
    RequestFailed {
        instance_id: InstanceId,
        error: String,
    },
}
