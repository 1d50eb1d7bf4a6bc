// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod config;
pub mod definitions;
pub mod error;
pub mod graph;
pub mod ids;
pub mod observability;
pub mod pubsub;
pub mod runtime;
pub mod workspace;

pub use config::{GraphConfig, LoggingConfig, RuntimeConfig, SuggestionConfig, WorkspaceConfig};
pub use definitions::{data_types, Definition, DefinitionRegistry, DefinitionRole};
pub use error::*;
pub use graph::{
    Chain, ChainPerformance, Dependency, DependencyPerformance, DependencyStatus, LinkGraph,
    Suggestion, UsagePattern,
};
pub use ids::{ChainId, DefinitionId, DependencyId, InstanceId, SuggestionId};
pub use observability::{AuditLog, LogEntry, LogFilter, LogLevel, PerformanceSample};
pub use pubsub::{topics, Event, EventBus, EventListener, GraphEvent, RuntimeEvent};
pub use runtime::{
    BoxFuture, ComponentCommunication, ComponentInfo, ComponentLifecycle, ConfigOption,
    DataOutcome, DataPredicate, DataTransform, Instance, InstanceConfig, LinkDefinition,
    LocalCommunication, Notification, Responder, RuntimeManager, SyncStrategy, DATA_NOTIFICATION,
    DATA_REQUEST,
};
pub use workspace::{LinkHandle, Workspace};
