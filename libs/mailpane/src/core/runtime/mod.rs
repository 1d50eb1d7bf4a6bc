// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod communication;
mod instance;
mod link_definition;
mod manager;

#[cfg(test)]
mod manager_tests;

pub use communication::{
    BoxFuture, ComponentCommunication, ComponentInfo, ComponentLifecycle, LocalCommunication,
    Notification, Responder,
};
pub use instance::{DataOutcome, Instance, InstanceConfig};
pub use link_definition::{ConfigOption, DataPredicate, DataTransform, LinkDefinition, SyncStrategy};
pub use manager::{RuntimeManager, DATA_NOTIFICATION, DATA_REQUEST};
