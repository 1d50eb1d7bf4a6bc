// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Component dependency system for the mailpane email workspace.
//!
//! Panes (email list, email detail, folder explorer, settings, ...) announce
//! typed data capabilities, get linked into a directed dependency graph, and
//! exchange data through a runtime manager without knowing about each other.
//!
//! ```ignore
//! let mut workspace = Workspace::new(WorkspaceConfig::default(), communication);
//! workspace.graph_mut().register_definition(Definition::provider("emailList", EMAIL_DATA));
//! workspace.graph_mut().register_definition(Definition::consumer("emailDetail", EMAIL_DATA));
//! workspace.register_link_definition(
//!     LinkDefinition::new("email-selection", EMAIL_DATA, "emailList", "emailDetail")
//!         .with_id("email-selection"),
//! );
//! let link = workspace.link("emailList", "emailDetail", EMAIL_DATA, &"email-selection".into(), None)?;
//! workspace.publish("emailList", serde_json::json!({"id": 42}));
//! ```

#![allow(clippy::type_complexity)] // Closure aliases are clear in context

pub mod core;

pub use core::*;
