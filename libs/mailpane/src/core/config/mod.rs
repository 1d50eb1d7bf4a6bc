// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod workspace_config;

pub use workspace_config::{
    GraphConfig, LoggingConfig, RuntimeConfig, SuggestionConfig, WorkspaceConfig,
};
