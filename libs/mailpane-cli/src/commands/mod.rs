// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod check;
pub mod dot;
pub mod logs;

use std::path::Path;

use mailpane::WorkspaceConfig;

/// Workspace config from `dir`, or from the layout's own directory.
pub(crate) fn workspace_config(layout: &Path, dir: Option<&Path>) -> WorkspaceConfig {
    let dir = dir
        .or_else(|| layout.parent())
        .unwrap_or_else(|| Path::new("."));
    WorkspaceConfig::load_or_default(dir)
}
