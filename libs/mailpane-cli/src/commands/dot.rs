// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::Path;

use anyhow::Result;

use crate::layout::Layout;

pub fn run(layout_path: &Path) -> Result<()> {
    let layout = Layout::load(layout_path)?;
    let config = super::workspace_config(layout_path, None);
    let applied = layout.apply(&config);

    for link in &applied.unresolved {
        tracing::warn!(
            "[dot] Skipping unresolved link {} -> {} ({})",
            link.provider,
            link.consumer,
            link.data_type
        );
    }

    print!("{}", applied.graph.to_dot());
    Ok(())
}
