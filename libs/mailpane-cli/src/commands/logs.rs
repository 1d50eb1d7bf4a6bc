// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::Path;

use anyhow::Result;
use mailpane::{LogFilter, LogLevel};

use crate::layout::Layout;

pub fn run(
    layout_path: &Path,
    level: Option<LogLevel>,
    component: Option<String>,
    data_type: Option<String>,
) -> Result<()> {
    let layout = Layout::load(layout_path)?;
    let config = super::workspace_config(layout_path, None);
    let applied = layout.apply(&config);

    let mut filter = LogFilter::new();
    if let Some(level) = level {
        filter = filter.level(level);
    }
    if let Some(component) = component {
        filter = filter.component(component);
    }
    if let Some(data_type) = data_type {
        filter = filter.data_type(data_type);
    }

    let entries = applied.graph.filtered_logs(&filter);
    if entries.is_empty() {
        println!("No log entries.");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{} {:<5} {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.level.to_string(),
            entry.message
        );
    }

    Ok(())
}
