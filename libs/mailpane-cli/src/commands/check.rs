// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::Path;

use anyhow::{Context, Result};
use mailpane::{Chain, Dependency, DependencyStatus, LinkGraph, Suggestion};
use serde::Serialize;

use crate::layout::{AppliedLayout, ComponentSpec, Layout, LinkSpec};

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub components: Vec<&'a ComponentSpec>,
    pub links: Vec<&'a Dependency>,
    pub chains: Vec<&'a Chain>,
    pub cycles: Vec<&'a Dependency>,
    pub suggestions: &'a [Suggestion],
    pub unresolved: Vec<&'a LinkSpec>,
}

impl<'a> Report<'a> {
    pub fn new(layout: &'a Layout, applied: &'a AppliedLayout<'a>) -> Self {
        let graph: &LinkGraph = &applied.graph;
        let mut links: Vec<&Dependency> = graph.dependencies().collect();
        links.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let cycles = links
            .iter()
            .copied()
            .filter(|d| d.status == DependencyStatus::CycleDetected)
            .collect();

        Self {
            components: layout.components.iter().collect(),
            links,
            chains: graph.chains().collect(),
            cycles,
            suggestions: graph.suggestions(),
            unresolved: applied.unresolved.clone(),
        }
    }

    fn print(&self, graph: &LinkGraph) {
        println!(
            "{} components, {} links, {} chains",
            self.components.len(),
            self.links.len(),
            self.chains.len()
        );

        println!();
        println!("Components:");
        for component in &self.components {
            println!("  {} ({})", component.id, component.component_type);
        }

        if !self.links.is_empty() {
            println!();
            println!("Links:");
            for link in &self.links {
                println!(
                    "  {} -> {}  {}  [{}]",
                    link.provider_id, link.consumer_id, link.data_type, link.status
                );
            }
        }

        if !self.chains.is_empty() {
            println!();
            println!("Chains:");
            for chain in &self.chains {
                let walk: Vec<String> = chain
                    .dependencies
                    .iter()
                    .filter_map(|id| graph.dependency(id))
                    .enumerate()
                    .flat_map(|(i, d)| {
                        let mut hops = Vec::with_capacity(2);
                        if i == 0 {
                            hops.push(d.provider_id.clone());
                        }
                        hops.push(d.consumer_id.clone());
                        hops
                    })
                    .collect();
                let cycle = if chain.has_cycle { " (cycle)" } else { "" };
                println!(
                    "  {}  {}  [{}]{}",
                    chain.data_type,
                    walk.join(" -> "),
                    chain.status,
                    cycle
                );
            }
        }

        if !self.cycles.is_empty() {
            println!();
            println!("Cycles:");
            for link in &self.cycles {
                println!(
                    "  {} -> {} ({}) closes a loop",
                    link.provider_id, link.consumer_id, link.data_type
                );
            }
        }

        if !self.suggestions.is_empty() {
            println!();
            println!("Suggestions:");
            for suggestion in self.suggestions {
                println!(
                    "  {} -> {}  {}  confidence {:.2}",
                    suggestion.suggested_provider_id,
                    suggestion.suggested_consumer_id,
                    suggestion.data_type,
                    suggestion.confidence
                );
            }
        }

        if !self.unresolved.is_empty() {
            println!();
            println!("Unresolved:");
            for link in &self.unresolved {
                println!(
                    "  {} -> {}  {}  (no matching definitions)",
                    link.provider, link.consumer, link.data_type
                );
            }
        }
    }
}

pub fn run(
    layout_path: &Path,
    config_dir: Option<&Path>,
    json: bool,
    deny_cycles: bool,
) -> Result<()> {
    let layout = Layout::load(layout_path)?;
    let config = super::workspace_config(layout_path, config_dir);
    config.validate().context("Invalid workspace config")?;

    let applied = layout.apply(&config);
    let report = Report::new(&layout, &applied);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print(&applied.graph);
    }

    if deny_cycles && !report.cycles.is_empty() {
        anyhow::bail!("{} link(s) close a cycle", report.cycles.len());
    }

    Ok(())
}
