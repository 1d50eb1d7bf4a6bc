// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! mailpane CLI
//!
//! Inspects workspace layout files: which pane feeds which, where the
//! cycles and chains are, and what links the graph would suggest.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod layout;

#[derive(Parser)]
#[command(name = "mailpane")]
#[command(author, version, about = "mailpane workspace layout inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a layout and report links, chains, cycles and suggestions
    Check {
        /// Layout file (YAML)
        #[arg(value_name = "LAYOUT")]
        layout: PathBuf,

        /// Directory holding mailpane.yaml (defaults to the layout's directory)
        #[arg(long, value_name = "DIR")]
        config: Option<PathBuf>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error when any link closes a cycle
        #[arg(long)]
        deny_cycles: bool,
    },

    /// Print the layout's link graph in Graphviz DOT format
    Dot {
        /// Layout file (YAML)
        #[arg(value_name = "LAYOUT")]
        layout: PathBuf,
    },

    /// Print the audit log produced while applying a layout
    Logs {
        /// Layout file (YAML)
        #[arg(value_name = "LAYOUT")]
        layout: PathBuf,

        /// Only entries at this level
        #[arg(long, value_enum)]
        level: Option<Level>,

        /// Only entries about this component
        #[arg(long)]
        component: Option<String>,

        /// Only entries about this data type
        #[arg(long)]
        data_type: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for mailpane::LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => Self::Debug,
            Level::Info => Self::Info,
            Level::Warn => Self::Warn,
            Level::Error => Self::Error,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            layout,
            config,
            json,
            deny_cycles,
        } => commands::check::run(&layout, config.as_deref(), json, deny_cycles),
        Commands::Dot { layout } => commands::dot::run(&layout),
        Commands::Logs {
            layout,
            level,
            component,
            data_type,
        } => commands::logs::run(&layout, level.map(Into::into), component, data_type),
    }
}
