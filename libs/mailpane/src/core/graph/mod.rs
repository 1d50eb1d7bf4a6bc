// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link graph: typed provider → consumer edges between component instances,
//! chains of same-type edges, cycle detection and link suggestions.

mod chain;
mod chains;
mod dependency;
mod link_graph;
mod status;
mod suggestion;


pub use chain::{Chain, ChainPerformance};
pub use dependency::{Dependency, DependencyPerformance};
pub use link_graph::LinkGraph;
pub use status::DependencyStatus;
pub use suggestion::{Suggestion, UsagePattern};
