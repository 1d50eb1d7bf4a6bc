// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod data_types;
mod definition;
mod registry;

pub use definition::{Definition, DefinitionRole};
pub use registry::DefinitionRegistry;
