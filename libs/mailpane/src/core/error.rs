// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DependencyError {
    /// Missing or invalid configuration option, rejected data, illegal status transition.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Component '{component_id}' is of type '{actual}', expected '{expected}'")]
    TypeMismatch {
        component_id: String,
        expected: String,
        actual: String,
    },

    #[error("Definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("Dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Dependency {instance_id} uses {strategy} synchronization and cannot be pulled")]
    UnsupportedStrategy {
        instance_id: String,
        strategy: String,
    },

    #[error("Pull request failed: {0}")]
    PullFailed(String),

    #[error("Pull request timed out after {0}ms")]
    Timeout(u64),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DependencyError {
    /// Lookup misses that callers are expected to handle as a normal outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DefinitionNotFound(_) | Self::DependencyNotFound(_) | Self::ComponentNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DependencyError>;
