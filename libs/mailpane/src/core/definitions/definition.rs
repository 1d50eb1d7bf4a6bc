// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::core::ids::DefinitionId;

/// Role a component plays for one data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionRole {
    Provider,
    Consumer,
    Both,
}

impl DefinitionRole {
    pub fn provides(self) -> bool {
        matches!(self, Self::Provider | Self::Both)
    }

    pub fn consumes(self) -> bool {
        matches!(self, Self::Consumer | Self::Both)
    }
}

impl std::fmt::Display for DefinitionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider => write!(f, "provider"),
            Self::Consumer => write!(f, "consumer"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// One data capability of one component instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Assigned by the registry when left as `None`.
    #[serde(default)]
    pub id: Option<DefinitionId>,
    pub component_id: String,
    pub data_type: String,
    pub role: DefinitionRole,
    /// Minimum interval between accepted updates on links fed by this provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

impl Definition {
    pub fn new(
        component_id: impl Into<String>,
        data_type: impl Into<String>,
        role: DefinitionRole,
    ) -> Self {
        Self {
            id: None,
            component_id: component_id.into(),
            data_type: data_type.into(),
            role,
            debounce_ms: None,
        }
    }

    pub fn provider(component_id: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self::new(component_id, data_type, DefinitionRole::Provider)
    }

    pub fn consumer(component_id: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self::new(component_id, data_type, DefinitionRole::Consumer)
    }

    pub fn both(component_id: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self::new(component_id, data_type, DefinitionRole::Both)
    }

    pub fn with_id(mut self, id: impl Into<DefinitionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = Some(debounce_ms);
        self
    }
}
