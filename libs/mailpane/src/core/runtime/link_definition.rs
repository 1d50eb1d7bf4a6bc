// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Runtime templates for links: which component types a link joins, how data
//! is synchronized, and which configuration options an instance accepts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::core::error::{DependencyError, Result};
use crate::core::ids::DefinitionId;

/// Accept or reject a data payload.
pub type DataPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Rewrite a data payload before it is stored.
pub type DataTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Direction data moves across a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStrategy {
    /// Provider → consumer whenever the provider changes.
    #[default]
    Push,
    /// Consumer asks the provider on demand.
    Pull,
    Both,
}

impl SyncStrategy {
    pub fn pushes(self) -> bool {
        matches!(self, Self::Push | Self::Both)
    }

    pub fn pulls(self) -> bool {
        matches!(self, Self::Pull | Self::Both)
    }
}

impl std::fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// One configurable option a link instance accepts.
#[derive(Clone)]
pub struct ConfigOption {
    pub key: String,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
    /// Allowed values. Empty means unrestricted.
    pub choices: Vec<Value>,
    pub validate: Option<DataPredicate>,
}

impl ConfigOption {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: String::new(),
            required: false,
            default: None,
            choices: Vec::new(),
            validate: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = Value>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }

    pub fn validate(mut self, validate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Check a (possibly absent) value against this option's rules.
    pub fn check(&self, value: Option<&Value>) -> Result<()> {
        let value = match value {
            None | Some(Value::Null) => {
                if self.required {
                    return Err(DependencyError::Validation(format!(
                        "Missing required option '{}'",
                        self.key
                    )));
                }
                return Ok(());
            }
            Some(value) => value,
        };

        if !self.choices.is_empty() && !self.choices.contains(value) {
            return Err(DependencyError::Validation(format!(
                "Option '{}' must be one of {}, got {}",
                self.key,
                Value::Array(self.choices.clone()),
                value
            )));
        }
        if let Some(validate) = &self.validate {
            if !validate(value) {
                return Err(DependencyError::Validation(format!(
                    "Invalid value for option '{}': {}",
                    self.key, value
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOption")
            .field("key", &self.key)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("choices", &self.choices)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Template a [`RuntimeManager`](super::RuntimeManager) instantiates links from.
#[derive(Clone)]
pub struct LinkDefinition {
    pub id: Option<DefinitionId>,
    pub name: String,
    pub data_type: String,
    /// Component type expected on the providing side.
    pub provider_type: String,
    /// Component type expected on the consuming side.
    pub consumer_type: String,
    pub sync: SyncStrategy,
    pub options: Vec<ConfigOption>,
    /// Rejects payloads before they reach filters or transforms.
    pub validator: Option<DataPredicate>,
    /// Default transform; an instance-level transform takes precedence.
    pub transform: Option<DataTransform>,
}

impl LinkDefinition {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        provider_type: impl Into<String>,
        consumer_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            data_type: data_type.into(),
            provider_type: provider_type.into(),
            consumer_type: consumer_type.into(),
            sync: SyncStrategy::default(),
            options: Vec::new(),
            validator: None,
            transform: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<DefinitionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn sync(mut self, sync: SyncStrategy) -> Self {
        self.sync = sync;
        self
    }

    pub fn option(mut self, option: ConfigOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn validator(mut self, validator: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn transform(mut self, transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Option defaults as a config map.
    pub fn default_options(&self) -> Map<String, Value> {
        self.options
            .iter()
            .filter_map(|opt| opt.default.clone().map(|value| (opt.key.clone(), value)))
            .collect()
    }

    /// Validate a complete option map against every declared option.
    pub fn validate_options(&self, options: &Map<String, Value>) -> Result<()> {
        for option in &self.options {
            option.check(options.get(&option.key))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LinkDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("provider_type", &self.provider_type)
            .field("consumer_type", &self.consumer_type)
            .field("sync", &self.sync)
            .field("options", &self.options)
            .field("validator", &self.validator.is_some())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}
