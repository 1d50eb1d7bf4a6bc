// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Workspace layout files: the panes on screen, what each one provides and
//! consumes, and the links between them.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use mailpane::{Definition, EventBus, LinkGraph, WorkspaceConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub provider: String,
    pub consumer: String,
    pub data_type: String,
}

/// A layout applied to a fresh link graph.
pub struct AppliedLayout<'a> {
    pub graph: LinkGraph,
    /// Links that could not be created for lack of matching definitions.
    pub unresolved: Vec<&'a LinkSpec>,
}

impl Layout {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid layout {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let layout: Self = serde_yaml::from_str(content)?;
        for link in &layout.links {
            for end in [&link.provider, &link.consumer] {
                if !layout.components.iter().any(|c| &c.id == end) {
                    anyhow::bail!("Link references unknown component '{}'", end);
                }
            }
        }
        Ok(layout)
    }

    /// Register every component's definitions, then create the links in file
    /// order.
    pub fn apply(&self, config: &WorkspaceConfig) -> AppliedLayout<'_> {
        let mut graph = LinkGraph::with_config(config.graph(), Arc::new(EventBus::new()));

        for component in &self.components {
            for definition in component.definitions() {
                graph.register_definition(definition);
            }
        }

        let mut unresolved = Vec::new();
        for link in &self.links {
            if graph
                .create_dependency(&link.provider, &link.consumer, &link.data_type)
                .is_none()
            {
                unresolved.push(link);
            }
        }

        AppliedLayout { graph, unresolved }
    }
}

impl ComponentSpec {
    /// One definition per data type; a type both provided and consumed
    /// becomes a single `Both` definition.
    fn definitions(&self) -> Vec<Definition> {
        let mut definitions = Vec::new();
        for data_type in &self.provides {
            let definition = if self.consumes.contains(data_type) {
                Definition::both(&self.id, data_type)
            } else {
                Definition::provider(&self.id, data_type)
            };
            definitions.push(match self.debounce_ms {
                Some(ms) => definition.with_debounce_ms(ms),
                None => definition,
            });
        }
        for data_type in &self.consumes {
            if !self.provides.contains(data_type) {
                definitions.push(Definition::consumer(&self.id, data_type));
            }
        }
        definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailpane::DependencyStatus;

    const EMAIL_LAYOUT: &str = r#"
components:
  - id: folders
    type: folderExplorer
    provides: [FOLDER_DATA]
  - id: list
    type: emailList
    provides: [EMAIL_DATA]
    consumes: [FOLDER_DATA, EMAIL_DATA]
  - id: detail
    type: emailDetail
    provides: [EMAIL_DATA]
    consumes: [EMAIL_DATA]
    debounce_ms: 250
links:
  - { provider: folders, consumer: list, data_type: FOLDER_DATA }
  - { provider: list, consumer: detail, data_type: EMAIL_DATA }
  - { provider: detail, consumer: list, data_type: EMAIL_DATA }
"#;

    #[test]
    fn test_layout_applies_links() {
        let layout = Layout::from_yaml_str(EMAIL_LAYOUT).unwrap();
        let applied = layout.apply(&WorkspaceConfig::default());

        assert!(applied.unresolved.is_empty());
        assert_eq!(applied.graph.dependency_count(), 3);

        let back = applied
            .graph
            .find_dependency("detail", "list", "EMAIL_DATA")
            .unwrap();
        assert_eq!(back.status, DependencyStatus::CycleDetected);
    }

    #[test]
    fn test_both_roles_collapse_into_one_definition() {
        let layout = Layout::from_yaml_str(EMAIL_LAYOUT).unwrap();
        let list = &layout.components[1];
        let definitions = list.definitions();

        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[0].role, mailpane::DefinitionRole::Both);
        assert_eq!(definitions[1].role, mailpane::DefinitionRole::Consumer);
        assert_eq!(layout.components[2].definitions()[0].debounce_ms, Some(250));
    }

    #[test]
    fn test_link_to_undeclared_capability_is_unresolved() {
        let layout = Layout::from_yaml_str(
            r#"
components:
  - { id: settings, type: settingsPanel, provides: [SETTINGS_DATA] }
  - { id: list, type: emailList }
links:
  - { provider: settings, consumer: list, data_type: SETTINGS_DATA }
"#,
        )
        .unwrap();

        let applied = layout.apply(&WorkspaceConfig::default());
        assert_eq!(applied.unresolved.len(), 1);
        assert_eq!(applied.graph.dependency_count(), 0);
    }

    #[test]
    fn test_unknown_component_rejected() {
        let err = Layout::from_yaml_str(
            "components: []\nlinks:\n  - { provider: a, consumer: b, data_type: EMAIL_DATA }\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown component"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yaml");
        std::fs::write(&path, EMAIL_LAYOUT).unwrap();

        let layout = Layout::load(&path).unwrap();
        assert_eq!(layout.components.len(), 3);
        assert!(Layout::load(&dir.path().join("missing.yaml")).is_err());
    }
}
