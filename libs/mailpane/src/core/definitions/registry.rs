// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Per-component registry of data capabilities.
//!
//! Index tables (`component → ids`, `data type → ids`) keep registration order
//! so that "first matching definition" lookups are deterministic.

use std::collections::HashMap;

use super::{Definition, DefinitionRole};
use crate::core::ids::DefinitionId;

#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: HashMap<DefinitionId, Definition>,
    by_component: HashMap<String, Vec<DefinitionId>>,
    by_type: HashMap<String, Vec<DefinitionId>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, assigning an id when absent. Re-registering an
    /// existing id replaces the previous definition.
    pub fn register(&mut self, mut definition: Definition) -> DefinitionId {
        let id = definition.id.get_or_insert_with(DefinitionId::new).clone();

        if self.definitions.contains_key(&id) {
            tracing::debug!("[DefinitionRegistry] Overwriting definition {}", id);
            self.deindex(&id);
        }

        self.by_component
            .entry(definition.component_id.clone())
            .or_default()
            .push(id.clone());
        self.by_type
            .entry(definition.data_type.clone())
            .or_default()
            .push(id.clone());

        tracing::debug!(
            "[DefinitionRegistry] Registered {} {} for {} ({})",
            definition.role,
            definition.data_type,
            definition.component_id,
            id
        );
        self.definitions.insert(id.clone(), definition);
        id
    }

    /// Remove a definition and its index entries.
    pub fn remove(&mut self, id: &DefinitionId) -> Option<Definition> {
        if !self.definitions.contains_key(id) {
            return None;
        }
        self.deindex(id);
        self.definitions.remove(id)
    }

    fn deindex(&mut self, id: &DefinitionId) {
        let Some(existing) = self.definitions.get(id) else {
            return;
        };
        remove_from_index(&mut self.by_component, &existing.component_id, id);
        remove_from_index(&mut self.by_type, &existing.data_type, id);
    }

    pub fn get(&self, id: &DefinitionId) -> Option<&Definition> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &DefinitionId) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn by_component(&self, component_id: &str) -> Vec<&Definition> {
        self.resolve(self.by_component.get(component_id))
    }

    pub fn by_type(&self, data_type: &str) -> Vec<&Definition> {
        self.resolve(self.by_type.get(data_type))
    }

    /// Ids of every definition a component holds, in registration order.
    pub fn ids_for_component(&self, component_id: &str) -> Vec<DefinitionId> {
        self.by_component
            .get(component_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Definitions of `data_type` whose role is provider or both.
    pub fn providers(&self, data_type: &str) -> Vec<&Definition> {
        self.by_type(data_type)
            .into_iter()
            .filter(|d| d.role.provides())
            .collect()
    }

    /// Definitions of `data_type` whose role is consumer or both.
    pub fn consumers(&self, data_type: &str) -> Vec<&Definition> {
        self.by_type(data_type)
            .into_iter()
            .filter(|d| d.role.consumes())
            .collect()
    }

    /// First definition on `component_id` for `data_type` that can act as `role`.
    pub fn find(
        &self,
        component_id: &str,
        data_type: &str,
        role: DefinitionRole,
    ) -> Option<(&DefinitionId, &Definition)> {
        self.by_component
            .get(component_id)?
            .iter()
            .filter_map(|id| self.definitions.get_key_value(id))
            .find(|(_, def)| {
                def.data_type == data_type
                    && match role {
                        DefinitionRole::Provider => def.role.provides(),
                        DefinitionRole::Consumer => def.role.consumes(),
                        DefinitionRole::Both => def.role == DefinitionRole::Both,
                    }
            })
    }

    /// Every component that holds at least one definition.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.by_component.keys().map(String::as_str)
    }

    fn resolve(&self, ids: Option<&Vec<DefinitionId>>) -> Vec<&Definition> {
        ids.map(|ids| ids.iter().filter_map(|id| self.definitions.get(id)).collect())
            .unwrap_or_default()
    }
}

fn remove_from_index(index: &mut HashMap<String, Vec<DefinitionId>>, key: &str, id: &DefinitionId) {
    if let Some(ids) = index.get_mut(key) {
        ids.retain(|existing| existing != id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_types::{EMAIL_DATA, FOLDER_DATA};

    #[test]
    fn test_register_assigns_id_and_indexes() {
        let mut registry = DefinitionRegistry::new();
        let id = registry.register(Definition::provider("emailList", EMAIL_DATA));

        assert!(id.starts_with("def_"));
        assert_eq!(registry.by_component("emailList").len(), 1);
        assert_eq!(registry.by_type(EMAIL_DATA).len(), 1);
        assert_eq!(registry.get(&id).map(|d| d.id.clone()), Some(Some(id.clone())));
    }

    #[test]
    fn test_reregistering_same_id_overwrites() {
        let mut registry = DefinitionRegistry::new();
        registry.register(Definition::provider("emailList", EMAIL_DATA).with_id("def_x"));
        registry.register(Definition::consumer("folderTree", FOLDER_DATA).with_id("def_x"));

        assert_eq!(registry.len(), 1);
        assert!(registry.by_component("emailList").is_empty());
        assert!(registry.by_type(EMAIL_DATA).is_empty());
        assert_eq!(registry.by_type(FOLDER_DATA).len(), 1);
    }

    #[test]
    fn test_role_filters_include_both() {
        let mut registry = DefinitionRegistry::new();
        registry.register(Definition::provider("emailList", EMAIL_DATA));
        registry.register(Definition::consumer("emailDetail", EMAIL_DATA));
        registry.register(Definition::both("threadView", EMAIL_DATA));

        assert_eq!(registry.providers(EMAIL_DATA).len(), 2);
        assert_eq!(registry.consumers(EMAIL_DATA).len(), 2);
    }

    #[test]
    fn test_find_returns_first_match_in_registration_order() {
        let mut registry = DefinitionRegistry::new();
        let first = registry.register(Definition::both("threadView", EMAIL_DATA));
        registry.register(Definition::provider("threadView", EMAIL_DATA));

        let (found, _) = registry
            .find("threadView", EMAIL_DATA, DefinitionRole::Provider)
            .unwrap();
        assert_eq!(found, &first);
        assert!(registry
            .find("threadView", FOLDER_DATA, DefinitionRole::Provider)
            .is_none());
    }

    #[test]
    fn test_remove_deindexes() {
        let mut registry = DefinitionRegistry::new();
        let id = registry.register(Definition::provider("emailList", EMAIL_DATA));

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.by_component("emailList").is_empty());
        assert_eq!(registry.components().count(), 0);
    }
}
