//! Lookup services consumed by checkers and completers
//!
//! Both services are read-only during a pass and shared across threads, so
//! the traits require `Send + Sync`. Absence of a lookup result always means
//! "no constraint", never an error.

use std::collections::{BTreeMap, BTreeSet};

use quill_ast::resource;
use serde::{Deserialize, Serialize};

use crate::{McdocType, SchemaError};

/// Resolves named types and dispatcher members
pub trait SchemaService: Send + Sync {
    fn resolve_reference(&self, path: &str) -> Option<McdocType>;

    /// Member of `registry` registered under `key`
    fn dispatch(&self, registry: &str, key: &str) -> Option<McdocType>;

    /// Every key registered for `registry`, in a stable order
    fn dispatch_keys(&self, registry: &str) -> Vec<String>;
}

/// Registry contents and tag membership
pub trait RegistryService: Send + Sync {
    /// Members of the tag `name` (full id without the `#` prefix), nested tags expanded
    fn tag_values(&self, category: &str, name: &str) -> Vec<String>;

    fn lengthen(&self, id: &str) -> String {
        resource::lengthen(id)
    }

    /// Entries of a registry such as `entity_type`
    fn registry_entries(&self, registry: &str) -> Vec<String>;
}

// === In-memory schema table ===

/// Named types and dispatcher tables held in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaTable {
    #[serde(default)]
    pub types: BTreeMap<String, McdocType>,
    /// registry → key → member
    #[serde(default)]
    pub dispatchers: BTreeMap<String, BTreeMap<String, McdocType>>,
}

impl SchemaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert_type(&mut self, path: impl Into<String>, ty: McdocType) {
        self.types.insert(path.into(), ty);
    }

    /// Register `ty` under the lengthened `key` of `registry`
    pub fn insert_dispatch(&mut self, registry: impl Into<String>, key: &str, ty: McdocType) {
        self.dispatchers
            .entry(registry.into())
            .or_default()
            .insert(resource::lengthen(key), ty);
    }

    /// Add everything from `other`; its entries win on conflict
    pub fn merge(&mut self, other: SchemaTable) {
        for (path, ty) in other.types {
            if self.types.insert(path.clone(), ty).is_some() {
                tracing::debug!(%path, "schema type redefined");
            }
        }
        for (registry, members) in other.dispatchers {
            self.dispatchers.entry(registry).or_default().extend(members);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.dispatchers.is_empty()
    }
}

impl SchemaService for SchemaTable {
    fn resolve_reference(&self, path: &str) -> Option<McdocType> {
        self.types.get(path).cloned()
    }

    fn dispatch(&self, registry: &str, key: &str) -> Option<McdocType> {
        let members = self.dispatchers.get(registry)?;
        members
            .get(key)
            .or_else(|| members.get(&resource::lengthen(key)))
            .cloned()
    }

    fn dispatch_keys(&self, registry: &str) -> Vec<String> {
        self.dispatchers
            .get(registry)
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default()
    }
}

// === In-memory tag table ===

/// Tag and registry contents held in memory.
///
/// Tag categories follow the `tag/<registry>` convention, e.g.
/// `tag/entity_type`. Values may be short ids and may reference other tags
/// with a `#` prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagTable {
    /// category → tag id → values
    #[serde(default)]
    pub tags: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// registry → entries
    #[serde(default)]
    pub registries: BTreeMap<String, Vec<String>>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert_tag<I, S>(&mut self, category: impl Into<String>, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .entry(category.into())
            .or_default()
            .insert(resource::lengthen(name), values.into_iter().map(Into::into).collect());
    }

    pub fn insert_registry<I, S>(&mut self, registry: impl Into<String>, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registries
            .insert(registry.into(), entries.into_iter().map(Into::into).collect());
    }

    fn expand(&self, category: &str, name: &str, seen: &mut BTreeSet<String>, out: &mut Vec<String>) {
        let name = resource::lengthen(name);
        if !seen.insert(name.clone()) {
            return;
        }
        let Some(values) = self.tags.get(category).and_then(|tags| tags.get(&name)) else {
            return;
        };
        for value in values {
            match value.strip_prefix(resource::TAG_PREFIX) {
                Some(nested) => self.expand(category, nested, seen, out),
                None => {
                    let id = resource::lengthen(value);
                    if !out.contains(&id) {
                        out.push(id);
                    }
                }
            }
        }
    }
}

impl RegistryService for TagTable {
    fn tag_values(&self, category: &str, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.expand(category, name, &mut BTreeSet::new(), &mut out);
        out
    }

    fn registry_entries(&self, registry: &str) -> Vec<String> {
        self.registries.get(registry).cloned().unwrap_or_default()
    }
}
