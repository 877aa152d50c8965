//! Process-wide entity registry
//!
//! Relationship fields reference their target schema by name; the registry
//! resolves those names so mutually referential schemas (Host <-> HostGroup,
//! OperatingSystem <-> Architecture) need no declaration ordering. It is
//! populated once from the builtin catalog and immutable thereafter.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::entities;
use crate::error::{Result, SchemaError};
use crate::schema::{EntitySchema, Instance};

pub struct Registry {
    schemas: BTreeMap<&'static str, EntitySchema>,
}

static BUILTIN: Lazy<Registry> = Lazy::new(|| Registry::new(entities::all()));

impl Registry {
    fn new(schemas: Vec<EntitySchema>) -> Self {
        let schemas: BTreeMap<_, _> = schemas.into_iter().map(|s| (s.name, s)).collect();
        debug!(count = schemas.len(), "entity registry populated");
        Self { schemas }
    }

    /// The registry of all builtin entity schemas.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn get(&'static self, name: &str) -> Result<&'static EntitySchema> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))
    }

    /// A blank instance of the named entity type.
    pub fn instance(&'static self, name: &str) -> Result<Instance> {
        Ok(Instance::new(self.get(name)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntitySchema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_populated() {
        let registry = Registry::builtin();
        assert!(registry.len() > 20);
        assert!(registry.get("Organization").is_ok());
        assert!(registry.get("NoSuchEntity").is_err());
    }

    #[test]
    fn test_cyclic_references_resolve() {
        // OperatingSystem and Architecture reference each other; both ends
        // must resolve without any ordering constraint.
        let registry = Registry::builtin();
        let os = registry.get("OperatingSystem").unwrap();
        let arch_target = os.field("architectures").unwrap().relation_target().unwrap();
        let arch = registry.get(arch_target).unwrap();
        let os_target = arch
            .field("operating_systems")
            .unwrap()
            .relation_target()
            .unwrap();
        assert_eq!(registry.get(os_target).unwrap().name, "OperatingSystem");
    }

    #[test]
    fn test_self_reference_resolves() {
        let registry = Registry::builtin();
        let group = registry.get("HostGroup").unwrap();
        let parent = group.field("parent").unwrap().relation_target().unwrap();
        assert_eq!(parent, "HostGroup");
    }
}
