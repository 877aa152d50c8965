//! Attribute materialization
//!
//! Turns a partial, caller-supplied attribute set into a complete one:
//! every declared field is present, a factory-chosen subset gets synthesized
//! defaults, and explicit caller values always win. An explicit null counts
//! as a caller value and is preserved rather than re-synthesized.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::schema::{Attr, EntitySchema, Instance};

/// Materialize a complete attribute map for `schema`.
///
/// The base mapping holds `null` for every declared field ("not yet set").
/// Only the fields named in `synthesized` get a generated default, and only
/// when `overrides` says nothing about them. Overrides are applied last.
pub fn materialize(
    schema: &'static EntitySchema,
    synthesized: &[&str],
    overrides: &Map<String, Value>,
) -> Result<BTreeMap<String, Attr>> {
    let mut attrs: BTreeMap<String, Attr> = schema
        .get_fields()
        .iter()
        .map(|(name, _)| ((*name).to_string(), Attr::Value(Value::Null)))
        .collect();

    for name in synthesized {
        if overrides.contains_key(*name) {
            continue;
        }
        let field = schema.field(name).ok_or_else(|| SchemaError::UnknownField {
            entity: schema.name,
            field: (*name).to_string(),
        })?;
        attrs.insert((*name).to_string(), field.synthesize()?);
    }

    // Overlay through Instance::set so relationship values are normalized
    // the same way they would be on direct assignment.
    let mut carrier = Instance::new(schema);
    for (name, value) in overrides {
        carrier.set(name, value.clone())?;
        if let Some(attr) = carrier.get(name) {
            attrs.insert(name.clone(), attr.clone());
        }
    }

    Ok(attrs)
}

/// Render a materialized attribute map as a flat JSON object, dropping
/// unset (null) attributes.
pub fn to_payload(attrs: &BTreeMap<String, Attr>) -> Map<String, Value> {
    attrs
        .iter()
        .filter(|(_, attr)| !attr.is_null())
        .map(|(name, attr)| (name.clone(), attr.to_json()))
        .collect()
}

/// Overlay `overrides` onto `base`. Nested objects merge key by key so a
/// partial override of a compound attribute keeps its sibling keys; any
/// other conflict replaces the base value outright.
pub fn deep_update(base: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_update(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use serde_json::json;

    fn org_schema() -> &'static EntitySchema {
        Registry::builtin().get("Organization").unwrap()
    }

    #[test]
    fn test_override_beats_synthesized_default() {
        let overrides = json!({"name": "X"});
        let attrs = materialize(org_schema(), &["name"], overrides.as_object().unwrap()).unwrap();
        assert_eq!(attrs.get("name"), Some(&Attr::Value(json!("X"))));
    }

    #[test]
    fn test_unlisted_fields_stay_null() {
        let attrs = materialize(org_schema(), &["name"], &Map::new()).unwrap();
        assert!(attrs.get("description").unwrap().is_null());
        assert!(attrs.get("label").unwrap().is_null());
        assert!(!attrs.get("name").unwrap().is_null());
    }

    #[test]
    fn test_explicit_null_is_preserved() {
        let overrides = json!({"name": null});
        let attrs = materialize(org_schema(), &["name"], overrides.as_object().unwrap()).unwrap();
        // The caller said "unset"; nothing gets synthesized over it.
        assert!(attrs.get("name").unwrap().is_null());
    }

    #[test]
    fn test_every_declared_field_is_present() {
        let attrs = materialize(org_schema(), &[], &Map::new()).unwrap();
        for (name, _) in org_schema().get_fields() {
            assert!(attrs.contains_key(*name), "missing {name}");
        }
    }

    #[test]
    fn test_payload_drops_nulls() {
        let overrides = json!({"description": "kept"});
        let attrs =
            materialize(org_schema(), &["name"], overrides.as_object().unwrap()).unwrap();
        let payload = to_payload(&attrs);
        assert!(payload.contains_key("name"));
        assert!(payload.contains_key("description"));
        assert!(!payload.contains_key("label"));
    }

    #[test]
    fn test_deep_update_merges_nested_objects() {
        let mut base = json!({
            "name": "a",
            "compute_attributes": {"cpus": 2, "memory": 4096}
        });
        let overrides = json!({
            "compute_attributes": {"memory": 8192},
            "extra": true
        });
        deep_update(
            base.as_object_mut().unwrap(),
            overrides.as_object().unwrap(),
        );
        assert_eq!(base["compute_attributes"]["cpus"], json!(2));
        assert_eq!(base["compute_attributes"]["memory"], json!(8192));
        assert_eq!(base["name"], json!("a"));
        assert_eq!(base["extra"], json!(true));
    }

    #[test]
    fn test_deep_update_replaces_scalars_with_null() {
        let mut base = json!({"name": "a"});
        let overrides = json!({"name": null});
        deep_update(
            base.as_object_mut().unwrap(),
            overrides.as_object().unwrap(),
        );
        assert_eq!(base["name"], Value::Null);
    }

    #[test]
    fn test_relationship_override_is_normalized() {
        let schema = Registry::builtin().get("Subnet").unwrap();
        let overrides = json!({"domains": {"name": "lab.example.com"}});
        let attrs = materialize(schema, &[], overrides.as_object().unwrap()).unwrap();
        match attrs.get("domains") {
            Some(Attr::Many(instances)) => {
                assert_eq!(instances.len(), 1);
                assert_eq!(instances[0].schema().name, "Domain");
            }
            other => panic!("expected Many, got {other:?}"),
        }
    }
}
