//! Entity schema model
//!
//! An [`EntitySchema`] is the declarative description of one remote object
//! type: a named set of typed fields plus per-type metadata (remote path
//! template, required-field policy, CLI option spelling overrides). An
//! [`Instance`] binds a schema to concrete attribute values for one test
//! scenario; the remote system is the source of truth once the instance has
//! been created.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::field::{Field, FieldKind};
use crate::registry::Registry;

/// One attribute value on an instance.
///
/// A present key holding `Value(Null)` means "deliberately unset" and is
/// preserved through materialization; an absent key means the field was never
/// assigned. Both are omitted from serialized representations.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Value(Value),
    One(Box<Instance>),
    Many(Vec<Instance>),
}

impl Attr {
    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Value(Value::Null))
    }

    /// JSON rendering: relationship instances become their value objects.
    pub fn to_json(&self) -> Value {
        match self {
            Attr::Value(v) => v.clone(),
            Attr::One(instance) => Value::Object(instance.values()),
            Attr::Many(instances) => {
                Value::Array(instances.iter().map(|i| Value::Object(i.values())).collect())
            }
        }
    }
}

impl From<Value> for Attr {
    fn from(value: Value) -> Self {
        Attr::Value(value)
    }
}

/// Path selector for [`Instance::path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// The path to all entities of this type.
    Collection,
    /// The path to this exact entity; requires an identifier.
    Item,
}

/// Declarative description of a remote object type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    /// Entity type name, e.g. `Organization`.
    pub name: &'static str,
    /// Collection path relative to the server base URL.
    pub api_path: &'static str,
    /// Key the API wraps creation payloads under.
    pub api_json_key: &'static str,
    /// `foundryctl` resource name.
    pub cli_resource: &'static str,
    fields: Vec<(&'static str, Field)>,
    /// Fields that must each be supplied for creation.
    pub required_all: Vec<&'static str>,
    /// Alternative groups: at least one field of each group must be supplied.
    pub required_any: Vec<Vec<&'static str>>,
    /// Fields whose value is file content that must be staged on the remote
    /// host (or inlined) before creation can reference it.
    pub file_fields: Vec<&'static str>,
    /// CLI option spellings that differ from `snake -> kebab` conversion.
    pub cli_renames: Vec<(&'static str, &'static str)>,
    /// Whether a creation factory exists for this entity.
    pub has_factory: bool,
}

impl EntitySchema {
    /// Every entity implicitly carries an integer identifier field.
    pub fn new(name: &'static str, api_path: &'static str) -> Self {
        Self {
            name,
            api_path,
            api_json_key: "",
            cli_resource: "",
            fields: vec![("id", Field::integer())],
            required_all: Vec::new(),
            required_any: Vec::new(),
            file_fields: Vec::new(),
            cli_renames: Vec::new(),
            has_factory: true,
        }
    }

    pub fn field_def(mut self, name: &'static str, field: Field) -> Self {
        self.fields.push((name, field));
        self
    }

    pub fn api_json_key(mut self, key: &'static str) -> Self {
        self.api_json_key = key;
        self
    }

    pub fn cli_resource(mut self, resource: &'static str) -> Self {
        self.cli_resource = resource;
        self
    }

    pub fn require(mut self, field: &'static str) -> Self {
        self.required_all.push(field);
        self
    }

    pub fn require_any(mut self, group: &[&'static str]) -> Self {
        self.required_any.push(group.to_vec());
        self
    }

    pub fn file_field(mut self, field: &'static str) -> Self {
        self.file_fields.push(field);
        self
    }

    pub fn cli_rename(mut self, field: &'static str, option: &'static str) -> Self {
        self.cli_renames.push((field, option));
        self
    }

    pub fn no_factory(mut self) -> Self {
        self.has_factory = false;
        self
    }

    /// All declared fields, including the implicit `id`.
    pub fn get_fields(&self) -> &[(&'static str, Field)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, f)| f)
    }

    /// The `foundryctl` option spelling for a field.
    pub fn cli_option(&self, field: &str) -> String {
        self.cli_renames
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, o)| (*o).to_string())
            .unwrap_or_else(|| field.replace('_', "-"))
    }

    /// A blank instance of this schema.
    pub fn instance(&'static self) -> Instance {
        Instance::new(self)
    }
}

/// A schema bound to concrete attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    schema: &'static EntitySchema,
    attrs: BTreeMap<String, Attr>,
}

impl Instance {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            attrs: BTreeMap::new(),
        }
    }

    /// Build an instance from a JSON mapping, normalizing relationship
    /// values as they are assigned.
    pub fn from_values(schema: &'static EntitySchema, values: Map<String, Value>) -> Result<Self> {
        let mut instance = Self::new(schema);
        for (name, value) in values {
            instance.set(&name, value)?;
        }
        Ok(instance)
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Assign a JSON value to a field. Relationship fields accept an object
    /// (one instance built from it), an array of objects, or null.
    pub fn set(&mut self, field: &str, value: Value) -> Result<()> {
        let def = self.schema.field(field).ok_or_else(|| SchemaError::UnknownField {
            entity: self.schema.name,
            field: field.to_string(),
        })?;
        let attr = match (&def.kind, value) {
            (_, Value::Null) => Attr::Value(Value::Null),
            (FieldKind::OneToOne { target }, Value::Object(map)) => {
                let target = Registry::builtin().get(target)?;
                Attr::One(Box::new(Instance::from_values(target, map)?))
            }
            (FieldKind::OneToOne { .. }, other) => {
                return Err(SchemaError::BadRelationValue {
                    field: field.to_string(),
                    expected: "an object",
                    got: json_kind(&other),
                })
            }
            (FieldKind::OneToMany { target }, value) => {
                let target = Registry::builtin().get(target)?;
                Attr::Many(normalize_relationship(Related::from(value), target)?)
            }
            (_, value) => Attr::Value(value),
        };
        self.attrs.insert(field.to_string(), attr);
        Ok(())
    }

    /// Assign a pre-built relationship value; all accepted shapes are
    /// normalized to a sequence of target instances.
    pub fn set_related(&mut self, field: &str, related: impl Into<Related>) -> Result<()> {
        let def = self.schema.field(field).ok_or_else(|| SchemaError::UnknownField {
            entity: self.schema.name,
            field: field.to_string(),
        })?;
        let target = def
            .relation_target()
            .ok_or_else(|| SchemaError::NotARelationship {
                entity: self.schema.name,
                field: field.to_string(),
            })?;
        let target = Registry::builtin().get(target)?;
        let normalized = normalize_relationship(related.into(), target)?;
        let attr = match def.kind {
            FieldKind::OneToOne { .. } => match normalized.into_iter().next() {
                Some(instance) => Attr::One(Box::new(instance)),
                None => Attr::Value(Value::Null),
            },
            _ => Attr::Many(normalized),
        };
        self.attrs.insert(field.to_string(), attr);
        Ok(())
    }

    pub fn set_attr(&mut self, field: &str, attr: Attr) {
        self.attrs.insert(field.to_string(), attr);
    }

    pub fn get(&self, field: &str) -> Option<&Attr> {
        self.attrs.get(field)
    }

    pub fn id(&self) -> Option<i64> {
        match self.attrs.get("id") {
            Some(Attr::Value(Value::Number(n))) => n.as_i64(),
            _ => None,
        }
    }

    pub fn set_id(&mut self, id: i64) {
        self.attrs.insert("id".to_string(), Attr::Value(Value::from(id)));
    }

    /// Field values as a JSON object. Unset fields (absent or null) are
    /// omitted; relationship values become nested objects/arrays.
    pub fn values(&self) -> Map<String, Value> {
        self.attrs
            .iter()
            .filter(|(_, attr)| !attr.is_null())
            .map(|(name, attr)| (name.clone(), attr.to_json()))
            .collect()
    }

    /// Resolve the remote path for this instance.
    ///
    /// `Collection` (or no selector with no identifier set) yields the
    /// collection path; `Item` (or no selector with an identifier set)
    /// yields the collection path joined with the identifier. Asking for
    /// `Item` without an identifier is a caller bug and fails.
    pub fn path(&self, base: &str, which: Option<PathKind>) -> Result<String> {
        let collection = join_url(base, self.schema.api_path);
        match (which, self.id()) {
            (Some(PathKind::Collection), _) | (None, None) => Ok(collection),
            (Some(PathKind::Item), Some(id)) | (None, Some(id)) => {
                Ok(format!("{collection}/{id}"))
            }
            (Some(PathKind::Item), None) => Err(SchemaError::NoSuchPath {
                entity: self.schema.name,
                which: "item",
                reason: "no identifier is set",
            }),
        }
    }
}

/// Join a base URL and a path without doubling slashes. A present trailing
/// slash on the base does not produce an empty segment.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// The shapes accepted for relationship assignment.
#[derive(Debug, Clone)]
pub enum Related {
    Instance(Instance),
    Map(Map<String, Value>),
    Seq(Vec<Related>),
}

impl From<Instance> for Related {
    fn from(instance: Instance) -> Self {
        Related::Instance(instance)
    }
}

impl From<Map<String, Value>> for Related {
    fn from(map: Map<String, Value>) -> Self {
        Related::Map(map)
    }
}

impl From<Vec<Instance>> for Related {
    fn from(instances: Vec<Instance>) -> Self {
        Related::Seq(instances.into_iter().map(Related::Instance).collect())
    }
}

impl From<Value> for Related {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Related::Map(map),
            Value::Array(items) => Related::Seq(items.into_iter().map(Related::from).collect()),
            other => Related::Map(
                // Non-object scalars have no relationship meaning; keep the
                // shape so normalization can report it.
                std::iter::once(("".to_string(), other)).collect(),
            ),
        }
    }
}

/// Normalize any accepted relationship shape to a sequence of instances of
/// the target schema: a single instance, a bare mapping, or a sequence
/// mixing both all become `Vec<Instance>`.
pub fn normalize_relationship(
    value: Related,
    target: &'static EntitySchema,
) -> Result<Vec<Instance>> {
    match value {
        Related::Instance(instance) => Ok(vec![instance]),
        Related::Map(map) => Ok(vec![Instance::from_values(target, map)?]),
        Related::Seq(items) => {
            let mut instances = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Related::Instance(instance) => instances.push(instance),
                    Related::Map(map) => instances.push(Instance::from_values(target, map)?),
                    Related::Seq(_) => {
                        return Err(SchemaError::BadRelationValue {
                            field: target.name.to_string(),
                            expected: "an instance or mapping",
                            got: "a nested sequence",
                        })
                    }
                }
            }
            Ok(instances)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
