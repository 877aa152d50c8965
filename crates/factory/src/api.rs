//! HTTP API backend
//!
//! Creation through the server's JSON API. The API surface is schema-driven:
//! any [`Instance`] can be created directly via [`ApiCreate`], with missing
//! required scalar fields generated on the fly. File-backed attributes are
//! inlined into the payload rather than uploaded out of band.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use ferrite_schema::{join_url, materialize, to_payload, Attr, EntitySchema, Instance};
use ferrite_transport::{ApiClient, HarnessConfig};

use crate::error::Result;
use crate::protocol::{create, CreateBackend, ProtocolOptions, Submission};
use crate::side_channel;

/// Creation backend talking to the JSON API.
pub struct ApiBackend {
    client: ApiClient,
    base_url: String,
    options: ProtocolOptions,
}

impl ApiBackend {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            base_url: config.base_url(),
            options: ProtocolOptions::from_config(config),
        })
    }

    pub fn with_options(mut self, options: ProtocolOptions) -> Self {
        self.options = options;
        self
    }

    pub fn protocol_options(&self) -> &ProtocolOptions {
        &self.options
    }

    pub fn collection_url(&self, schema: &EntitySchema) -> String {
        join_url(&self.base_url, schema.api_path)
    }

    /// The creation request body: the non-null attributes, wrapped under the
    /// schema's JSON key.
    pub fn request_body(schema: &EntitySchema, attrs: &BTreeMap<String, Attr>) -> Value {
        let payload = to_payload(attrs);
        if schema.api_json_key.is_empty() {
            Value::Object(payload)
        } else {
            let mut wrapped = Map::new();
            wrapped.insert(schema.api_json_key.to_string(), Value::Object(payload));
            Value::Object(wrapped)
        }
    }
}

impl CreateBackend for ApiBackend {
    fn prepare(
        &self,
        schema: &'static EntitySchema,
        attrs: &mut BTreeMap<String, Attr>,
    ) -> Result<()> {
        side_channel::inline_file_fields(schema, attrs)
    }

    fn submit(
        &self,
        schema: &'static EntitySchema,
        attrs: &BTreeMap<String, Attr>,
    ) -> Result<Submission> {
        let url = self.collection_url(schema);
        let body = Self::request_body(schema, attrs);
        let response = self.client.post(&url, &body)?;
        if response.is_success() {
            Ok(Submission {
                status: 0,
                payload: response.body,
                diagnostic: String::new(),
            })
        } else {
            let diagnostic = serde_json::to_string_pretty(&response.body)
                .unwrap_or_else(|_| response.body.to_string());
            Ok(Submission {
                status: i32::from(response.status),
                payload: Value::Null,
                diagnostic,
            })
        }
    }
}

/// Schema-driven creation for instances built with [`Instance::from_values`]
/// or field-by-field assignment.
pub trait ApiCreate {
    /// Create this instance on the server and return the post-creation
    /// attribute mapping.
    fn create(&self, backend: &ApiBackend) -> Result<Map<String, Value>>;
}

impl ApiCreate for Instance {
    fn create(&self, backend: &ApiBackend) -> Result<Map<String, Value>> {
        let schema = self.schema();
        let synthesized = missing_required_scalars(self);
        let mut attrs = materialize(schema, &synthesized, &Map::new())?;
        for (name, _) in schema.get_fields() {
            if let Some(attr) = self.get(name) {
                attrs.insert((*name).to_string(), attr.clone());
            }
        }
        create(backend, schema, attrs, &backend.options)
    }
}

/// Required scalar fields the caller left unassigned. Relationship fields
/// are excluded: identifiers of related objects must be supplied, never
/// invented. File-backed fields are excluded because the side channel fills
/// them.
fn missing_required_scalars(instance: &Instance) -> Vec<&'static str> {
    let schema = instance.schema();
    schema
        .get_fields()
        .iter()
        .filter(|(name, field)| {
            field.required
                && field.relation_target().is_none()
                && !schema.file_fields.contains(name)
                && *name != "id"
                && instance.get(name).is_none()
        })
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_schema::Registry;
    use serde_json::json;

    fn api_backend() -> ApiBackend {
        ApiBackend::new(&HarnessConfig::default()).unwrap()
    }

    #[test]
    fn test_collection_url_joins_base_and_path() {
        let schema = Registry::builtin().get("Organization").unwrap();
        assert_eq!(
            api_backend().collection_url(schema),
            "https://foundry.example.com/api/v2/organizations"
        );
    }

    #[test]
    fn test_request_body_is_wrapped_under_json_key() {
        let schema = Registry::builtin().get("Organization").unwrap();
        let overrides = json!({"name": "acme"});
        let attrs = materialize(schema, &[], overrides.as_object().unwrap()).unwrap();
        let body = ApiBackend::request_body(schema, &attrs);
        assert_eq!(body["organization"]["name"], json!("acme"));
        assert!(body["organization"].get("label").is_none());
    }

    #[test]
    fn test_missing_required_scalars_skips_assigned_and_relations() {
        let schema = Registry::builtin().get("User").unwrap();
        let mut user = schema.instance();
        user.set("login", json!("jdoe")).unwrap();
        let missing = missing_required_scalars(&user);
        assert!(!missing.contains(&"login"));
        assert!(missing.contains(&"mail"));
        assert!(missing.contains(&"password"));
    }

    #[test]
    fn test_missing_required_scalars_never_invents_relations() {
        let schema = Registry::builtin().get("ActivationKey").unwrap();
        let key = schema.instance();
        let missing = missing_required_scalars(&key);
        assert!(missing.contains(&"name"));
        assert!(!missing.contains(&"organization"));
    }
}
