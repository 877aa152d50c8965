//! The creation protocol
//!
//! One protocol drives entity creation over every backend. The sequence is
//! fixed: validate the required-option policy, stage file-backed attributes,
//! submit, wait out server-side propagation, normalize the result shape.
//! Backends only supply the two variable steps, [`CreateBackend::prepare`]
//! and [`CreateBackend::submit`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::debug;

use ferrite_schema::{deep_update, to_payload, Attr, EntitySchema};
use ferrite_transport::HarnessConfig;

use crate::error::{FactoryError, Result};

/// Outcome of one backend submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Zero on success; a backend-specific non-zero code on failure.
    pub status: i32,
    /// The parsed creation result. Meaningful only when `status` is zero.
    pub payload: Value,
    /// Remote diagnostic text. Meaningful only when `status` is non-zero.
    pub diagnostic: String,
}

/// The two backend-specific steps of the protocol.
pub trait CreateBackend {
    /// Stage file-backed attributes so the submission can reference them.
    /// Must not leave local temporary paths in `attrs`.
    fn prepare(
        &self,
        schema: &'static EntitySchema,
        attrs: &mut BTreeMap<String, Attr>,
    ) -> Result<()>;

    /// Issue the backend-specific creation call.
    fn submit(
        &self,
        schema: &'static EntitySchema,
        attrs: &BTreeMap<String, Attr>,
    ) -> Result<Submission>;
}

/// Protocol knobs shared by all backends.
#[derive(Debug, Clone)]
pub struct ProtocolOptions {
    /// How long to wait after a successful submission for asynchronous
    /// server-side indexing to catch up.
    pub propagation_delay: Duration,
}

impl Default for ProtocolOptions {
    fn default() -> Self {
        Self {
            propagation_delay: Duration::from_secs(5),
        }
    }
}

impl ProtocolOptions {
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            propagation_delay: config.propagation_delay(),
        }
    }

    /// No propagation wait. Intended for tests and scripted backends.
    pub fn immediate() -> Self {
        Self {
            propagation_delay: Duration::ZERO,
        }
    }
}

/// Create one entity through `backend`.
///
/// On success the normalized server result is merged over the submitted
/// attributes, so the caller sees its inputs plus the server-assigned fields
/// (notably `id`) in one mapping.
pub fn create(
    backend: &dyn CreateBackend,
    schema: &'static EntitySchema,
    mut attrs: BTreeMap<String, Attr>,
    opts: &ProtocolOptions,
) -> Result<Map<String, Value>> {
    validate_required(schema, &attrs)?;

    backend.prepare(schema, &mut attrs)?;

    debug!(entity = schema.name, "submitting creation");
    let submission = backend.submit(schema, &attrs)?;

    if !opts.propagation_delay.is_zero() {
        debug!(
            entity = schema.name,
            delay_secs = opts.propagation_delay.as_secs(),
            "waiting for propagation"
        );
        std::thread::sleep(opts.propagation_delay);
    }

    if submission.status != 0 {
        return Err(creation_error(schema, &attrs, &submission.diagnostic));
    }

    let result = match unwrap_payload(submission.payload) {
        Value::Object(map) => map,
        other => {
            return Err(creation_error(
                schema,
                &attrs,
                &format!("unexpected response shape: {other}"),
            ))
        }
    };

    let mut merged = to_payload(&attrs);
    deep_update(&mut merged, &result);
    Ok(merged)
}

/// Enforce the schema's required-option policy: every `required_all` field
/// set and non-null, at least one non-null member per `required_any` group.
pub fn validate_required(
    schema: &'static EntitySchema,
    attrs: &BTreeMap<String, Attr>,
) -> Result<()> {
    let is_set = |field: &str| attrs.get(field).is_some_and(|attr| !attr.is_null());

    for field in &schema.required_all {
        if !is_set(field) {
            return Err(FactoryError::MissingRequired {
                entity: schema.name,
                field: *field,
            });
        }
    }
    for group in &schema.required_any {
        if !group.iter().any(|field| is_set(field)) {
            return Err(FactoryError::MissingRequiredGroup {
                entity: schema.name,
                group: group.join(" / "),
            });
        }
    }
    Ok(())
}

/// Normalize the success payload: a one-element array wrapping an object is
/// unwrapped to the object, everything else passes through. Idempotent.
pub fn unwrap_payload(payload: Value) -> Value {
    match payload {
        Value::Array(mut items) if items.len() == 1 && items[0].is_object() => items.remove(0),
        other => other,
    }
}

fn creation_error(
    schema: &'static EntitySchema,
    attrs: &BTreeMap<String, Attr>,
    diagnostic: &str,
) -> FactoryError {
    let attempted = serde_json::to_string_pretty(&Value::Object(to_payload(attrs)))
        .unwrap_or_else(|_| "<unserializable>".to_string());
    FactoryError::Create {
        entity: schema.name,
        attrs: indent(&attempted),
        diagnostic: indent(diagnostic),
    }
}

/// Prefix every line with two spaces.
fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
