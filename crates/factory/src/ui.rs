//! UI backend and factory functions
//!
//! Creation through the web interface: the entity's creation form is driven
//! by a compiled list of browser steps. The server does not echo the new
//! object back through the UI, so a successful submission reports the
//! attribute set that was entered.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use ferrite_schema::{materialize, to_payload, Attr, EntitySchema, FieldKind, Registry};
use ferrite_transport::{BrowserDriver, TransportError, UiStep};

use crate::cli::render_value;
use crate::error::{FactoryError, Result};
use crate::protocol::{create, CreateBackend, ProtocolOptions, Submission};
use crate::side_channel;

const SUBMIT_SELECTOR: &str = "input[name=commit]";
const SUCCESS_SELECTOR: &str = ".alert-success";
const SUCCESS_TIMEOUT_MS: u64 = 10_000;

/// Creation backend driving the web interface.
pub struct UiBackend<'a> {
    driver: &'a dyn BrowserDriver,
    options: ProtocolOptions,
}

impl<'a> UiBackend<'a> {
    pub fn new(driver: &'a dyn BrowserDriver) -> Self {
        Self {
            driver,
            options: ProtocolOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProtocolOptions) -> Self {
        self.options = options;
        self
    }

    pub fn protocol_options(&self) -> &ProtocolOptions {
        &self.options
    }

    /// Compile the creation form interaction for an attribute set: open the
    /// form, enter every set attribute, submit, wait for the success banner.
    pub fn form_steps(schema: &'static EntitySchema, attrs: &BTreeMap<String, Attr>) -> Vec<UiStep> {
        let mut steps = vec![UiStep::Navigate {
            url: format!("/{}/new", schema.cli_resource),
        }];

        for (name, attr) in attrs {
            if name == "id" || attr.is_null() {
                continue;
            }
            let selector = format!("#{}_{}", schema.api_json_key, name);
            let field = schema.field(name);
            let boolean = field.is_some_and(|f| matches!(f.kind, FieldKind::Boolean));
            let choice = field.is_some_and(|f| f.choices.is_some());

            if boolean {
                if matches!(attr, Attr::Value(Value::Bool(true))) {
                    steps.push(UiStep::Check { selector });
                } else {
                    steps.push(UiStep::Uncheck { selector });
                }
            } else if let Some(value) = render_value(attr) {
                if choice {
                    steps.push(UiStep::Select { selector, value });
                } else {
                    steps.push(UiStep::Fill { selector, value });
                }
            }
        }

        steps.push(UiStep::Click {
            selector: SUBMIT_SELECTOR.to_string(),
        });
        steps.push(UiStep::WaitFor {
            selector: SUCCESS_SELECTOR.to_string(),
            timeout_ms: SUCCESS_TIMEOUT_MS,
        });
        steps
    }
}

impl CreateBackend for UiBackend<'_> {
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
        let steps = Self::form_steps(schema, attrs);
        match self.driver.run(&steps) {
            Ok(()) => Ok(Submission {
                status: 0,
                payload: Value::Object(to_payload(attrs)),
                diagnostic: String::new(),
            }),
            // A failed browser run is a failed creation, not a harness bug.
            Err(TransportError::Browser(detail)) => Ok(Submission {
                status: 1,
                payload: Value::Null,
                diagnostic: detail,
            }),
            Err(other) => Err(FactoryError::Transfer(other)),
        }
    }
}

fn make(
    backend: &UiBackend<'_>,
    entity: &str,
    synthesized: &[&str],
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let schema = Registry::builtin().get(entity)?;
    let attrs = materialize(schema, synthesized, options)?;
    create(backend, schema, attrs, &backend.options)
}

pub fn make_organization(
    backend: &UiBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Organization", &["name"], options)
}

pub fn make_domain(
    backend: &UiBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Domain", &["name"], options)
}

pub fn make_architecture(
    backend: &UiBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Architecture", &["name"], options)
}

pub fn make_model(
    backend: &UiBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "HardwareModel", &["name"], options)
}

pub fn make_user(
    backend: &UiBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(
        backend,
        "User",
        &["login", "firstname", "lastname", "mail", "password"],
        options,
    )
}

pub fn make_medium(
    backend: &UiBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Medium", &["name", "path"], options)
}

pub fn make_subnet(
    backend: &UiBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Subnet", &["name", "network", "mask"], options)
}

pub fn make_os(
    backend: &UiBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "OperatingSystem", &["name", "major"], options)
}
