//! CLI backend and factory functions
//!
//! Creation through the `foundryctl` management CLI, driven over the remote
//! command runner. Each `make_*` function covers one entity type: it fills
//! the entity's usual generated fields, overlays the caller's options, and
//! runs the creation protocol. Preconditions the server would reject (a
//! missing organization, say) fail locally before any command is issued.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use ferrite_schema::{materialize, Attr, EntitySchema, Instance, Registry};
use ferrite_transport::{CommandRunner, FileTransfer};

use crate::error::Result;
use crate::protocol::{create, CreateBackend, ProtocolOptions, Submission};
use crate::side_channel;

/// Creation backend shelling out to `foundryctl` on the remote host.
pub struct CliBackend<'a> {
    runner: &'a dyn CommandRunner,
    transfer: &'a dyn FileTransfer,
    options: ProtocolOptions,
}

impl<'a> CliBackend<'a> {
    pub fn new(runner: &'a dyn CommandRunner, transfer: &'a dyn FileTransfer) -> Self {
        Self {
            runner,
            transfer,
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

    /// Render the creation command for an attribute set. Unset attributes
    /// are omitted; `id` is server-assigned and never passed.
    pub fn command_line(schema: &'static EntitySchema, attrs: &BTreeMap<String, Attr>) -> String {
        let mut command = format!("foundryctl --output=json {} create", schema.cli_resource);
        for (name, attr) in attrs {
            if name == "id" {
                continue;
            }
            if let Some(value) = render_value(attr) {
                command.push_str(&format!(
                    " --{} {}",
                    schema.cli_option(name),
                    shell_quote(&value)
                ));
            }
        }
        command
    }
}

impl CreateBackend for CliBackend<'_> {
    fn prepare(
        &self,
        schema: &'static EntitySchema,
        attrs: &mut BTreeMap<String, Attr>,
    ) -> Result<()> {
        side_channel::upload_file_fields(schema, attrs, self.transfer)
    }

    fn submit(
        &self,
        schema: &'static EntitySchema,
        attrs: &BTreeMap<String, Attr>,
    ) -> Result<Submission> {
        let command = Self::command_line(schema, attrs);
        let output = self.runner.run(&command)?;
        let payload = if output.success() {
            output.json()?
        } else {
            Value::Null
        };
        Ok(Submission {
            status: output.return_code,
            payload,
            diagnostic: output.stderr,
        })
    }
}

/// Render an attribute as a single CLI option value. Relationship values
/// collapse to the target's identifier, or its name before creation.
pub(crate) fn render_value(attr: &Attr) -> Option<String> {
    match attr {
        Attr::Value(Value::Null) => None,
        Attr::Value(Value::String(text)) => Some(text.clone()),
        Attr::Value(Value::Bool(flag)) => Some(flag.to_string()),
        Attr::Value(Value::Number(number)) => Some(number.to_string()),
        Attr::Value(Value::Array(items)) => {
            Some(items.iter().map(scalar_text).collect::<Vec<_>>().join(","))
        }
        Attr::Value(object) => Some(object.to_string()),
        Attr::One(instance) => Some(instance_ref(instance)),
        Attr::Many(instances) => {
            Some(instances.iter().map(instance_ref).collect::<Vec<_>>().join(","))
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn instance_ref(instance: &Instance) -> String {
    if let Some(id) = instance.id() {
        return id.to_string();
    }
    match instance.get("name") {
        Some(Attr::Value(Value::String(name))) => name.clone(),
        _ => Value::Object(instance.values()).to_string(),
    }
}

/// Quote a value for the remote shell. Plain words pass through untouched.
fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@=+,".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

fn make(
    backend: &CliBackend<'_>,
    entity: &str,
    synthesized: &[&str],
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let schema = Registry::builtin().get(entity)?;
    let attrs = materialize(schema, synthesized, options)?;
    create(backend, schema, attrs, &backend.options)
}

/// Move a caller-supplied `content` pseudo-option into the entity's
/// file-backed field so the side channel stages it.
fn promote_content(options: &Map<String, Value>, field: &str) -> Map<String, Value> {
    let mut options = options.clone();
    if let Some(content) = options.remove("content") {
        options.entry(field.to_string()).or_insert(content);
    }
    options
}

pub fn make_organization(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Organization", &["name"], options)
}

pub fn make_activation_key(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "ActivationKey", &["name"], options)
}

pub fn make_content_view(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "ContentView", &["name"], options)
}

pub fn make_content_host(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "ContentHost", &["name"], options)
}

pub fn make_lifecycle_environment(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "LifecycleEnvironment", &["name", "prior"], options)
}

pub fn make_product(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Product", &["name"], options)
}

pub fn make_repository(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(
        backend,
        "Repository",
        &["name", "content_type", "url", "publish_via_http"],
        options,
    )
}

pub fn make_gpg_key(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let options = promote_content(options, "key");
    make(backend, "GpgKey", &["name"], &options)
}

pub fn make_host(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Host", &["name", "mac", "root_password"], options)
}

pub fn make_hostgroup(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "HostGroup", &["name"], options)
}

pub fn make_host_collection(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "HostCollection", &["name"], options)
}

pub fn make_domain(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Domain", &["name"], options)
}

pub fn make_subnet(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Subnet", &["name", "network", "mask"], options)
}

pub fn make_user(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(
        backend,
        "User",
        &["login", "firstname", "lastname", "mail", "password", "auth_source_id"],
        options,
    )
}

pub fn make_os(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "OperatingSystem", &["name", "major", "minor"], options)
}

pub fn make_architecture(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Architecture", &["name"], options)
}

pub fn make_medium(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "Medium", &["name", "path"], options)
}

pub fn make_partition_table(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let options = promote_content(options, "layout");
    make(backend, "PartitionTable", &["name"], &options)
}

pub fn make_template(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let options = promote_content(options, "template");
    make(backend, "ProvisioningTemplate", &["name"], &options)
}

pub fn make_environment(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "PuppetEnvironment", &["name"], options)
}

pub fn make_model(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "HardwareModel", &["name"], options)
}

pub fn make_compute_resource(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "ComputeResource", &["name", "provider", "url"], options)
}

pub fn make_sync_plan(
    backend: &CliBackend<'_>,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    make(backend, "SyncPlan", &["name", "interval", "sync_date"], options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactoryError;
    use ferrite_transport::CommandOutput;
    use serde_json::json;
    use std::cell::RefCell;
    use std::path::Path;
    use test_case::test_case;

    struct ScriptedRunner {
        output: CommandOutput,
        commands: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        fn returning(stdout: &str) -> Self {
            Self {
                output: CommandOutput {
                    return_code: 0,
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                },
                commands: RefCell::new(Vec::new()),
            }
        }

        fn failing(return_code: i32, stderr: &str) -> Self {
            Self {
                output: CommandOutput {
                    return_code,
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                },
                commands: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &str) -> ferrite_transport::Result<CommandOutput> {
            self.commands.borrow_mut().push(command.to_string());
            Ok(self.output.clone())
        }
    }

    struct NullTransfer;

    impl FileTransfer for NullTransfer {
        fn upload(&self, _local: &Path, _remote: &str) -> ferrite_transport::Result<()> {
            Ok(())
        }
    }

    fn backend<'a>(runner: &'a ScriptedRunner, transfer: &'a NullTransfer) -> CliBackend<'a> {
        CliBackend::new(runner, transfer).with_options(ProtocolOptions::immediate())
    }

    #[test]
    fn test_command_line_spells_options_in_kebab_case() {
        let schema = Registry::builtin().get("Organization").unwrap();
        let overrides = json!({"name": "acme", "description": "test org"});
        let attrs = materialize(schema, &[], overrides.as_object().unwrap()).unwrap();
        let command = CliBackend::command_line(schema, &attrs);
        assert_eq!(
            command,
            "foundryctl --output=json organization create --description 'test org' --name acme"
        );
    }

    #[test]
    fn test_command_line_applies_renames_and_omits_nulls() {
        let schema = Registry::builtin().get("Host").unwrap();
        let overrides = json!({"name": "h1", "operating_system_id": 4});
        let attrs = materialize(schema, &[], overrides.as_object().unwrap()).unwrap();
        let command = CliBackend::command_line(schema, &attrs);
        assert!(command.contains("--operatingsystem-id 4"));
        assert!(command.contains("--name h1"));
        assert!(!command.contains("--domain"));
        assert!(!command.contains("--id"));
    }

    #[test]
    fn test_render_value_collapses_relationships() {
        let mut org = Registry::builtin().instance("Organization").unwrap();
        org.set_id(9);
        assert_eq!(render_value(&Attr::One(Box::new(org))), Some("9".to_string()));

        let mut unsaved = Registry::builtin().instance("Organization").unwrap();
        unsaved.set("name", Value::from("acme")).unwrap();
        assert_eq!(
            render_value(&Attr::One(Box::new(unsaved))),
            Some("acme".to_string())
        );
    }

    #[test]
    fn test_render_value_joins_lists() {
        let attr = Attr::Value(json!([1, 2, 3]));
        assert_eq!(render_value(&attr), Some("1,2,3".to_string()));
    }

    #[test_case("plain-word", "plain-word"; "plain word passes through")]
    #[test_case("two words", "'two words'"; "spaces are quoted")]
    #[test_case("it's", r"'it'\''s'"; "embedded quote is escaped")]
    #[test_case("", "''"; "empty value stays an argument")]
    fn test_shell_quote(input: &str, expected: &str) {
        assert_eq!(shell_quote(input), expected);
    }

    #[test]
    fn test_make_organization_returns_server_id_and_name() {
        let runner = ScriptedRunner::returning(r#"{"id": 11, "name": "generated"}"#);
        let transfer = NullTransfer;
        let result = make_organization(&backend(&runner, &transfer), &Map::new()).unwrap();
        assert_eq!(result["id"], json!(11));
        assert!(result.get("name").is_some());
        let commands = runner.commands.borrow();
        assert!(commands[0].starts_with("foundryctl --output=json organization create --name "));
    }

    #[test]
    fn test_make_activation_key_requires_an_organization() {
        let runner = ScriptedRunner::returning(r#"{"id": 1}"#);
        let transfer = NullTransfer;
        let err = make_activation_key(&backend(&runner, &transfer), &Map::new()).unwrap_err();
        assert!(matches!(err, FactoryError::MissingRequiredGroup { .. }));
        assert!(runner.commands.borrow().is_empty(), "no command may be issued");
    }

    #[test]
    fn test_make_gpg_key_stages_content_as_remote_path() {
        let runner = ScriptedRunner::returning(r#"{"id": 3}"#);
        let transfer = NullTransfer;
        let options = json!({"organization_id": 1, "content": "-----BEGIN KEY-----"});
        make_gpg_key(&backend(&runner, &transfer), options.as_object().unwrap()).unwrap();
        let commands = runner.commands.borrow();
        assert!(commands[0].contains("--key /tmp/ferrite-key-"));
        assert!(!commands[0].contains("BEGIN KEY"));
    }

    #[test]
    fn test_failed_command_surfaces_stderr() {
        let runner = ScriptedRunner::failing(70, "ERROR: validation failed");
        let transfer = NullTransfer;
        let options = json!({"name": "dup"});
        let err =
            make_domain(&backend(&runner, &transfer), options.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("  ERROR: validation failed"));
    }
}
