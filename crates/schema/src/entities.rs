//! The builtin entity catalog for the Foundry server.
//!
//! One schema per remote object type the harness can drive. Field sets track
//! the product's creation options; `require`/`require_any` mirror the
//! server-side creation preconditions so factories can fail fast without a
//! remote round trip.

use crate::field::{Charset, Field};
use crate::schema::EntitySchema;

const OS_FAMILIES: [&str; 7] = [
    "Archlinux", "Debian", "Gentoo", "Redhat", "Solaris", "Suse", "Windows",
];

pub(crate) fn all() -> Vec<EntitySchema> {
    vec![
        organization(),
        activation_key(),
        content_view(),
        content_host(),
        lifecycle_environment(),
        product(),
        repository(),
        gpg_key(),
        host(),
        host_group(),
        host_collection(),
        domain(),
        subnet(),
        user(),
        operating_system(),
        architecture(),
        medium(),
        partition_table(),
        provisioning_template(),
        puppet_environment(),
        hardware_model(),
        compute_resource(),
        sync_plan(),
        smart_proxy(),
    ]
}

fn organization() -> EntitySchema {
    EntitySchema::new("Organization", "api/v2/organizations")
        .api_json_key("organization")
        .cli_resource("organization")
        .field_def("name", Field::name().required())
        .field_def("label", Field::string_with(10, &[Charset::Alpha]))
        .field_def("description", Field::string())
}

fn activation_key() -> EntitySchema {
    EntitySchema::new("ActivationKey", "katello/api/v2/activation_keys")
        .api_json_key("activation_key")
        .cli_resource("activation-key")
        .field_def("name", Field::name().required())
        .field_def("description", Field::string())
        .field_def("organization", Field::one_to_one("Organization").required())
        .field_def("organization_id", Field::integer())
        .field_def("organization_label", Field::string())
        .field_def("content_view", Field::one_to_one("ContentView"))
        .field_def("content_view_id", Field::integer())
        .field_def("lifecycle_environment", Field::one_to_one("LifecycleEnvironment"))
        .field_def("lifecycle_environment_id", Field::integer())
        .field_def("max_content_hosts", Field::integer_range(1, 100))
        .field_def("unlimited_content_hosts", Field::boolean().with_default(true))
        .require_any(&["organization", "organization_id", "organization_label"])
}

fn content_view() -> EntitySchema {
    EntitySchema::new("ContentView", "katello/api/v2/content_views")
        .api_json_key("content_view")
        .cli_resource("content-view")
        .field_def("name", Field::name().required())
        .field_def("label", Field::string_with(10, &[Charset::Alpha]))
        .field_def("description", Field::string())
        .field_def("composite", Field::boolean().with_default(false))
        .field_def("organization", Field::one_to_one("Organization").required())
        .field_def("organization_id", Field::integer())
        .field_def("repositories", Field::one_to_many("Repository"))
        .field_def("repository_ids", Field::list())
        .field_def("component_ids", Field::list())
        .require("organization_id")
}

fn content_host() -> EntitySchema {
    EntitySchema::new("ContentHost", "katello/api/v2/systems")
        .api_json_key("system")
        .cli_resource("content-host")
        .field_def("name", Field::name().required())
        .field_def("description", Field::string())
        .field_def("organization", Field::one_to_one("Organization").required())
        .field_def("organization_id", Field::integer())
        .field_def("organization_label", Field::string())
        .field_def("content_view", Field::one_to_one("ContentView").required())
        .field_def("content_view_id", Field::integer())
        .field_def("lifecycle_environment", Field::one_to_one("LifecycleEnvironment").required())
        .field_def("lifecycle_environment_id", Field::integer())
        .field_def("host_collection", Field::one_to_one("HostCollection"))
        .field_def("host_collection_id", Field::integer())
        .field_def("location", Field::string())
        .field_def("release_ver", Field::string())
        .field_def("service_level", Field::string())
        .require_any(&["organization", "organization_id", "organization_label"])
        .require_any(&["content_view", "content_view_id"])
        .require_any(&["lifecycle_environment", "lifecycle_environment_id"])
}

fn lifecycle_environment() -> EntitySchema {
    EntitySchema::new("LifecycleEnvironment", "katello/api/v2/environments")
        .api_json_key("environment")
        .cli_resource("lifecycle-environment")
        .field_def("name", Field::name().required())
        .field_def("description", Field::string())
        .field_def("organization", Field::one_to_one("Organization").required())
        .field_def("organization_id", Field::integer())
        .field_def("prior", Field::string().with_default("Library"))
        .require("organization_id")
}

fn product() -> EntitySchema {
    EntitySchema::new("Product", "katello/api/v2/products")
        .api_json_key("product")
        .cli_resource("product")
        .field_def("name", Field::name().required())
        .field_def("label", Field::string_with(10, &[Charset::Alpha]))
        .field_def("description", Field::string())
        .field_def("organization", Field::one_to_one("Organization").required())
        .field_def("organization_id", Field::integer())
        .field_def("gpg_key", Field::one_to_one("GpgKey"))
        .field_def("gpg_key_id", Field::integer())
        .field_def("sync_plan", Field::one_to_one("SyncPlan"))
        .field_def("sync_plan_id", Field::integer())
        .require("organization_id")
}

fn repository() -> EntitySchema {
    EntitySchema::new("Repository", "katello/api/v2/repositories")
        .api_json_key("repository")
        .cli_resource("repository")
        .field_def("name", Field::name().required())
        .field_def("label", Field::string_with(10, &[Charset::Alpha]))
        .field_def(
            "content_type",
            Field::string().with_choices(vec!["yum", "puppet"]).with_default("yum"),
        )
        .field_def("product", Field::one_to_one("Product").required())
        .field_def("product_id", Field::integer())
        .field_def(
            "url",
            Field::url().with_default("http://mirror.example.com/fakerepo01/"),
        )
        .field_def("publish_via_http", Field::boolean().with_default(true))
        .field_def("gpg_key", Field::one_to_one("GpgKey"))
        .field_def("gpg_key_id", Field::integer())
        .field_def("organization", Field::one_to_one("Organization"))
        .field_def("organization_id", Field::integer())
        .field_def("organization_label", Field::string())
        .require("product_id")
}

fn gpg_key() -> EntitySchema {
    EntitySchema::new("GpgKey", "katello/api/v2/gpg_keys")
        .api_json_key("gpg_key")
        .cli_resource("gpg")
        .field_def("name", Field::name().required())
        // Remote path of the key material; staged via the side channel.
        .field_def("key", Field::string())
        .field_def("organization", Field::one_to_one("Organization").required())
        .field_def("organization_id", Field::integer())
        .require("organization_id")
        .file_field("key")
}

fn host() -> EntitySchema {
    EntitySchema::new("Host", "api/v2/hosts")
        .api_json_key("host")
        .cli_resource("host")
        .field_def("name", Field::name().required())
        .field_def("ip", Field::ip())
        .field_def("mac", Field::mac())
        .field_def("root_password", Field::string_with(8, &[Charset::Alpha]))
        .field_def("build", Field::boolean().with_default(true))
        .field_def("enabled", Field::boolean().with_default(true))
        .field_def("managed", Field::boolean().with_default(true))
        .field_def("architecture", Field::one_to_one("Architecture").required())
        .field_def("architecture_id", Field::integer())
        .field_def("domain", Field::one_to_one("Domain").required())
        .field_def("domain_id", Field::integer())
        .field_def("environment", Field::one_to_one("PuppetEnvironment").required())
        .field_def("environment_id", Field::integer())
        .field_def("medium", Field::one_to_one("Medium").required())
        .field_def("medium_id", Field::integer())
        .field_def("operating_system", Field::one_to_one("OperatingSystem").required())
        .field_def("operating_system_id", Field::integer())
        .field_def("partition_table", Field::one_to_one("PartitionTable").required())
        .field_def("partition_table_id", Field::integer())
        .field_def("puppet_proxy", Field::one_to_one("SmartProxy").required())
        .field_def("puppet_proxy_id", Field::integer())
        .field_def("subnet", Field::one_to_one("Subnet"))
        .field_def("subnet_id", Field::integer())
        .field_def("hostgroup", Field::one_to_one("HostGroup"))
        .field_def("hostgroup_id", Field::integer())
        .field_def("model", Field::one_to_one("HardwareModel"))
        .field_def("model_id", Field::integer())
        .field_def("compute_resource", Field::one_to_one("ComputeResource"))
        .field_def("compute_resource_id", Field::integer())
        .field_def("organization", Field::one_to_one("Organization"))
        .field_def("organization_id", Field::integer())
        .require("architecture_id")
        .require("domain_id")
        .require("environment_id")
        .require("medium_id")
        .require("operating_system_id")
        .require("partition_table_id")
        .require("puppet_proxy_id")
        .cli_rename("operating_system", "operatingsystem")
        .cli_rename("operating_system_id", "operatingsystem-id")
        .cli_rename("partition_table", "ptable")
        .cli_rename("partition_table_id", "partition-table-id")
}

fn host_group() -> EntitySchema {
    EntitySchema::new("HostGroup", "api/v2/hostgroups")
        .api_json_key("hostgroup")
        .cli_resource("hostgroup")
        .field_def("name", Field::name().required())
        .field_def("architecture", Field::one_to_one("Architecture"))
        .field_def("architecture_id", Field::integer())
        .field_def("domain", Field::one_to_one("Domain"))
        .field_def("domain_id", Field::integer())
        .field_def("environment", Field::one_to_one("PuppetEnvironment"))
        .field_def("environment_id", Field::integer())
        .field_def("medium", Field::one_to_one("Medium"))
        .field_def("medium_id", Field::integer())
        .field_def("operating_system", Field::one_to_one("OperatingSystem"))
        .field_def("operating_system_id", Field::integer())
        .field_def("parent", Field::one_to_one("HostGroup"))
        .field_def("parent_id", Field::integer())
        .field_def("partition_table", Field::one_to_one("PartitionTable"))
        .field_def("partition_table_id", Field::integer())
        .field_def("puppet_proxy", Field::one_to_one("SmartProxy"))
        .field_def("puppet_proxy_id", Field::integer())
        .field_def("subnet", Field::one_to_one("Subnet"))
        .field_def("subnet_id", Field::integer())
        .cli_rename("operating_system", "operatingsystem")
        .cli_rename("operating_system_id", "operatingsystem-id")
        .cli_rename("partition_table", "ptable")
        .cli_rename("partition_table_id", "ptable-id")
}

fn host_collection() -> EntitySchema {
    EntitySchema::new("HostCollection", "katello/api/v2/host_collections")
        .api_json_key("host_collection")
        .cli_resource("host-collection")
        .field_def("name", Field::name().required())
        .field_def("description", Field::string())
        .field_def("max_content_hosts", Field::integer_range(1, 100))
        .field_def("organization", Field::one_to_one("Organization").required())
        .field_def("organization_id", Field::integer())
        .field_def("system_ids", Field::list())
        .require("organization_id")
}

fn domain() -> EntitySchema {
    EntitySchema::new("Domain", "api/v2/domains")
        .api_json_key("domain")
        .cli_resource("domain")
        .field_def("name", Field::name().required())
        .field_def("description", Field::string())
        .field_def("dns", Field::one_to_one("SmartProxy"))
        .field_def("dns_id", Field::integer())
}

fn subnet() -> EntitySchema {
    EntitySchema::new("Subnet", "api/v2/subnets")
        .api_json_key("subnet")
        .cli_resource("subnet")
        .field_def("name", Field::string_with(8, &[Charset::Alpha]).required())
        .field_def("network", Field::ip().required())
        .field_def("mask", Field::ip().with_default("255.255.255.0"))
        .field_def("gateway", Field::ip())
        .field_def("dns_primary", Field::ip())
        .field_def("dns_secondary", Field::ip())
        .field_def("from", Field::ip())
        .field_def("to", Field::ip())
        .field_def("vlanid", Field::integer_range(1, 4094))
        .field_def("domains", Field::one_to_many("Domain"))
        .field_def("domain_ids", Field::list())
        .field_def("dhcp", Field::one_to_one("SmartProxy"))
        .field_def("dhcp_id", Field::integer())
        .field_def("tftp", Field::one_to_one("SmartProxy"))
        .field_def("tftp_id", Field::integer())
        .field_def("dns", Field::one_to_one("SmartProxy"))
        .field_def("dns_id", Field::integer())
}

fn user() -> EntitySchema {
    EntitySchema::new("User", "api/v2/users")
        .api_json_key("user")
        .cli_resource("user")
        .field_def("login", Field::string_with(8, &[Charset::Alphanumeric]).required())
        .field_def("firstname", Field::name())
        .field_def("lastname", Field::name())
        .field_def("mail", Field::email().required())
        .field_def("admin", Field::boolean().with_default(false))
        .field_def("password", Field::string_with(12, &[Charset::Alphanumeric]).required())
        .field_def("auth_source_id", Field::integer().with_default(1))
}

fn operating_system() -> EntitySchema {
    EntitySchema::new("OperatingSystem", "api/v2/operatingsystems")
        .api_json_key("operatingsystem")
        .cli_resource("os")
        .field_def("name", Field::name().required())
        .field_def("major", Field::integer_range(0, 10).required())
        .field_def("minor", Field::integer_range(0, 10))
        .field_def("family", Field::string().with_choices(OS_FAMILIES.to_vec()))
        .field_def("description", Field::string())
        .field_def("release_name", Field::string_with(10, &[Charset::Alpha]))
        .field_def("architectures", Field::one_to_many("Architecture"))
        .field_def("architecture_ids", Field::list())
        .field_def("media", Field::one_to_many("Medium"))
        .field_def("medium_ids", Field::list())
        .field_def("partition_tables", Field::one_to_many("PartitionTable"))
        .field_def("partition_table_ids", Field::list())
        .cli_rename("partition_table_ids", "ptable-ids")
}

fn architecture() -> EntitySchema {
    EntitySchema::new("Architecture", "api/v2/architectures")
        .api_json_key("architecture")
        .cli_resource("architecture")
        .field_def("name", Field::name().required())
        .field_def("operating_systems", Field::one_to_many("OperatingSystem"))
        .field_def("operating_system_ids", Field::list())
        .cli_rename("operating_system_ids", "operatingsystem-ids")
}

fn medium() -> EntitySchema {
    EntitySchema::new("Medium", "api/v2/media")
        .api_json_key("medium")
        .cli_resource("medium")
        .field_def("name", Field::name().required())
        .field_def("path", Field::url().required())
        .field_def("os_family", Field::string().with_choices(OS_FAMILIES.to_vec()))
        .field_def("operating_systems", Field::one_to_many("OperatingSystem"))
        .field_def("operating_system_ids", Field::list())
        .cli_rename("operating_system_ids", "operatingsystem-ids")
}

fn partition_table() -> EntitySchema {
    EntitySchema::new("PartitionTable", "api/v2/ptables")
        .api_json_key("ptable")
        .cli_resource("partition-table")
        .field_def("name", Field::name().required())
        // Remote path of the layout file; staged via the side channel.
        .field_def("layout", Field::string())
        .field_def("os_family", Field::string().with_choices(OS_FAMILIES.to_vec()))
        .file_field("layout")
        .cli_rename("layout", "file")
}

fn provisioning_template() -> EntitySchema {
    EntitySchema::new("ProvisioningTemplate", "api/v2/config_templates")
        .api_json_key("config_template")
        .cli_resource("template")
        .field_def("name", Field::name().required())
        // Remote path of the template body; staged via the side channel.
        .field_def("template", Field::string())
        .field_def(
            "template_kind",
            Field::string().with_choices(vec!["snippet", "script", "provision", "PXELinux", "finish"]),
        )
        .field_def("audit_comment", Field::string())
        .field_def("operating_systems", Field::one_to_many("OperatingSystem"))
        .field_def("operating_system_ids", Field::list())
        .file_field("template")
        .cli_rename("template", "file")
        .cli_rename("template_kind", "type")
        .cli_rename("operating_system_ids", "operatingsystem-ids")
}

fn puppet_environment() -> EntitySchema {
    EntitySchema::new("PuppetEnvironment", "api/v2/environments")
        .api_json_key("environment")
        .cli_resource("environment")
        .field_def("name", Field::string_with(8, &[Charset::Alphanumeric]).required())
}

fn hardware_model() -> EntitySchema {
    EntitySchema::new("HardwareModel", "api/v2/models")
        .api_json_key("model")
        .cli_resource("model")
        .field_def("name", Field::name().required())
        .field_def("info", Field::string())
        .field_def("vendor_class", Field::string())
        .field_def("hardware_model", Field::string())
}

fn compute_resource() -> EntitySchema {
    EntitySchema::new("ComputeResource", "api/v2/compute_resources")
        .api_json_key("compute_resource")
        .cli_resource("compute-resource")
        .field_def("name", Field::string_with(8, &[Charset::Alpha]).required())
        .field_def(
            "provider",
            Field::string()
                .with_choices(vec![
                    "Libvirt", "Ovirt", "EC2", "Vmware", "Openstack", "Rackspace", "GCE",
                ])
                .with_default("Libvirt"),
        )
        .field_def("url", Field::url().with_default("qemu+tcp://localhost:16509/system"))
        .field_def("description", Field::string())
        .field_def("user", Field::string())
        .field_def("password", Field::string())
        .field_def("region", Field::string())
        .field_def("tenant", Field::string())
        .field_def("server", Field::string())
}

fn sync_plan() -> EntitySchema {
    EntitySchema::new("SyncPlan", "katello/api/v2/sync_plans")
        .api_json_key("sync_plan")
        .cli_resource("sync-plan")
        .field_def("name", Field::name().required())
        .field_def("description", Field::string())
        .field_def(
            "interval",
            Field::string().with_choices(vec!["none", "hourly", "daily", "weekly"]),
        )
        .field_def("sync_date", Field::datetime().required())
        .field_def("organization", Field::one_to_one("Organization").required())
        .field_def("organization_id", Field::integer())
        .require("organization_id")
}

fn smart_proxy() -> EntitySchema {
    // Assumed preconfigured on the main server; no creation factory exists.
    EntitySchema::new("SmartProxy", "api/v2/smart_proxies")
        .api_json_key("smart_proxy")
        .cli_resource("proxy")
        .field_def("name", Field::name().required())
        .field_def("url", Field::url().required())
        .no_factory()
}

#[cfg(test)]
mod tests {
    use crate::registry::Registry;

    #[test]
    fn test_every_schema_has_wire_metadata() {
        for schema in Registry::builtin().iter() {
            assert!(!schema.api_path.is_empty(), "{}", schema.name);
            assert!(!schema.api_json_key.is_empty(), "{}", schema.name);
            assert!(!schema.cli_resource.is_empty(), "{}", schema.name);
        }
    }

    #[test]
    fn test_relation_targets_all_resolve() {
        let registry = Registry::builtin();
        for schema in registry.iter() {
            for (name, field) in schema.get_fields() {
                if let Some(target) = field.relation_target() {
                    assert!(
                        registry.get(target).is_ok(),
                        "{}.{} points at unknown entity {}",
                        schema.name,
                        name,
                        target
                    );
                }
            }
        }
    }

    #[test]
    fn test_file_fields_are_declared_fields() {
        for schema in Registry::builtin().iter() {
            for file_field in &schema.file_fields {
                assert!(schema.field(file_field).is_some(), "{}", schema.name);
            }
        }
    }

    #[test]
    fn test_required_policy_names_declared_fields() {
        for schema in Registry::builtin().iter() {
            for field in &schema.required_all {
                assert!(schema.field(field).is_some(), "{}.{}", schema.name, field);
            }
            for group in &schema.required_any {
                assert!(!group.is_empty(), "{}", schema.name);
                for field in group {
                    assert!(schema.field(field).is_some(), "{}.{}", schema.name, field);
                }
            }
        }
    }

    #[test]
    fn test_smart_proxy_has_no_factory() {
        assert!(!Registry::builtin().get("SmartProxy").unwrap().has_factory);
    }

    #[test]
    fn test_cli_option_renames() {
        let host = Registry::builtin().get("Host").unwrap();
        assert_eq!(host.cli_option("operating_system_id"), "operatingsystem-id");
        assert_eq!(host.cli_option("architecture_id"), "architecture-id");
    }
}
