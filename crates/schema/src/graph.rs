//! Entity dependency introspection
//!
//! Walks the registry and emits one edge per relationship field. Cycles are
//! fine: edges never recurse into their target. The DOT rendering marks
//! required links red and entities without a creation factory dotted.

use std::fmt::Write as _;

use crate::registry::Registry;

/// One inter-entity dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: &'static str,
    pub target: &'static str,
    pub field: &'static str,
    pub required: bool,
}

/// All relationship edges declared across the registry.
pub fn dependency_edges(registry: &Registry) -> Vec<Edge> {
    let mut edges = Vec::new();
    for schema in registry.iter() {
        for (name, field) in schema.get_fields() {
            if let Some(target) = field.relation_target() {
                edges.push(Edge {
                    source: schema.name,
                    target,
                    field: *name,
                    required: field.required,
                });
            }
        }
    }
    edges
}

/// Render the dependency graph in DOT format.
pub fn render_dot(registry: &Registry) -> String {
    let mut out = String::from("digraph dependencies {\n");
    for edge in dependency_edges(registry) {
        let color = if edge.required { " color=red" } else { "" };
        let _ = writeln!(
            out,
            "    {} -> {} [label=\"{}\"{}]",
            edge.source, edge.target, edge.field, color
        );
    }
    for schema in registry.iter() {
        if !schema.has_factory {
            let _ = writeln!(out, "    {} [style=dotted]", schema.name);
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_cover_relationship_fields() {
        let edges = dependency_edges(Registry::builtin());
        assert!(edges.contains(&Edge {
            source: "ActivationKey",
            target: "Organization",
            field: "organization",
            required: true,
        }));
        assert!(edges.contains(&Edge {
            source: "Subnet",
            target: "Domain",
            field: "domains",
            required: false,
        }));
    }

    #[test]
    fn test_dot_marks_required_edges_and_orphans() {
        let dot = render_dot(Registry::builtin());
        assert!(dot.starts_with("digraph dependencies {"));
        assert!(dot.contains("ActivationKey -> Organization [label=\"organization\" color=red]"));
        assert!(dot.contains("SmartProxy [style=dotted]"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_cycles_produce_plain_edges() {
        let edges = dependency_edges(Registry::builtin());
        let os_to_arch = edges
            .iter()
            .any(|e| e.source == "OperatingSystem" && e.target == "Architecture");
        let arch_to_os = edges
            .iter()
            .any(|e| e.source == "Architecture" && e.target == "OperatingSystem");
        assert!(os_to_arch && arch_to_os);
    }
}
