//! Ferrite schema layer
//!
//! Declarative entity schemas for the Foundry server, plus everything needed
//! to turn a partial attribute set into a complete, valid one:
//!
//! - [`field`]: typed field descriptors that synthesize random valid values
//! - [`schema`]: entity schemas, instances and remote-path construction
//! - [`registry`]: process-wide name -> schema table (forward references,
//!   cycles)
//! - [`materialize`]: default synthesis + override overlay
//! - [`graph`]: inter-entity dependency introspection

mod entities;

pub mod error;
pub mod field;
pub mod graph;
pub mod materialize;
pub mod registry;
pub mod schema;

pub use error::{Result, SchemaError};
pub use field::{Charset, Field, FieldKind};
pub use graph::{dependency_edges, render_dot, Edge};
pub use materialize::{deep_update, materialize, to_payload};
pub use registry::Registry;
pub use schema::{join_url, normalize_relationship, Attr, EntitySchema, Instance, PathKind, Related};
