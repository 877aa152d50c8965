//! Error types for the schema layer

use thiserror::Error;

/// Result type alias using SchemaError
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised by schema declaration, lookup and path construction
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("no {which} path for {entity}: {reason}")]
    NoSuchPath {
        entity: &'static str,
        which: &'static str,
        reason: &'static str,
    },

    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    #[error("{entity} has no field named {field}")]
    UnknownField { entity: &'static str, field: String },

    #[error("field {field} of {entity} is not a relationship")]
    NotARelationship { entity: &'static str, field: String },

    #[error("cannot assign {got} to relationship field {field} (expected {expected})")]
    BadRelationValue {
        field: String,
        expected: &'static str,
        got: &'static str,
    },
}
