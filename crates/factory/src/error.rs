//! Factory error types

use ferrite_schema::SchemaError;
use ferrite_transport::TransportError;

/// Errors raised while creating entities on the server.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// A required creation option was never supplied. Raised before any
    /// remote call is made.
    #[error("cannot create {entity}: required option '{field}' is unset")]
    MissingRequired {
        entity: &'static str,
        field: &'static str,
    },

    /// None of the options in an alternative group was supplied. Raised
    /// before any remote call is made.
    #[error("cannot create {entity}: one of [{group}] must be set")]
    MissingRequiredGroup { entity: &'static str, group: String },

    /// The server rejected the creation. Carries the attempted attributes
    /// and the full remote diagnostic so the failure is reproducible from
    /// the log alone.
    #[error("failed to create {entity} with attributes\n{attrs}\n{diagnostic}")]
    Create {
        entity: &'static str,
        attrs: String,
        diagnostic: String,
    },

    /// A file-backed attribute held a value that cannot be turned into
    /// file content.
    #[error("cannot create {entity}: field '{field}' does not hold file content")]
    BadFileValue {
        entity: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Transfer(#[from] TransportError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, FactoryError>;
