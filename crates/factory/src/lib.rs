//! Ferrite entity factories
//!
//! One creation protocol (validate, stage, submit, wait, normalize) runs
//! over three interchangeable backends:
//!
//! - [`cli`]: `foundryctl` over the remote command runner, with `make_*`
//!   functions per entity type
//! - [`api`]: the JSON API, schema-driven via [`ApiCreate`]
//! - [`ui`]: the web interface, driven through compiled browser steps
//!
//! Backends differ only in [`CreateBackend::prepare`] and
//! [`CreateBackend::submit`]; everything else is shared.

pub mod api;
pub mod cli;
pub mod error;
pub mod protocol;
mod side_channel;
pub mod ui;

pub use api::{ApiBackend, ApiCreate};
pub use cli::CliBackend;
pub use error::{FactoryError, Result};
pub use protocol::{create, unwrap_payload, validate_required, CreateBackend, ProtocolOptions, Submission};
pub use ui::UiBackend;
