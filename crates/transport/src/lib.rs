//! Ferrite transport layer
//!
//! The three ways the harness reaches the server under test, plus the shared
//! configuration:
//!
//! - [`ssh`]: remote command execution and file transfer (one blocking
//!   round trip per call)
//! - [`http`]: blocking JSON API client
//! - [`browser`]: Playwright-driven UI session
//! - [`config`]: TOML + environment configuration, read-only after init

pub mod browser;
pub mod config;
pub mod error;
pub mod http;
pub mod ssh;

pub use browser::{BrowserDriver, BrowserSession, UiStep};
pub use config::HarnessConfig;
pub use error::{Result, TransportError};
pub use http::{ApiClient, ApiResponse};
pub use ssh::{CommandOutput, CommandRunner, FileTransfer, ScpTransfer, SshRunner};
