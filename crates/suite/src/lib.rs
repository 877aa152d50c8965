//! Ferrite scenario suite
//!
//! Scripted stand-ins for the transport layer, so factory scenarios can run
//! end to end without a server: a command runner that replays canned CLI
//! outputs, transfers that record instead of copying, and a browser driver
//! that records step lists. The scenarios themselves live under `tests/`.

pub mod doubles;

pub use doubles::{NullTransfer, RecordingTransfer, ScriptedDriver, ScriptedRunner};

/// Initialize tracing for a test run. Safe to call from every test; only the
/// first call installs the subscriber.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_test_writer()
        .try_init();
}
