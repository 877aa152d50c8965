//! Harness configuration
//!
//! One TOML file describes the server under test; `FERRITE_*` environment
//! variables override individual settings. The configuration is read once at
//! startup and treated as read-only for the rest of the process.

use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// The server under test
    pub server: ServerSettings,

    /// Browser automation settings
    pub browser: BrowserSettings,

    /// Seconds to wait after a successful creation for asynchronous
    /// server-side indexing to catch up.
    pub propagation_delay_secs: u64,
}

/// Connection details for the Foundry server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub hostname: String,
    pub scheme: String,
    pub api_user: String,
    pub api_password: String,
    pub ssh_user: String,
    pub ssh_key_path: Option<PathBuf>,
}

/// Browser automation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    pub browser: String,
    pub headless: bool,
    pub screenshot_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                hostname: "foundry.example.com".to_string(),
                scheme: "https".to_string(),
                api_user: "admin".to_string(),
                api_password: "changeme".to_string(),
                ssh_user: "root".to_string(),
                ssh_key_path: None,
            },
            browser: BrowserSettings {
                browser: "chromium".to_string(),
                headless: true,
                screenshot_dir: PathBuf::from("test-results/screenshots"),
            },
            propagation_delay_secs: 5,
        }
    }
}

static GLOBAL: OnceCell<HarnessConfig> = OnceCell::new();

impl HarnessConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| TransportError::InvalidConfig(e.to_string()))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `FERRITE_*` environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(hostname) = std::env::var("FERRITE_HOSTNAME") {
            self.server.hostname = hostname;
        }
        if let Ok(user) = std::env::var("FERRITE_API_USER") {
            self.server.api_user = user;
        }
        if let Ok(password) = std::env::var("FERRITE_API_PASSWORD") {
            self.server.api_password = password;
        }
        if let Ok(user) = std::env::var("FERRITE_SSH_USER") {
            self.server.ssh_user = user;
        }
        if let Ok(key) = std::env::var("FERRITE_SSH_KEY") {
            self.server.ssh_key_path = Some(PathBuf::from(key));
        }
    }

    /// Install this configuration as the process-wide one. Later calls are
    /// ignored; the first installed configuration wins.
    pub fn install(self) -> &'static HarnessConfig {
        GLOBAL.get_or_init(|| self)
    }

    /// The process-wide configuration, initialized from defaults plus
    /// environment overrides if nothing was installed explicitly.
    pub fn global() -> &'static HarnessConfig {
        GLOBAL.get_or_init(|| {
            let mut config = Self::default();
            config.apply_env();
            config
        })
    }

    /// Base URL of the server's API.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.server.scheme, self.server.hostname)
    }

    /// SSH target in `user@host` form.
    pub fn ssh_target(&self) -> String {
        format!("{}@{}", self.server.ssh_user, self.server.hostname)
    }

    pub fn propagation_delay(&self) -> Duration {
        Duration::from_secs(self.propagation_delay_secs)
    }
}
