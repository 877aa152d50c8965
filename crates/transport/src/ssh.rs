//! Remote command execution and file transfer
//!
//! The management CLI on the server is driven over a remote shell: one
//! blocking round trip per command. Both capabilities are traits so the
//! factory layer can be exercised against scripted fakes.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tracing::debug;

use crate::config::HarnessConfig;
use crate::error::{Result, TransportError};

/// Outcome of one remote command round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }

    /// Parse stdout as JSON (the management CLI is always invoked with its
    /// structured output flag).
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}

/// Run one command on the remote host, blocking until it finishes.
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Copy a local file to a path on the remote host.
pub trait FileTransfer {
    fn upload(&self, local: &Path, remote: &str) -> Result<()>;
}

/// Command runner shelling out to the `ssh` binary.
pub struct SshRunner {
    config: &'static HarnessConfig,
}

impl SshRunner {
    pub fn new(config: &'static HarnessConfig) -> Self {
        Self { config }
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
        ];
        if let Some(key) = &self.config.server.ssh_key_path {
            args.push("-i".to_string());
            args.push(key.display().to_string());
        }
        args
    }
}

impl CommandRunner for SshRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        debug!(target = %self.config.ssh_target(), %command, "running remote command");
        let output = Command::new("ssh")
            .args(self.base_args())
            .arg(self.config.ssh_target())
            .arg(command)
            .output()
            .map_err(|e| TransportError::Spawn {
                program: "ssh".to_string(),
                source: e,
            })?;
        Ok(CommandOutput {
            return_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8(output.stdout)
                .map_err(|_| TransportError::NonUtf8Output)?,
            stderr: String::from_utf8(output.stderr)
                .map_err(|_| TransportError::NonUtf8Output)?,
        })
    }
}

/// File transfer shelling out to the `scp` binary.
pub struct ScpTransfer {
    config: &'static HarnessConfig,
}

impl ScpTransfer {
    pub fn new(config: &'static HarnessConfig) -> Self {
        Self { config }
    }
}

impl FileTransfer for ScpTransfer {
    fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        debug!(local = %local.display(), %remote, "uploading file");
        let mut cmd = Command::new("scp");
        cmd.arg("-o").arg("BatchMode=yes");
        cmd.arg("-o").arg("StrictHostKeyChecking=no");
        if let Some(key) = &self.config.server.ssh_key_path {
            cmd.arg("-i").arg(key);
        }
        let output = cmd
            .arg(local)
            .arg(format!("{}:{}", self.config.ssh_target(), remote))
            .output()
            .map_err(|e| TransportError::Spawn {
                program: "scp".to_string(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(TransportError::UploadFailed {
                local: local.to_path_buf(),
                remote: remote.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_json_parses_object() {
        let output = CommandOutput {
            return_code: 0,
            stdout: r#"{"id": 7, "name": "acme"}"#.to_string(),
            stderr: String::new(),
        };
        let value = output.json().unwrap();
        assert_eq!(value["id"], 7);
        assert!(output.success());
    }

    #[test]
    fn test_output_json_parses_list() {
        let output = CommandOutput {
            return_code: 0,
            stdout: r#"[{"id": 7}]"#.to_string(),
            stderr: String::new(),
        };
        assert!(output.json().unwrap().is_array());
    }

    #[test]
    fn test_output_json_rejects_garbage() {
        let output = CommandOutput {
            return_code: 0,
            stdout: "not json".to_string(),
            stderr: String::new(),
        };
        assert!(output.json().is_err());
    }
}
