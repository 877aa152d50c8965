//! Scripted transport doubles

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use ferrite_transport::{
    BrowserDriver, CommandOutput, CommandRunner, FileTransfer, Result, TransportError, UiStep,
};

/// Command runner replaying a fixed sequence of outputs and recording every
/// command it was asked to run.
pub struct ScriptedRunner {
    responses: RefCell<VecDeque<CommandOutput>>,
    commands: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(responses: Vec<CommandOutput>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            commands: RefCell::new(Vec::new()),
        }
    }

    /// A runner that answers every command with the same successful JSON
    /// output.
    pub fn succeeding(stdout: &str) -> Self {
        Self::new(vec![CommandOutput {
            return_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }])
    }

    /// A runner that answers every command with a failure.
    pub fn failing(return_code: i32, stderr: &str) -> Self {
        Self::new(vec![CommandOutput {
            return_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }])
    }

    /// Commands issued so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        self.commands.borrow_mut().push(command.to_string());
        let mut responses = self.responses.borrow_mut();
        match responses.pop_front() {
            Some(output) => {
                // The last response keeps answering, so one-response scripts
                // cover any number of commands.
                if responses.is_empty() {
                    responses.push_back(output.clone());
                }
                Ok(output)
            }
            None => Err(TransportError::Io(std::io::Error::other(
                "scripted runner has no responses",
            ))),
        }
    }
}

/// File transfer that accepts every upload without copying anything.
pub struct NullTransfer;

impl FileTransfer for NullTransfer {
    fn upload(&self, _local: &Path, _remote: &str) -> Result<()> {
        Ok(())
    }
}

/// File transfer recording each upload's local and remote path.
#[derive(Default)]
pub struct RecordingTransfer {
    uploads: RefCell<Vec<(PathBuf, String)>>,
}

impl RecordingTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        self.uploads.borrow().clone()
    }
}

impl FileTransfer for RecordingTransfer {
    fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        self.uploads
            .borrow_mut()
            .push((local.to_path_buf(), remote.to_string()));
        Ok(())
    }
}

/// Browser driver recording each step list it was asked to run.
pub struct ScriptedDriver {
    runs: RefCell<Vec<Vec<UiStep>>>,
    failure: Option<String>,
}

impl ScriptedDriver {
    pub fn succeeding() -> Self {
        Self {
            runs: RefCell::new(Vec::new()),
            failure: None,
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            runs: RefCell::new(Vec::new()),
            failure: Some(detail.to_string()),
        }
    }

    pub fn runs(&self) -> Vec<Vec<UiStep>> {
        self.runs.borrow().clone()
    }
}

impl BrowserDriver for ScriptedDriver {
    fn run(&self, steps: &[UiStep]) -> Result<()> {
        self.runs.borrow_mut().push(steps.to_vec());
        match &self.failure {
            Some(detail) => Err(TransportError::Browser(detail.clone())),
            None => Ok(()),
        }
    }
}
