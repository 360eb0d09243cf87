//! Exec domain model
//!
//! A command run inside an existing container, and what comes back from it.

use serde::{Deserialize, Serialize};

/// A command to execute inside a running container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecSpec {
    /// Command and arguments
    pub cmd: Vec<String>,

    /// Attach stdout/stderr and wait for the command to finish
    pub attach: bool,

    /// Allocate a pseudo-TTY (output is then a raw, unframed stream)
    pub tty: bool,
}

impl ExecSpec {
    /// A command started in the background; the call returns once it is launched
    pub fn detached<I, S>(cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: cmd.into_iter().map(Into::into).collect(),
            attach: false,
            tty: false,
        }
    }

    /// A command whose output is collected until it exits
    pub fn attached<I, S>(cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: cmd.into_iter().map(Into::into).collect(),
            attach: true,
            tty: false,
        }
    }

    /// Allocates a TTY for the command
    pub fn with_tty(mut self) -> Self {
        self.tty = true;
        self
    }

    /// Command rendered as a single shell-like line, for logs
    pub fn display(&self) -> String {
        self.cmd.join(" ")
    }
}

/// Output captured from an attached exec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// Stdout followed by stderr, trimmed
    pub fn combined(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        let err = self.stderr.trim_end();
        if !err.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(err);
        }
        out
    }
}

/// State of an exec instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecStatus {
    pub running: bool,

    /// Exit code, known once the process has finished
    pub exit_code: Option<i64>,

    pub pid: i64,
}

impl ExecStatus {
    /// Whether the process finished with exit code 0
    pub fn succeeded(&self) -> bool {
        !self.running && self.exit_code == Some(0)
    }
}
