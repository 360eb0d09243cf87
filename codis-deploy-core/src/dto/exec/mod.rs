//! Exec DTOs
//!
//! Bodies for `POST /containers/{id}/exec`, `POST /exec/{id}/start` and
//! `GET /exec/{id}/json`.

use serde::{Deserialize, Serialize};

use crate::domain::exec::{ExecSpec, ExecStatus};

/// Request body for `POST /containers/{id}/exec`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateExecRequest {
    pub attach_stdin: bool,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    pub tty: bool,
    pub cmd: Vec<String>,
}

impl From<&ExecSpec> for CreateExecRequest {
    fn from(spec: &ExecSpec) -> Self {
        CreateExecRequest {
            attach_stdin: false,
            attach_stdout: spec.attach,
            attach_stderr: spec.attach,
            tty: spec.tty,
            cmd: spec.cmd.clone(),
        }
    }
}

/// Response body for `POST /containers/{id}/exec`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateExecResponse {
    pub id: String,
}

/// Request body for `POST /exec/{id}/start`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartExecRequest {
    pub detach: bool,
    pub tty: bool,
}

impl From<&ExecSpec> for StartExecRequest {
    fn from(spec: &ExecSpec) -> Self {
        StartExecRequest {
            detach: !spec.attach,
            tty: spec.tty,
        }
    }
}

/// Response body for `GET /exec/{id}/json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InspectExecResponse {
    #[serde(rename = "ID")]
    pub id: String,
    pub running: bool,
    /// Null while the process is still running
    pub exit_code: Option<i64>,
    pub pid: i64,
}

impl From<InspectExecResponse> for ExecStatus {
    fn from(resp: InspectExecResponse) -> Self {
        ExecStatus {
            running: resp.running,
            exit_code: if resp.running { None } else { resp.exit_code },
            pid: resp.pid,
        }
    }
}
