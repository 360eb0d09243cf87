//! Deployment errors
//!
//! Every failure is tagged with the phase and step it happened in, so the
//! message names exactly which call in the sequence failed.

use codis_deploy_client::ClientError;
use std::time::Duration;
use thiserror::Error;

use super::plan::Step;

/// Half of the deployment a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Checks made before anything is created
    Preflight,

    /// The codis-server container
    DataNode,

    /// The proxy container
    Proxy,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Preflight => write!(f, "preflight"),
            Phase::DataNode => write!(f, "data-node"),
            Phase::Proxy => write!(f, "proxy"),
        }
    }
}

/// Why a single step failed
#[derive(Debug, Error)]
pub enum StepFailure {
    /// The container API call failed
    #[error(transparent)]
    Api(#[from] ClientError),

    /// A one-shot command finished with a non-zero exit code
    #[error("command exited with code {code}: {output}")]
    CommandFailed { code: i64, output: String },

    /// A background process died before it was considered started
    #[error("process exited early with code {code:?}")]
    ExitedEarly { code: Option<i64> },

    /// The container stopped while waiting for it to run
    #[error("container is {status} (exit code {exit_code})")]
    ContainerStopped { status: String, exit_code: i64 },

    /// A readiness condition did not hold within the timeout
    #[error("{what} not ready after {waited:?}")]
    NotReady { what: String, waited: Duration },

    /// Inspection did not report a published binding for a port
    #[error("no published binding for port {0}/tcp")]
    MissingBinding(u16),
}

/// A deployment failure at a specific step
#[derive(Debug, Error)]
#[error("{phase}: ERR on {}: {source}", .step.label())]
pub struct BootstrapError {
    pub phase: Phase,
    pub step: Step,
    #[source]
    pub source: StepFailure,
}

impl BootstrapError {
    pub fn new(phase: Phase, step: Step, source: impl Into<StepFailure>) -> Self {
        Self {
            phase,
            step,
            source: source.into(),
        }
    }

    /// Whether the failure was a name clash with an existing container
    pub fn is_conflict(&self) -> bool {
        matches!(&self.source, StepFailure::Api(err) if err.is_conflict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_step() {
        let err = BootstrapError::new(
            Phase::Proxy,
            Step::SlotInit,
            StepFailure::CommandFailed {
                code: 1,
                output: "etcd unreachable".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "proxy: ERR on exec3: command exited with code 1: etcd unreachable"
        );
    }

    #[test]
    fn test_conflict_detection() {
        let err = BootstrapError::new(
            Phase::DataNode,
            Step::Create,
            ClientError::api_error(409, "name in use"),
        );
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "data-node: ERR on create: API error (status 409): name in use");
    }
}
