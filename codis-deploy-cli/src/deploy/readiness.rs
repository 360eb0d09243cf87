//! Readiness probes
//!
//! Each wait polls on a fixed interval until its condition holds or the
//! deadline passes.

use codis_deploy_client::ContainerApi;
use codis_deploy_core::domain::exec::ExecStatus;
use codis_deploy_core::domain::inspect::ContainerInfo;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};
use tracing::debug;

use super::error::StepFailure;
use crate::config::Config;

/// Polling parameters shared by all probes
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub daemon_grace: Duration,
}

impl From<&Config> for Timing {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval,
            timeout: config.ready_timeout,
            daemon_grace: config.daemon_grace,
        }
    }
}

/// Waits until the container reports running
///
/// Fails at once if the container is seen exited or dead.
pub async fn wait_running(
    api: &dyn ContainerApi,
    container_id: &str,
    timing: &Timing,
) -> Result<ContainerInfo, StepFailure> {
    let deadline = Instant::now() + timing.timeout;
    loop {
        let info = api.inspect_container(container_id).await?;
        if info.state.running {
            return Ok(info);
        }
        if info.state.has_stopped() {
            return Err(StepFailure::ContainerStopped {
                status: info.state.status,
                exit_code: info.state.exit_code,
            });
        }
        debug!("Container {} is {}, waiting", container_id, info.state.status);

        if Instant::now() >= deadline {
            return Err(StepFailure::NotReady {
                what: format!("container {}", container_id),
                waited: timing.timeout,
            });
        }
        sleep(timing.poll_interval).await;
    }
}

/// Waits until an exec instance has finished and returns its final status
pub async fn wait_exec_finished(
    api: &dyn ContainerApi,
    exec_id: &str,
    timing: &Timing,
) -> Result<ExecStatus, StepFailure> {
    let deadline = Instant::now() + timing.timeout;
    loop {
        let status = api.inspect_exec(exec_id).await?;
        if !status.running {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            return Err(StepFailure::NotReady {
                what: format!("exec {}", exec_id),
                waited: timing.timeout,
            });
        }
        sleep(timing.poll_interval).await;
    }
}

/// Checks that a background exec keeps running for the whole grace period
pub async fn wait_exec_stays_up(
    api: &dyn ContainerApi,
    exec_id: &str,
    timing: &Timing,
) -> Result<(), StepFailure> {
    let settled_at = Instant::now() + timing.daemon_grace;
    loop {
        let status = api.inspect_exec(exec_id).await?;
        if !status.running {
            return Err(StepFailure::ExitedEarly {
                code: status.exit_code,
            });
        }
        if Instant::now() >= settled_at {
            return Ok(());
        }
        sleep(timing.poll_interval).await;
    }
}

/// Waits until a TCP address accepts connections
pub async fn wait_tcp(addr: &str, timing: &Timing) -> Result<(), StepFailure> {
    let deadline = Instant::now() + timing.timeout;
    let attempt_timeout = timing.poll_interval.max(Duration::from_millis(500));
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match timeout(attempt_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => {
                debug!("{} accepted a connection after {} attempt(s)", addr, attempts);
                return Ok(());
            }
            Ok(Err(e)) => debug!("{} not reachable yet: {}", addr, e),
            Err(_) => debug!("{} connect attempt timed out", addr),
        }

        if Instant::now() >= deadline {
            return Err(StepFailure::NotReady {
                what: format!("port {}", addr),
                waited: timing.timeout,
            });
        }
        sleep(timing.poll_interval).await;
    }
}
