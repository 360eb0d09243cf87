//! Bootstrap sequencer
//!
//! Brings up the data node, reads back its published address, then brings up
//! the proxy container and runs the codis setup commands inside it. Steps run
//! strictly in order; the first failure stops the sequence.

use codis_deploy_client::ContainerApi;
use codis_deploy_core::domain::container::ContainerSpec;
use codis_deploy_core::domain::exec::ExecOutput;
use codis_deploy_core::domain::inspect::ContainerInfo;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{BootstrapError, Phase, StepFailure};
use super::plan::{self, PlannedExec, Readiness, Step};
use super::readiness::{self, Timing};
use crate::config::Config;

/// Result of a successful deployment
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Id shared by the labels of both containers
    pub run_id: Uuid,

    /// Data node container as inspected after start
    pub data_node: ContainerInfo,

    /// `<node-host>:<published-port>` of the data node
    pub data_node_addr: String,

    /// Proxy container as inspected after start
    pub proxy: ContainerInfo,

    /// Response of the slot initialization command
    pub slot_init_output: Option<String>,
}

/// Runs the deployment sequence against a container API
pub struct Bootstrapper {
    api: Arc<dyn ContainerApi>,
    config: Config,
    timing: Timing,
    run_id: Uuid,

    /// Containers created by this run, in creation order
    created: Vec<String>,
}

impl Bootstrapper {
    /// Creates a bootstrapper with a fresh run id
    pub fn new(api: Arc<dyn ContainerApi>, config: Config) -> Self {
        let timing = Timing::from(&config);
        Self {
            api,
            config,
            timing,
            run_id: Uuid::new_v4(),
            created: Vec::new(),
        }
    }

    /// Runs the whole sequence
    ///
    /// On failure, containers created by this run are removed only when
    /// `rollback_on_failure` is set; otherwise they are left for inspection.
    pub async fn run(mut self) -> Result<Deployment, BootstrapError> {
        match self.sequence().await {
            Ok(deployment) => Ok(deployment),
            Err(err) => {
                if self.config.rollback_on_failure {
                    self.rollback().await;
                } else if !self.created.is_empty() {
                    warn!(
                        "Leaving {} container(s) from the failed run in place",
                        self.created.len()
                    );
                }
                Err(err)
            }
        }
    }

    async fn sequence(&mut self) -> Result<Deployment, BootstrapError> {
        info!("Starting deployment run {}", self.run_id);

        self.api
            .ping()
            .await
            .map_err(|e| BootstrapError::new(Phase::Preflight, Step::Ping, e))?;

        let (data_node, data_node_addr) = self.run_data_node().await?;
        info!("Data node reachable at {}", data_node_addr);

        let (proxy, slot_init_output) = self.run_proxy(&data_node_addr).await?;
        info!("Proxy container {} is online", proxy.id);

        Ok(Deployment {
            run_id: self.run_id,
            data_node,
            data_node_addr,
            proxy,
            slot_init_output,
        })
    }

    /// Creates and starts the data node, starts codis-server, and returns its address
    async fn run_data_node(&mut self) -> Result<(ContainerInfo, String), BootstrapError> {
        let phase = Phase::DataNode;
        let spec = plan::data_node_spec(&self.config, self.run_id);
        let started = self.launch(phase, &spec).await?;

        self.run_exec(phase, &started, &plan::data_node_exec(&self.config))
            .await?;

        let port = self.config.data_node.port.container;
        let info = self
            .api
            .inspect_container(&started.id)
            .await
            .map_err(|e| BootstrapError::new(phase, Step::Inspect, e))?;
        let addr = info
            .published_address(port, self.api.endpoint_host())
            .ok_or_else(|| BootstrapError::new(phase, Step::Inspect, StepFailure::MissingBinding(port)))?;

        Ok((info, addr))
    }

    /// Creates and starts the proxy container and runs the codis setup commands
    async fn run_proxy(
        &mut self,
        data_node_addr: &str,
    ) -> Result<(ContainerInfo, Option<String>), BootstrapError> {
        let phase = Phase::Proxy;
        let spec = plan::proxy_spec(&self.config, self.run_id);
        let proxy = self.launch(phase, &spec).await?;

        let mut slot_init_output = None;
        for planned in plan::proxy_execs(&self.config, data_node_addr) {
            let output = self.run_exec(phase, &proxy, &planned).await?;
            if planned.step == Step::SlotInit {
                slot_init_output = output.map(|o| o.combined());
            }
        }

        Ok((proxy, slot_init_output))
    }

    /// Pulls, creates and starts a container, then waits for it to run
    async fn launch(
        &mut self,
        phase: Phase,
        spec: &ContainerSpec,
    ) -> Result<ContainerInfo, BootstrapError> {
        if self.config.pull_images {
            info!("Pulling image {}", spec.image);
            self.api
                .pull_image(&spec.image)
                .await
                .map_err(|e| BootstrapError::new(phase, Step::Pull, e))?;
        }

        info!("Creating container {} from image {}", spec.name, spec.image);
        let id = self
            .api
            .create_container(spec)
            .await
            .map_err(|e| BootstrapError::new(phase, Step::Create, e))?;
        self.created.push(id.clone());

        self.api
            .start_container(&id)
            .await
            .map_err(|e| BootstrapError::new(phase, Step::Start, e))?;

        let info = readiness::wait_running(self.api.as_ref(), &id, &self.timing)
            .await
            .map_err(|e| BootstrapError::new(phase, Step::Start, e))?;
        info!("Container {} ({}) is running", spec.name, id);

        Ok(info)
    }

    /// Runs one command in a container and waits until it is ready
    async fn run_exec(
        &self,
        phase: Phase,
        container: &ContainerInfo,
        planned: &PlannedExec,
    ) -> Result<Option<ExecOutput>, BootstrapError> {
        let fail = |e: StepFailure| BootstrapError::new(phase, planned.step, e);
        let api = self.api.as_ref();

        info!("{}: {} in {}", planned.step.label(), planned.spec.display(), container.name);
        // Attached commands stream until they exit, so the call itself is bounded
        let handle = timeout(self.timing.timeout, api.exec(&container.id, &planned.spec))
            .await
            .map_err(|_| {
                fail(StepFailure::NotReady {
                    what: format!("command {}", planned.spec.display()),
                    waited: self.timing.timeout,
                })
            })?
            .map_err(|e| fail(e.into()))?;

        match planned.readiness {
            Readiness::Completes => {
                let status = readiness::wait_exec_finished(api, &handle.id, &self.timing)
                    .await
                    .map_err(fail)?;
                if !status.succeeded() {
                    let output = handle
                        .output
                        .as_ref()
                        .map(ExecOutput::combined)
                        .unwrap_or_default();
                    return Err(fail(StepFailure::CommandFailed {
                        code: status.exit_code.unwrap_or(-1),
                        output,
                    }));
                }
            }
            Readiness::StaysUp => {
                readiness::wait_exec_stays_up(api, &handle.id, &self.timing)
                    .await
                    .map_err(fail)?;
            }
            Readiness::Listens(port) => {
                let addr = container
                    .published_address(port, api.endpoint_host())
                    .ok_or_else(|| fail(StepFailure::MissingBinding(port)))?;
                debug!("Waiting for {} to accept connections", addr);
                readiness::wait_tcp(&addr, &self.timing).await.map_err(fail)?;
            }
        }

        Ok(handle.output)
    }

    /// Removes every container this run created, newest first
    async fn rollback(&self) {
        info!("Rolling back {} container(s)", self.created.len());
        for id in self.created.iter().rev() {
            match self.api.remove_container(id).await {
                Ok(()) => info!("Removed container {}", id),
                Err(e) => warn!("Failed to remove container {} during rollback: {}", id, e),
            }
        }
    }
}
