//! Container API abstraction
//!
//! The deployment sequence talks to the container API through this trait so
//! it can run against the real engine or an in-memory fake.

use async_trait::async_trait;
use codis_deploy_core::domain::container::ContainerSpec;
use codis_deploy_core::domain::exec::{ExecOutput, ExecSpec, ExecStatus};
use codis_deploy_core::domain::inspect::ContainerInfo;

use crate::DockerClient;
use crate::error::Result;

/// A launched exec instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecHandle {
    /// Exec ID, usable with [`ContainerApi::inspect_exec`]
    pub id: String,

    /// Captured output for attached execs
    pub output: Option<ExecOutput>,
}

/// Operations the deployment needs from a container-management API
#[async_trait]
pub trait ContainerApi: Send + Sync {
    /// Host part of the API endpoint
    fn endpoint_host(&self) -> &str;

    /// Check that the endpoint answers
    async fn ping(&self) -> Result<()>;

    /// Pull an image from its registry
    async fn pull_image(&self, image: &str) -> Result<()>;

    /// Create a container and return its ID
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start a created container
    async fn start_container(&self, id: &str) -> Result<()>;

    /// Inspect a container by ID or name
    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo>;

    /// Force-remove a container by ID or name
    async fn remove_container(&self, id: &str) -> Result<()>;

    /// Create and start an exec instance in a running container
    async fn exec(&self, container_id: &str, spec: &ExecSpec) -> Result<ExecHandle>;

    /// Inspect an exec instance
    async fn inspect_exec(&self, exec_id: &str) -> Result<ExecStatus>;
}

#[async_trait]
impl ContainerApi for DockerClient {
    fn endpoint_host(&self) -> &str {
        DockerClient::endpoint_host(self)
    }

    async fn ping(&self) -> Result<()> {
        DockerClient::ping(self).await
    }

    async fn pull_image(&self, image: &str) -> Result<()> {
        DockerClient::pull_image(self, image).await.map(|_| ())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        DockerClient::create_container(self, spec).await
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        DockerClient::start_container(self, id).await
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo> {
        DockerClient::inspect_container(self, id).await
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        DockerClient::remove_container(self, id, true).await
    }

    async fn exec(&self, container_id: &str, spec: &ExecSpec) -> Result<ExecHandle> {
        let id = self.create_exec(container_id, spec).await?;
        let output = self.start_exec(&id, spec).await?;
        Ok(ExecHandle { id, output })
    }

    async fn inspect_exec(&self, exec_id: &str) -> Result<ExecStatus> {
        DockerClient::inspect_exec(self, exec_id).await
    }
}
