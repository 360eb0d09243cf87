//! Container-related API endpoints

use crate::DockerClient;
use crate::error::Result;
use codis_deploy_core::domain::container::ContainerSpec;
use codis_deploy_core::domain::inspect::ContainerInfo;
use codis_deploy_core::dto::container::{
    CreateContainerRequest, CreateContainerResponse, InspectContainerResponse,
};
use tracing::{debug, warn};

impl DockerClient {
    // =============================================================================
    // Container Lifecycle
    // =============================================================================

    /// Create a container
    ///
    /// Fails with a 409 API error if a container with the same name exists.
    ///
    /// # Arguments
    /// * `spec` - Name, image, network mode, port bindings and labels
    ///
    /// # Returns
    /// The new container ID
    pub async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        Self::require("container name", &spec.name)?;
        Self::require("image", &spec.image)?;
        let url = self.url("/containers/create");
        debug!("POST {} name={} image={}", url, spec.name, spec.image);

        let response = self
            .short(self.client.post(&url))
            .query(&[("name", spec.name.as_str())])
            .json(&CreateContainerRequest::from(spec))
            .send()
            .await?;

        let created: CreateContainerResponse = self.handle_response(response).await?;
        for warning in created.warnings.iter().flatten() {
            warn!("Container {}: {}", spec.name, warning);
        }

        Ok(created.id)
    }

    /// Start a created container
    ///
    /// # Arguments
    /// * `id` - Container ID or name
    pub async fn start_container(&self, id: &str) -> Result<()> {
        Self::require("container id", id)?;
        let url = self.url(&format!("/containers/{}/start", id));
        debug!("POST {}", url);
        let response = self.short(self.client.post(&url)).send().await?;

        self.handle_empty_response(response).await
    }

    /// Inspect a container
    ///
    /// # Arguments
    /// * `id` - Container ID or name
    ///
    /// # Returns
    /// A snapshot of the container's state, node and port bindings
    pub async fn inspect_container(&self, id: &str) -> Result<ContainerInfo> {
        Self::require("container id", id)?;
        let url = self.url(&format!("/containers/{}/json", id));
        debug!("GET {}", url);
        let response = self.short(self.client.get(&url)).send().await?;

        let inspected: InspectContainerResponse = self.handle_response(response).await?;
        Ok(inspected.into())
    }

    /// Remove a container together with its anonymous volumes
    ///
    /// # Arguments
    /// * `id` - Container ID or name
    /// * `force` - Kill the container first if it is running
    pub async fn remove_container(&self, id: &str, force: bool) -> Result<()> {
        Self::require("container id", id)?;
        let url = self.url(&format!("/containers/{}", id));
        debug!("DELETE {} force={}", url, force);
        let force = if force { "true" } else { "false" };
        let response = self
            .short(self.client.delete(&url))
            .query(&[("force", force), ("v", "true")])
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
