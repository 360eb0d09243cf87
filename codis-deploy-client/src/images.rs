//! Image-related API endpoints

use crate::DockerClient;
use crate::error::{ClientError, Result};
use codis_deploy_core::domain::container::split_image_reference;
use codis_deploy_core::dto::image::summarize_pull;
use tracing::{debug, info};

impl DockerClient {
    // =============================================================================
    // Image Management
    // =============================================================================

    /// Pull an image from its registry
    ///
    /// Waits for the pull to finish. The engine reports pull failures inside
    /// the progress stream, so the whole stream is read and checked.
    ///
    /// # Arguments
    /// * `image` - Image reference (e.g., "192.168.156.200:5000/redis" or "redis:7")
    ///
    /// # Returns
    /// The final status line reported by the engine, if any
    pub async fn pull_image(&self, image: &str) -> Result<Option<String>> {
        let (repository, tag) = split_image_reference(image);
        let url = self.url("/images/create");
        debug!("POST {} fromImage={} tag={}", url, repository, tag);

        let response = self
            .client
            .post(&url)
            .query(&[("fromImage", repository), ("tag", tag)])
            .send()
            .await?;

        let body = self.handle_bytes_response(response).await?;
        let status = summarize_pull(&String::from_utf8_lossy(&body)).map_err(ClientError::Stream)?;

        info!("Pulled image {}:{}", repository, tag);
        Ok(status)
    }
}
