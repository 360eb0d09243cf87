//! System API endpoints

use crate::DockerClient;
use crate::error::{ClientError, Result};
use tracing::debug;

impl DockerClient {
    /// Check that the endpoint answers
    ///
    /// The engine replies `OK` with status 200.
    pub async fn ping(&self) -> Result<()> {
        let url = self.url("/_ping");
        debug!("GET {}", url);
        let response = self.short(self.client.get(&url)).send().await?;

        let body = self.handle_bytes_response(response).await?;
        let body = String::from_utf8_lossy(&body);
        if body.trim() != "OK" {
            return Err(ClientError::ParseError(format!(
                "Unexpected ping response: {}",
                body.trim()
            )));
        }

        Ok(())
    }
}
