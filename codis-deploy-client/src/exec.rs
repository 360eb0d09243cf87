//! Exec-related API endpoints

use crate::DockerClient;
use crate::error::{ClientError, Result};
use crate::stream::decode_output;
use codis_deploy_core::domain::exec::{ExecOutput, ExecSpec, ExecStatus};
use codis_deploy_core::dto::exec::{
    CreateExecRequest, CreateExecResponse, InspectExecResponse, StartExecRequest,
};
use tracing::debug;

impl DockerClient {
    // =============================================================================
    // Exec
    // =============================================================================

    /// Create an exec instance in a running container
    ///
    /// # Arguments
    /// * `container_id` - Container ID or name
    /// * `spec` - Command and attach/tty flags
    ///
    /// # Returns
    /// The exec ID
    pub async fn create_exec(&self, container_id: &str, spec: &ExecSpec) -> Result<String> {
        Self::require("container id", container_id)?;
        if spec.cmd.is_empty() {
            return Err(ClientError::InvalidRequest("exec command cannot be empty".to_string()));
        }
        let url = self.url(&format!("/containers/{}/exec", container_id));
        debug!("POST {} cmd={:?}", url, spec.cmd);
        let response = self
            .short(self.client.post(&url))
            .json(&CreateExecRequest::from(spec))
            .send()
            .await?;

        let created: CreateExecResponse = self.handle_response(response).await?;
        Ok(created.id)
    }

    /// Start an exec instance
    ///
    /// Detached execs return as soon as the process is launched. Attached
    /// execs stream output until the process exits; the stream is read to the
    /// end and decoded within the attach timeout.
    ///
    /// # Returns
    /// The captured output for attached execs, `None` for detached ones
    pub async fn start_exec(&self, exec_id: &str, spec: &ExecSpec) -> Result<Option<ExecOutput>> {
        Self::require("exec id", exec_id)?;
        let url = self.url(&format!("/exec/{}/start", exec_id));
        debug!("POST {} attach={} tty={}", url, spec.attach, spec.tty);

        let request = self.client.post(&url).json(&StartExecRequest::from(spec));
        let response = if spec.attach {
            request.timeout(self.attach_timeout)
        } else {
            self.short(request)
        }
        .send()
        .await?;

        if !spec.attach {
            self.handle_empty_response(response).await?;
            return Ok(None);
        }

        let body = self.handle_bytes_response(response).await?;
        Ok(Some(decode_output(&body, spec.tty)))
    }

    /// Inspect an exec instance
    ///
    /// # Returns
    /// Whether the process is running and, once finished, its exit code
    pub async fn inspect_exec(&self, exec_id: &str) -> Result<ExecStatus> {
        Self::require("exec id", exec_id)?;
        let url = self.url(&format!("/exec/{}/json", exec_id));
        debug!("GET {}", url);
        let response = self.short(self.client.get(&url)).send().await?;

        let inspected: InspectExecResponse = self.handle_response(response).await?;
        Ok(inspected.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_attached_exec_stream_is_bounded() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Answer with chunked headers, then never send a body
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/vnd.docker.raw-stream\r\nTransfer-Encoding: chunked\r\n\r\n",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = DockerClient::new(format!("http://{}", addr))
            .with_attach_timeout(Duration::from_millis(200));
        let spec = ExecSpec::attached(["/codis/bin/codis-config", "slot", "init"]);

        let result = tokio::time::timeout(Duration::from_secs(5), client.start_exec("e1", &spec))
            .await
            .expect("attached start_exec was not bounded by the attach timeout");

        match result {
            Err(ClientError::RequestFailed(e)) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }
}
