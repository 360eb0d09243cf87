//! Teardown
//!
//! Force-removes the deployment's containers by name, proxy first.

use anyhow::Result;
use codis_deploy_client::ContainerApi;
use tracing::{info, warn};

use crate::config::Config;

/// What a teardown did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Containers that were removed
    pub removed: Vec<String>,

    /// Containers that did not exist
    pub missing: Vec<String>,
}

/// Removes the proxy and data node containers
///
/// Missing containers are skipped. Other failures do not stop the second
/// removal but make the whole teardown fail.
pub async fn teardown(api: &dyn ContainerApi, config: &Config) -> Result<TeardownReport> {
    let mut report = TeardownReport::default();
    let mut failures = Vec::new();

    for name in [&config.proxy.name, &config.data_node.name] {
        match api.remove_container(name).await {
            Ok(()) => {
                info!("Removed container {}", name);
                report.removed.push(name.clone());
            }
            Err(e) if e.is_not_found() => {
                info!("Container {} does not exist", name);
                report.missing.push(name.clone());
            }
            Err(e) => {
                warn!("Failed to remove container {}: {}", name, e);
                failures.push(format!("{}: {}", name, e));
            }
        }
    }

    if !failures.is_empty() {
        anyhow::bail!("Failed to remove containers: {}", failures.join("; "));
    }

    Ok(report)
}
