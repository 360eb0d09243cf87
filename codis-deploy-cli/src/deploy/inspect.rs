//! Deployment status
//!
//! Looks up both containers by name and derives the addresses clients use.

use anyhow::{Context, Result};
use codis_deploy_client::ContainerApi;
use codis_deploy_core::domain::container::ContainerRole;
use codis_deploy_core::domain::inspect::ContainerInfo;

use crate::config::Config;

/// One container of the deployment, if it exists
#[derive(Debug, Clone)]
pub struct DeployedContainer {
    pub role: ContainerRole,
    pub name: String,
    pub info: Option<ContainerInfo>,
}

/// A named address exposed by the deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub address: Option<String>,
}

/// Inspects the data node and proxy containers by name
///
/// A container that does not exist is returned with `info: None`.
pub async fn inspect_deployment(
    api: &dyn ContainerApi,
    config: &Config,
) -> Result<Vec<DeployedContainer>> {
    let mut deployed = Vec::new();
    for (role, name) in [
        (ContainerRole::DataNode, &config.data_node.name),
        (ContainerRole::Proxy, &config.proxy.name),
    ] {
        let info = match api.inspect_container(name).await {
            Ok(info) => Some(info),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e).with_context(|| format!("Failed to inspect {}", name)),
        };
        deployed.push(DeployedContainer {
            role,
            name: name.clone(),
            info,
        });
    }
    Ok(deployed)
}

/// Client, admin and dashboard addresses of a proxy container
pub fn proxy_endpoints(config: &Config, proxy: &ContainerInfo, fallback_host: &str) -> Vec<Endpoint> {
    [
        ("proxy", config.proxy.proxy_port.container),
        ("admin", config.proxy.admin_port.container),
        ("dashboard", config.proxy.dashboard_port.container),
    ]
    .into_iter()
    .map(|(name, port)| Endpoint {
        name,
        address: proxy.published_address(port, fallback_host),
    })
    .collect()
}
