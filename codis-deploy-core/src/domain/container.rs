//! Container domain model
//!
//! Describes a container to be created: its name, image, network mode,
//! published ports and labels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Label carrying the role of a container in the deployment
pub const ROLE_LABEL: &str = "codis-deploy.role";

/// Label carrying the id of the run that created a container
pub const RUN_ID_LABEL: &str = "codis-deploy.run-id";

/// Builds the Docker port key for a TCP port (e.g. `6379/tcp`)
pub fn port_key(port: u16) -> String {
    format!("{}/tcp", port)
}

/// A host address a container port is published on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    /// Host interface (e.g. "0.0.0.0")
    pub host_ip: String,

    /// Host port
    pub host_port: u16,
}

impl PortBinding {
    /// Creates a binding on the given host interface and port
    pub fn new(host_ip: impl Into<String>, host_port: u16) -> Self {
        Self {
            host_ip: host_ip.into(),
            host_port,
        }
    }

    /// Whether the binding listens on every interface rather than a concrete address
    pub fn is_unspecified(&self) -> bool {
        self.host_ip.is_empty() || self.host_ip == "0.0.0.0" || self.host_ip == "::"
    }
}

/// Port bindings keyed by container port key (`"6379/tcp"`)
pub type PortMap = BTreeMap<String, Vec<PortBinding>>;

/// Role a container plays in the deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerRole {
    /// The Redis-compatible codis-server
    DataNode,

    /// The codis proxy, dashboard and embedded etcd
    Proxy,
}

impl ContainerRole {
    /// Label value for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerRole::DataNode => "data-node",
            ContainerRole::Proxy => "proxy",
        }
    }
}

impl std::fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A container to be created through the container API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Container name; creation fails if it is already taken
    pub name: String,

    /// Fully qualified image reference (registry/repository[:tag])
    pub image: String,

    /// Docker network mode (e.g. "bridge")
    pub network_mode: String,

    /// Published ports
    pub ports: PortMap,

    /// Container labels
    pub labels: BTreeMap<String, String>,
}

impl ContainerSpec {
    /// Creates a spec on the bridge network with no ports or labels
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            network_mode: "bridge".to_string(),
            ports: PortMap::new(),
            labels: BTreeMap::new(),
        }
    }

    /// Publishes a container TCP port on the given host interface and port
    pub fn with_port(mut self, container_port: u16, host_ip: &str, host_port: u16) -> Self {
        self.ports
            .entry(port_key(container_port))
            .or_default()
            .push(PortBinding::new(host_ip, host_port));
        self
    }

    /// Adds a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Tags the container with its role and the run that creates it
    pub fn with_deployment_labels(self, role: ContainerRole, run_id: Uuid) -> Self {
        self.with_label(ROLE_LABEL, role.as_str())
            .with_label(RUN_ID_LABEL, run_id.to_string())
    }

    /// Image name split into (repository, tag); the tag defaults to `latest`
    ///
    /// A colon that belongs to a registry port (`host:5000/redis`) is not a tag separator.
    pub fn image_reference(&self) -> (&str, &str) {
        split_image_reference(&self.image)
    }
}

/// Splits `registry:port/repo:tag` into (`registry:port/repo`, `tag`)
pub fn split_image_reference(image: &str) -> (&str, &str) {
    let last_slash = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[last_slash..].rfind(':') {
        Some(idx) => {
            let split = last_slash + idx;
            (&image[..split], &image[split + 1..])
        }
        None => (image, "latest"),
    }
}
