//! Container inspection snapshot
//!
//! Read-only view of a container as reported by the container API. Used to
//! compute addresses and check readiness, then discarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::container::{PortBinding, PortMap, ROLE_LABEL, RUN_ID_LABEL, port_key};

/// Swarm node a container was scheduled on
///
/// Only present when the endpoint is a (classic) Swarm manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub name: String,
    /// Node IP address reachable from outside the cluster
    pub ip: String,
}

/// Runtime state of a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerState {
    /// created, running, paused, restarting, removing, exited or dead
    pub status: String,
    pub running: bool,
    pub exit_code: i64,
    pub started_at: Option<DateTime<Utc>>,
}

impl ContainerState {
    /// Whether the container has stopped and will not become running on its own
    pub fn has_stopped(&self) -> bool {
        !self.running && matches!(self.status.as_str(), "exited" | "dead")
    }
}

/// Snapshot of an inspected container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub id: String,
    /// Container name without the leading slash
    pub name: String,
    /// Image reference the container was created from
    pub image: String,
    pub state: ContainerState,
    pub node: Option<NodeInfo>,
    /// Bindings requested at creation time
    pub port_bindings: PortMap,
    /// Bindings actually published by the engine
    pub published_ports: PortMap,
    pub labels: BTreeMap<String, String>,
}

impl ContainerInfo {
    /// First binding of a container TCP port
    ///
    /// The creation-time binding wins; the engine's published binding is used
    /// when the creation-time one left the host port to the engine.
    pub fn binding(&self, container_port: u16) -> Option<&PortBinding> {
        let key = port_key(container_port);
        self.port_bindings
            .get(&key)
            .and_then(|bindings| bindings.iter().find(|b| b.host_port != 0))
            .or_else(|| {
                self.published_ports
                    .get(&key)
                    .and_then(|bindings| bindings.iter().find(|b| b.host_port != 0))
            })
    }

    /// Host the container's published ports are reachable on
    ///
    /// Swarm reports the node IP; a standalone engine does not, so a concrete
    /// binding address is used, and failing that `fallback_host` (the API endpoint host).
    pub fn node_host(&self, binding: Option<&PortBinding>, fallback_host: &str) -> String {
        if let Some(node) = self.node.as_ref().filter(|n| !n.ip.is_empty()) {
            return node.ip.clone();
        }
        match binding {
            Some(b) if !b.is_unspecified() => b.host_ip.clone(),
            _ => fallback_host.to_string(),
        }
    }

    /// `<node-host>:<published-port>` for a container TCP port
    pub fn published_address(&self, container_port: u16, fallback_host: &str) -> Option<String> {
        let binding = self.binding(container_port)?;
        let host = self.node_host(Some(binding), fallback_host);
        Some(format!("{}:{}", host, binding.host_port))
    }

    /// Value of the role label, if the container was created by this tool
    pub fn role(&self) -> Option<&str> {
        self.labels.get(ROLE_LABEL).map(String::as_str)
    }

    /// Value of the run id label, if the container was created by this tool
    pub fn run_id(&self) -> Option<&str> {
        self.labels.get(RUN_ID_LABEL).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(node: Option<NodeInfo>, bindings: PortMap) -> ContainerInfo {
        ContainerInfo {
            id: "abc".to_string(),
            name: "redis-test".to_string(),
            image: "registry:5000/redis".to_string(),
            state: ContainerState {
                status: "running".to_string(),
                running: true,
                exit_code: 0,
                started_at: None,
            },
            node,
            port_bindings: bindings,
            published_ports: PortMap::new(),
            labels: BTreeMap::new(),
        }
    }

    fn bindings(port: u16, host_ip: &str, host_port: u16) -> PortMap {
        let mut map = PortMap::new();
        map.insert(port_key(port), vec![PortBinding::new(host_ip, host_port)]);
        map
    }

    #[test]
    fn test_published_address_uses_swarm_node_ip() {
        let node = NodeInfo {
            id: "n1".to_string(),
            name: "node-1".to_string(),
            ip: "192.168.156.201".to_string(),
        };
        let info = info(Some(node), bindings(6379, "0.0.0.0", 6379));

        assert_eq!(
            info.published_address(6379, "192.168.156.200"),
            Some("192.168.156.201:6379".to_string())
        );
    }

    #[test]
    fn test_published_address_falls_back_to_endpoint_host() {
        let info = info(None, bindings(6379, "0.0.0.0", 16379));
        assert_eq!(
            info.published_address(6379, "docker-host"),
            Some("docker-host:16379".to_string())
        );
    }

    #[test]
    fn test_published_address_prefers_concrete_binding_ip() {
        let info = info(None, bindings(6379, "10.1.2.3", 6379));
        assert_eq!(
            info.published_address(6379, "docker-host"),
            Some("10.1.2.3:6379".to_string())
        );
    }

    #[test]
    fn test_binding_falls_back_to_published_ports() {
        let mut info = info(None, bindings(6379, "0.0.0.0", 0));
        info.published_ports = bindings(6379, "0.0.0.0", 32768);

        assert_eq!(info.binding(6379).map(|b| b.host_port), Some(32768));
    }

    #[test]
    fn test_missing_binding() {
        let info = info(None, PortMap::new());
        assert_eq!(info.published_address(6379, "docker-host"), None);
    }

    #[test]
    fn test_has_stopped() {
        let mut state = ContainerState {
            status: "exited".to_string(),
            running: false,
            exit_code: 1,
            started_at: None,
        };
        assert!(state.has_stopped());

        state.status = "created".to_string();
        assert!(!state.has_stopped());
    }
}
