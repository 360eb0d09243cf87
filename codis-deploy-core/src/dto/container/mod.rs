//! Container DTOs
//!
//! Bodies for `POST /containers/create` and `GET /containers/{id}/json`.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::container::{self, ContainerSpec, PortMap};
use crate::domain::inspect::{ContainerInfo, ContainerState, NodeInfo};

/// Port binding as it appears on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortBinding {
    #[serde(rename = "HostIp", default, skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<String>,
}

impl PortBinding {
    /// Converts to the domain binding; an empty host port maps to 0 (engine-assigned)
    pub fn to_domain(&self) -> Option<container::PortBinding> {
        let host_port = match self.host_port.as_deref() {
            None | Some("") => 0,
            Some(port) => port.parse().ok()?,
        };
        Some(container::PortBinding::new(
            self.host_ip.clone().unwrap_or_default(),
            host_port,
        ))
    }
}

impl From<&container::PortBinding> for PortBinding {
    fn from(binding: &container::PortBinding) -> Self {
        PortBinding {
            host_ip: Some(binding.host_ip.clone()),
            host_port: Some(binding.host_port.to_string()),
        }
    }
}

/// Host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_bindings: Option<HashMap<String, Option<Vec<PortBinding>>>>,
}

/// Request body for `POST /containers/create`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateContainerRequest {
    pub image: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub exposed_ports: HashMap<String, HashMap<(), ()>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    pub host_config: HostConfig,
}

impl From<&ContainerSpec> for CreateContainerRequest {
    fn from(spec: &ContainerSpec) -> Self {
        let port_bindings: HashMap<String, Option<Vec<PortBinding>>> = spec
            .ports
            .iter()
            .map(|(key, bindings)| {
                (
                    key.clone(),
                    Some(bindings.iter().map(PortBinding::from).collect()),
                )
            })
            .collect();

        CreateContainerRequest {
            image: spec.image.clone(),
            exposed_ports: spec
                .ports
                .keys()
                .map(|key| (key.clone(), HashMap::new()))
                .collect(),
            labels: spec
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            host_config: HostConfig {
                network_mode: Some(spec.network_mode.clone()),
                port_bindings: Some(port_bindings),
            },
        }
    }
}

/// Response body for `POST /containers/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateContainerResponse {
    pub id: String,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// Container state section of an inspect response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StateResponse {
    pub status: String,
    pub running: bool,
    pub exit_code: i64,
    pub started_at: String,
}

/// Config section of an inspect response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConfigResponse {
    pub image: String,
    pub labels: Option<HashMap<String, String>>,
}

/// Network settings section of an inspect response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetworkSettingsResponse {
    pub ports: Option<HashMap<String, Option<Vec<PortBinding>>>>,
}

/// Swarm node section of an inspect response (classic Swarm only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeResponse {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    #[serde(rename = "IP")]
    pub ip: String,
}

/// Response body for `GET /containers/{id}/json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InspectContainerResponse {
    pub id: String,
    pub name: String,
    pub config: ConfigResponse,
    pub state: StateResponse,
    pub host_config: HostConfig,
    pub network_settings: NetworkSettingsResponse,
    pub node: Option<NodeResponse>,
}

fn to_port_map(bindings: Option<HashMap<String, Option<Vec<PortBinding>>>>) -> PortMap {
    bindings
        .unwrap_or_default()
        .into_iter()
        .map(|(key, list)| {
            let list = list
                .unwrap_or_default()
                .iter()
                .filter_map(PortBinding::to_domain)
                .collect();
            (key, list)
        })
        .collect()
}

/// Docker reports never-started containers with the zero time `0001-01-01T00:00:00Z`
fn parse_started_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .filter(|dt| dt.year() > 1)
}

impl From<InspectContainerResponse> for ContainerInfo {
    fn from(resp: InspectContainerResponse) -> Self {
        ContainerInfo {
            id: resp.id,
            name: resp.name.trim_start_matches('/').to_string(),
            image: resp.config.image,
            state: ContainerState {
                started_at: parse_started_at(&resp.state.started_at),
                status: resp.state.status,
                running: resp.state.running,
                exit_code: resp.state.exit_code,
            },
            node: resp.node.map(|n| NodeInfo {
                id: n.id,
                name: n.name,
                ip: n.ip,
            }),
            port_bindings: to_port_map(resp.host_config.port_bindings),
            published_ports: to_port_map(resp.network_settings.ports),
            labels: resp
                .config
                .labels
                .unwrap_or_default()
                .into_iter()
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::container::ContainerRole;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_create_request_wire_format() {
        let spec = ContainerSpec::new("redis-test", "192.168.156.200:5000/redis")
            .with_port(6379, "0.0.0.0", 6379)
            .with_deployment_labels(ContainerRole::DataNode, Uuid::nil());

        let value = serde_json::to_value(CreateContainerRequest::from(&spec)).unwrap();

        assert_eq!(value["Image"], "192.168.156.200:5000/redis");
        assert_eq!(value["ExposedPorts"], json!({ "6379/tcp": {} }));
        assert_eq!(value["HostConfig"]["NetworkMode"], "bridge");
        assert_eq!(
            value["HostConfig"]["PortBindings"]["6379/tcp"],
            json!([{ "HostIp": "0.0.0.0", "HostPort": "6379" }])
        );
        assert_eq!(value["Labels"]["codis-deploy.role"], "data-node");
    }

    #[test]
    fn test_inspect_swarm_response() {
        let body = json!({
            "Id": "4fa6e0f0c678",
            "Name": "/redis-test",
            "Config": { "Image": "192.168.156.200:5000/redis", "Labels": { "codis-deploy.role": "data-node" } },
            "State": { "Status": "running", "Running": true, "ExitCode": 0, "StartedAt": "2024-03-01T10:00:00.5Z" },
            "HostConfig": {
                "NetworkMode": "bridge",
                "PortBindings": { "6379/tcp": [{ "HostIp": "0.0.0.0", "HostPort": "6379" }] }
            },
            "NetworkSettings": { "Ports": { "6379/tcp": [{ "HostIp": "0.0.0.0", "HostPort": "6379" }] } },
            "Node": { "ID": "XYZ", "IP": "192.168.156.201", "Addr": "192.168.156.201:2375", "Name": "node-1" }
        });

        let resp: InspectContainerResponse = serde_json::from_value(body).unwrap();
        let info = ContainerInfo::from(resp);

        assert_eq!(info.name, "redis-test");
        assert!(info.state.running);
        assert!(info.state.started_at.is_some());
        assert_eq!(info.role(), Some("data-node"));
        assert_eq!(
            info.published_address(6379, "192.168.156.200"),
            Some("192.168.156.201:6379".to_string())
        );
    }

    #[test]
    fn test_inspect_standalone_response_with_null_ports() {
        let body = json!({
            "Id": "abc",
            "Name": "/proxy-test",
            "Config": { "Image": "proxy-etcd", "Labels": null },
            "State": { "Status": "created", "Running": false, "ExitCode": 0, "StartedAt": "0001-01-01T00:00:00Z" },
            "HostConfig": { "PortBindings": { "19000/tcp": null } },
            "NetworkSettings": { "Ports": {} }
        });

        let info = ContainerInfo::from(serde_json::from_value::<InspectContainerResponse>(body).unwrap());

        assert!(info.node.is_none());
        assert!(info.state.started_at.is_none());
        assert_eq!(info.port_bindings.get("19000/tcp"), Some(&Vec::new()));
        assert!(info.labels.is_empty());
    }
}
