//! Deployment plan
//!
//! Turns the configuration into concrete container specs and the ordered
//! list of commands run inside the proxy container.

use codis_deploy_core::domain::container::{ContainerRole, ContainerSpec};
use codis_deploy_core::domain::exec::ExecSpec;
use uuid::Uuid;

use crate::config::Config;

/// A step of the deployment sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ping,
    Pull,
    Create,
    Start,
    /// Start codis-server in the data node
    Exec,
    Inspect,
    /// Start the embedded etcd
    Etcd,
    /// Start the dashboard
    Dashboard,
    /// Initialize slot metadata
    SlotInit,
    /// Register the data node as a backing server
    ServerAdd,
    /// Start codis-proxy
    ProxyStart,
    /// Mark the proxy online
    ProxyOnline,
}

impl Step {
    /// Short label reported in errors
    pub fn label(&self) -> &'static str {
        match self {
            Step::Ping => "ping",
            Step::Pull => "pull",
            Step::Create => "create",
            Step::Start => "start",
            Step::Exec => "exec",
            Step::Inspect => "inspect",
            Step::Etcd => "exec1",
            Step::Dashboard => "exec2",
            Step::SlotInit => "exec3",
            Step::ServerAdd => "exec4",
            Step::ProxyStart => "exec5",
            Step::ProxyOnline => "exec6",
        }
    }
}

/// When a launched command counts as done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// One-shot command: must exit with code 0
    Completes,

    /// Background process: must still be running after the grace period
    StaysUp,

    /// Background service: the published host port for this container port accepts connections
    Listens(u16),
}

/// A command to run inside a container and how to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedExec {
    pub step: Step,
    pub spec: ExecSpec,
    pub readiness: Readiness,
}

/// The data node container
pub fn data_node_spec(config: &Config, run_id: Uuid) -> ContainerSpec {
    let port = config.data_node.port;
    ContainerSpec::new(&config.data_node.name, config.data_node_image())
        .with_port(port.container, &config.bind_ip, port.host)
        .with_deployment_labels(ContainerRole::DataNode, run_id)
}

/// The proxy container
pub fn proxy_spec(config: &Config, run_id: Uuid) -> ContainerSpec {
    let proxy = &config.proxy;
    let mut spec = ContainerSpec::new(&proxy.name, config.proxy_image());
    for port in [proxy.proxy_port, proxy.admin_port, proxy.dashboard_port] {
        spec = spec.with_port(port.container, &config.bind_ip, port.host);
    }
    spec.with_deployment_labels(ContainerRole::Proxy, run_id)
}

/// The server process started inside the data node
pub fn data_node_exec(config: &Config) -> PlannedExec {
    PlannedExec {
        step: Step::Exec,
        spec: ExecSpec::detached([config.data_node.server_bin.as_str()]).with_tty(),
        readiness: Readiness::Listens(config.data_node.port.container),
    }
}

/// Commands run inside the proxy container, in order
///
/// # Arguments
/// * `config` - Deployment configuration
/// * `data_node_addr` - `<host>:<port>` of the data node, registered as group master
pub fn proxy_execs(config: &Config, data_node_addr: &str) -> Vec<PlannedExec> {
    let proxy = &config.proxy;
    let codis_config = format!("{}/codis-config", proxy.codis_bin_dir);
    let codis_proxy = format!("{}/codis-proxy", proxy.codis_bin_dir);

    vec![
        PlannedExec {
            step: Step::Etcd,
            spec: ExecSpec::detached([proxy.etcd_bin.clone()]),
            readiness: Readiness::StaysUp,
        },
        PlannedExec {
            step: Step::Dashboard,
            spec: ExecSpec::detached([
                codis_config.clone(),
                "dashboard".to_string(),
                "--addr".to_string(),
                format!("0.0.0.0:{}", proxy.dashboard_port.container),
            ]),
            readiness: Readiness::Listens(proxy.dashboard_port.container),
        },
        PlannedExec {
            step: Step::SlotInit,
            spec: ExecSpec::attached([codis_config.as_str(), "slot", "init"]),
            readiness: Readiness::Completes,
        },
        PlannedExec {
            step: Step::ServerAdd,
            spec: ExecSpec::attached([
                codis_config.clone(),
                "server".to_string(),
                "add".to_string(),
                proxy.server_group.to_string(),
                data_node_addr.to_string(),
                "master".to_string(),
            ]),
            readiness: Readiness::Completes,
        },
        PlannedExec {
            step: Step::ProxyStart,
            spec: ExecSpec::detached([
                codis_proxy,
                "-c".to_string(),
                proxy.config_file.clone(),
                "-L".to_string(),
                proxy.log_file.clone(),
                format!("--cpu={}", proxy.cpu),
                format!("--addr=0.0.0.0:{}", proxy.proxy_port.container),
                format!("--http-addr=0.0.0.0:{}", proxy.admin_port.container),
            ]),
            readiness: Readiness::Listens(proxy.admin_port.container),
        },
        PlannedExec {
            step: Step::ProxyOnline,
            spec: ExecSpec::attached([
                codis_config,
                "-c".to_string(),
                proxy.config_file.clone(),
                "proxy".to_string(),
                "online".to_string(),
                proxy.proxy_id.clone(),
            ]),
            readiness: Readiness::Completes,
        },
    ]
}
