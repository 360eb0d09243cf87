//! In-memory container API for tests
//!
//! Behaves like a single Docker engine: names are unique, execs need a running
//! container, detached commands keep running and attached ones complete.
//! Individual calls can be made to fail.

use async_trait::async_trait;
use codis_deploy_client::{ClientError, ContainerApi, ExecHandle, Result};
use codis_deploy_core::domain::container::{ContainerSpec, PortMap};
use codis_deploy_core::domain::exec::{ExecOutput, ExecSpec, ExecStatus};
use codis_deploy_core::domain::inspect::{ContainerInfo, ContainerState, NodeInfo};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct FakeContainer {
    id: String,
    spec: ContainerSpec,
    status: String,
    exit_code: i64,
}

#[derive(Debug, Clone)]
struct FakeExec {
    running: bool,
    exit_code: Option<i64>,
}

#[derive(Default)]
struct State {
    containers: Vec<FakeContainer>,
    execs: HashMap<String, FakeExec>,
    calls: Vec<String>,
    fail_on: Option<(String, String)>,
    exit_codes: HashMap<String, i64>,
    outputs: HashMap<String, String>,
    hangs: Vec<String>,
    node_ip: Option<String>,
    next_id: u32,
}

impl State {
    fn find(&self, id_or_name: &str) -> Option<&FakeContainer> {
        self.containers
            .iter()
            .find(|c| c.id == id_or_name || c.spec.name == id_or_name)
    }

    /// Container name for an id, so calls are recorded by name
    fn name_of(&self, id_or_name: &str) -> String {
        self.find(id_or_name)
            .map(|c| c.spec.name.clone())
            .unwrap_or_else(|| id_or_name.to_string())
    }

    fn find_mut(&mut self, id_or_name: &str) -> Option<&mut FakeContainer> {
        self.containers
            .iter_mut()
            .find(|c| c.id == id_or_name || c.spec.name == id_or_name)
    }

    /// Records the call and returns the injected failure, if it matches
    fn record(&mut self, op: &str, target: &str) -> Result<()> {
        self.calls.push(format!("{} {}", op, target));
        match &self.fail_on {
            Some((fail_op, fail_target)) if fail_op == op && target.starts_with(fail_target.as_str()) => {
                Err(ClientError::api_error(500, format!("injected failure on {} {}", op, target)))
            }
            _ => Ok(()),
        }
    }
}

pub struct FakeDocker {
    state: Mutex<State>,
}

impl FakeDocker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Report containers as scheduled on a Swarm node with this IP
    pub fn with_node_ip(self, ip: &str) -> Self {
        self.state.lock().unwrap().node_ip = Some(ip.to_string());
        self
    }

    /// Make matching calls fail; `target` matches a prefix of the
    /// container name (create), image (pull) or command line (exec)
    pub fn fail_on(&self, op: &str, target: &str) {
        self.state.lock().unwrap().fail_on = Some((op.to_string(), target.to_string()));
    }

    /// Commands starting with `cmd` exit with `code` as soon as they start
    pub fn exit_on_start(&self, cmd: &str, code: i64) {
        self.state
            .lock()
            .unwrap()
            .exit_codes
            .insert(cmd.to_string(), code);
    }

    /// Stdout returned by attached commands starting with `cmd`
    pub fn set_output(&self, cmd: &str, stdout: &str) {
        self.state
            .lock()
            .unwrap()
            .outputs
            .insert(cmd.to_string(), stdout.to_string());
    }

    /// Attached commands starting with `cmd` never return their stream
    pub fn hang_on_attach(&self, cmd: &str) {
        self.state.lock().unwrap().hangs.push(cmd.to_string());
    }

    /// Marks a container as exited
    pub fn stop_container(&self, id: &str, exit_code: i64) {
        let mut state = self.state.lock().unwrap();
        if let Some(container) = state.find_mut(id) {
            container.status = "exited".to_string();
            container.exit_code = exit_code;
        }
    }

    /// Every call made so far, as "op target"
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Specs of the containers that currently exist
    pub fn containers(&self) -> Vec<ContainerSpec> {
        self.state
            .lock()
            .unwrap()
            .containers
            .iter()
            .map(|c| c.spec.clone())
            .collect()
    }
}

fn lookup<'a>(map: &'a HashMap<String, impl Sized>, line: &str) -> Option<&'a str> {
    map.keys()
        .filter(|k| line.starts_with(k.as_str()))
        .max_by_key(|k| k.len())
        .map(String::as_str)
}

#[async_trait]
impl ContainerApi for FakeDocker {
    fn endpoint_host(&self) -> &str {
        "127.0.0.1"
    }

    async fn ping(&self) -> Result<()> {
        self.state.lock().unwrap().record("ping", "")
    }

    async fn pull_image(&self, image: &str) -> Result<()> {
        self.state.lock().unwrap().record("pull", image)
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.record("create", &spec.name)?;
        if state.find(&spec.name).is_some() {
            return Err(ClientError::api_error(
                409,
                format!("Conflict. The container name \"/{}\" is already in use", spec.name),
            ));
        }

        state.next_id += 1;
        let id = format!("c{:04}", state.next_id);
        state.containers.push(FakeContainer {
            id: id.clone(),
            spec: spec.clone(),
            status: "created".to_string(),
            exit_code: 0,
        });
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let name = state.name_of(id);
        state.record("start", &name)?;
        let container = state
            .find_mut(id)
            .ok_or_else(|| ClientError::api_error(404, format!("No such container: {}", id)))?;
        container.status = "running".to_string();
        Ok(())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo> {
        let mut state = self.state.lock().unwrap();
        let name = state.name_of(id);
        state.record("inspect", &name)?;
        let node = state.node_ip.clone().map(|ip| NodeInfo {
            id: "node-1".to_string(),
            name: "node-1".to_string(),
            ip,
        });
        let container = state
            .find(id)
            .ok_or_else(|| ClientError::api_error(404, format!("No such container: {}", id)))?;

        Ok(ContainerInfo {
            id: container.id.clone(),
            name: container.spec.name.clone(),
            image: container.spec.image.clone(),
            state: ContainerState {
                status: container.status.clone(),
                running: container.status == "running",
                exit_code: container.exit_code,
                started_at: None,
            },
            node,
            port_bindings: container.spec.ports.clone(),
            published_ports: PortMap::new(),
            labels: container.spec.labels.clone(),
        })
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let name = state.name_of(id);
        state.record("remove", &name)?;
        let before = state.containers.len();
        state.containers.retain(|c| c.id != id && c.spec.name != id);
        if state.containers.len() == before {
            return Err(ClientError::api_error(404, format!("No such container: {}", id)));
        }
        Ok(())
    }

    async fn exec(&self, container_id: &str, spec: &ExecSpec) -> Result<ExecHandle> {
        let line = spec.display();
        let hangs = {
            let mut state = self.state.lock().unwrap();
            state.record("exec", &line)?;
            spec.attach && state.hangs.iter().any(|h| line.starts_with(h.as_str()))
        };
        if hangs {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();

        let running = state
            .find(container_id)
            .map(|c| c.status == "running")
            .ok_or_else(|| {
                ClientError::api_error(404, format!("No such container: {}", container_id))
            })?;
        if !running {
            return Err(ClientError::api_error(
                409,
                format!("Container {} is not running", container_id),
            ));
        }

        let exit_code = lookup(&state.exit_codes, &line).map(|k| state.exit_codes[k]);
        let stdout = lookup(&state.outputs, &line)
            .map(|k| state.outputs[k].clone())
            .unwrap_or_default();

        let exec = if spec.attach {
            FakeExec {
                running: false,
                exit_code: Some(exit_code.unwrap_or(0)),
            }
        } else {
            FakeExec {
                running: exit_code.is_none(),
                exit_code,
            }
        };

        state.next_id += 1;
        let id = format!("e{:04}", state.next_id);
        state.execs.insert(id.clone(), exec);

        Ok(ExecHandle {
            id,
            output: spec.attach.then(|| ExecOutput {
                stdout,
                stderr: String::new(),
            }),
        })
    }

    async fn inspect_exec(&self, exec_id: &str) -> Result<ExecStatus> {
        let state = self.state.lock().unwrap();
        let exec = state
            .execs
            .get(exec_id)
            .ok_or_else(|| ClientError::api_error(404, format!("No such exec instance: {}", exec_id)))?;
        Ok(ExecStatus {
            running: exec.running,
            exit_code: exec.exit_code,
            pid: if exec.running { 100 } else { 0 },
        })
    }
}
