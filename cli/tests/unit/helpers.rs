//! Shared test doubles: an in-memory Dokploy, a scripted prober, and
//! recording sleeper/reporter implementations of the application ports.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use dokpod_cli::application::ports::{
    ClaimOutcome, ContainerSpec, PlatformClient, ProgressReporter, ReachabilityProber,
    ResourceSpec, Sleeper,
};
use dokpod_cli::domain::{PlatformError, PortClaim, ProviderSettings, RawSettings, Workspace};
use dokpod_common::ProbeOutcome;

pub const HOST: &str = "dokploy.example.com";

pub fn settings() -> ProviderSettings {
    settings_with(RawSettings::default())
}

pub fn settings_with(raw: RawSettings) -> ProviderSettings {
    ProviderSettings::from_raw(
        RawSettings {
            server_url: Some(format!("https://{HOST}")),
            api_token: Some("test-token".into()),
            ..RawSettings::default()
        }
        .overlay(raw),
    )
    .expect("valid settings")
}

pub fn ws(name: &str, id: &str, status: &str, ssh_port: Option<u16>) -> Workspace {
    Workspace {
        name: name.to_string(),
        resource_id: id.to_string(),
        platform_status: status.to_string(),
        ssh_port,
        published_ports: ssh_port.into_iter().collect(),
    }
}

// ── In-memory Dokploy ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Inner {
    pub projects: Vec<(String, String)>,
    pub resources: Vec<Workspace>,
    /// Ports another tenant claims between our snapshot and our claim.
    pub raced_ports: BTreeSet<u16>,
    /// `deploy` moves the resource to this status.
    pub status_after_deploy: Option<String>,
    pub fail_list: bool,
    pub calls: Vec<String>,
    next_id: u32,
}

/// Minimal Dokploy: unique published ports, deploy flips the status.
#[derive(Default)]
pub struct InMemoryDokploy {
    pub inner: Mutex<Inner>,
}

impl InMemoryDokploy {
    pub fn new(resources: Vec<Workspace>) -> Self {
        let fake = Self::default();
        {
            let mut inner = fake.inner.lock().unwrap();
            inner.resources = resources;
            inner.status_after_deploy = Some("done".into());
        }
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn claims(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("claim:"))
            .collect()
    }

    pub fn resource_named(&self, name: &str) -> Option<Workspace> {
        self.inner
            .lock()
            .unwrap()
            .resources
            .iter()
            .find(|w| w.name == name)
            .cloned()
    }

    fn log(&self, call: String) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn with_resource<T>(&self, id: &str, f: impl FnOnce(&mut Workspace) -> T) -> Result<T> {
        let mut inner = self.inner.lock().unwrap();
        let w = inner
            .resources
            .iter_mut()
            .find(|w| w.resource_id == id)
            .ok_or_else(|| PlatformError::NotFound(format!("application {id}")))?;
        Ok(f(w))
    }
}

impl PlatformClient for InMemoryDokploy {
    async fn health(&self) -> Result<()> {
        self.log("health".into());
        Ok(())
    }

    async fn list_resources(&self) -> Result<Vec<Workspace>> {
        self.log("list".into());
        let inner = self.inner.lock().unwrap();
        if inner.fail_list {
            return Err(PlatformError::Transient("HTTP 502: bad gateway".into()).into());
        }
        Ok(inner.resources.clone())
    }

    async fn find_project(&self, name: &str) -> Result<Option<String>> {
        self.log(format!("find_project:{name}"));
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .projects
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| id.clone()))
    }

    async fn create_project(&self, name: &str, _description: &str) -> Result<String> {
        self.log(format!("create_project:{name}"));
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("proj-{}", inner.next_id);
        inner.projects.push((id.clone(), name.to_string()));
        Ok(id)
    }

    async fn create_resource(&self, spec: &ResourceSpec<'_>) -> Result<String> {
        self.log(format!("create_resource:{}", spec.name));
        let mut inner = self.inner.lock().unwrap();
        if inner.resources.iter().any(|w| w.name == spec.name) {
            return Err(PlatformError::Conflict(format!("{} already exists", spec.name)).into());
        }
        inner.next_id += 1;
        let id = format!("app-{}", inner.next_id);
        inner.resources.push(ws(spec.name, &id, "idle", None));
        Ok(id)
    }

    async fn get_resource(&self, resource_id: &str) -> Result<Option<Workspace>> {
        self.log(format!("get:{resource_id}"));
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .resources
            .iter()
            .find(|w| w.resource_id == resource_id)
            .cloned())
    }

    async fn claim_port(&self, claim: &PortClaim) -> Result<ClaimOutcome> {
        self.log(format!("claim:{}", claim.port));
        let mut inner = self.inner.lock().unwrap();
        let taken = inner.raced_ports.contains(&claim.port)
            || inner
                .resources
                .iter()
                .any(|w| w.published_ports.contains(&claim.port));
        if taken {
            return Ok(ClaimOutcome::Conflict);
        }
        let w = inner
            .resources
            .iter_mut()
            .find(|w| w.resource_id == claim.resource_id)
            .ok_or_else(|| PlatformError::NotFound(claim.resource_id.clone()))?;
        w.ssh_port = Some(claim.port);
        w.published_ports.push(claim.port);
        Ok(ClaimOutcome::Claimed)
    }

    async fn configure(&self, resource_id: &str, _spec: &ContainerSpec<'_>) -> Result<()> {
        self.log(format!("configure:{resource_id}"));
        self.with_resource(resource_id, |_| ())
    }

    async fn deploy(&self, resource_id: &str) -> Result<()> {
        self.log(format!("deploy:{resource_id}"));
        let next = self.inner.lock().unwrap().status_after_deploy.clone();
        self.with_resource(resource_id, |w| {
            if let Some(status) = next {
                w.platform_status = status;
            }
        })
    }

    async fn start(&self, resource_id: &str) -> Result<()> {
        self.log(format!("start:{resource_id}"));
        self.with_resource(resource_id, |w| w.platform_status = "running".into())
    }

    async fn stop(&self, resource_id: &str) -> Result<()> {
        self.log(format!("stop:{resource_id}"));
        self.with_resource(resource_id, |w| w.platform_status = "idle".into())
    }

    async fn delete_resource(&self, resource_id: &str) -> Result<()> {
        self.log(format!("delete:{resource_id}"));
        self.with_resource(resource_id, |_| ())?;
        self.inner
            .lock()
            .unwrap()
            .resources
            .retain(|w| w.resource_id != resource_id);
        Ok(())
    }
}

// ── Prober ───────────────────────────────────────────────────────────────────

/// `busy_ports` accept TCP (something unrelated listens there); `ssh_ports`
/// answer the handshake like sshd.
#[derive(Default)]
pub struct ScriptedProber {
    pub busy_ports: BTreeSet<u16>,
    pub ssh_ports: BTreeSet<u16>,
    /// Every port answers the handshake like sshd.
    pub all_ssh: bool,
    pub probed: RefCell<Vec<u16>>,
}

impl ScriptedProber {
    pub fn sshd_everywhere() -> Self {
        Self {
            all_ssh: true,
            ..Self::default()
        }
    }
}

impl ReachabilityProber for ScriptedProber {
    async fn tcp_open(&self, _host: &str, port: u16, _timeout: Duration) -> bool {
        self.busy_ports.contains(&port) || self.ssh_ports.contains(&port)
    }

    async fn probe(&self, _host: &str, port: u16, _timeout: Duration) -> ProbeOutcome {
        self.probed.borrow_mut().push(port);
        if self.all_ssh || self.ssh_ports.contains(&port) {
            ProbeOutcome::ReachableExpectedService
        } else if self.busy_ports.contains(&port) {
            ProbeOutcome::ReachableUnknownService
        } else {
            ProbeOutcome::Unreachable
        }
    }
}

// ── Sleeper / reporter ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingSleeper {
    pub total: RefCell<Duration>,
    pub count: RefCell<u32>,
}

impl Sleeper for CountingSleeper {
    async fn sleep(&self, duration: Duration) {
        *self.total.borrow_mut() += duration;
        *self.count.borrow_mut() += 1;
    }
}

#[derive(Default)]
pub struct CollectingReporter {
    pub lines: RefCell<Vec<String>>,
}

impl ProgressReporter for CollectingReporter {
    fn step(&self, message: &str) {
        self.lines.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.lines.borrow_mut().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.lines.borrow_mut().push(format!("warn: {message}"));
    }
}
