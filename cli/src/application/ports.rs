//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `dokpod_common`, never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use dokpod_common::ProbeOutcome;

use crate::domain::{PortClaim, Workspace};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Parameters for creating the platform resource backing a workspace.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub project_id: &'a str,
    /// Remote server to deploy on; `None` deploys on the platform host.
    pub server_id: Option<&'a str>,
}

/// Container startup configuration injected before the first deploy.
#[derive(Debug, Clone, Copy)]
pub struct ContainerSpec<'a> {
    pub docker_image: &'a str,
    /// Newline-separated `KEY=value` pairs.
    pub env: &'a str,
    pub command: &'a str,
}

/// Result of an atomic port registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The platform accepted the claim.
    Claimed,
    /// Another claim holds the port (lost race or stale snapshot).
    Conflict,
}

// ── Platform Port ─────────────────────────────────────────────────────────────

/// The deployment platform's resource API.
///
/// Implementations classify failures as [`crate::domain::PlatformError`]
/// wrapped in `anyhow::Error`; callers use `downcast_ref` to tell transient
/// failures from terminal ones.
#[allow(async_fn_in_trait)]
pub trait PlatformClient {
    /// Check that the platform is reachable and the credential is accepted.
    async fn health(&self) -> Result<()>;
    /// Every workspace resource the credential can see, across projects.
    async fn list_resources(&self) -> Result<Vec<Workspace>>;
    /// Project id for `name`, if the project exists.
    async fn find_project(&self, name: &str) -> Result<Option<String>>;
    /// Create a project and return its id.
    async fn create_project(&self, name: &str, description: &str) -> Result<String>;
    /// Create a resource and return its id.
    async fn create_resource(&self, spec: &ResourceSpec<'_>) -> Result<String>;
    /// Fresh read of one resource; `None` when the platform has no record.
    async fn get_resource(&self, resource_id: &str) -> Result<Option<Workspace>>;
    /// Atomically register a published port for a resource.
    async fn claim_port(&self, claim: &PortClaim) -> Result<ClaimOutcome>;
    /// Store image, environment and startup command on a resource.
    async fn configure(&self, resource_id: &str, spec: &ContainerSpec<'_>) -> Result<()>;
    /// Trigger a deployment.
    async fn deploy(&self, resource_id: &str) -> Result<()>;
    async fn start(&self, resource_id: &str) -> Result<()>;
    async fn stop(&self, resource_id: &str) -> Result<()>;
    async fn delete_resource(&self, resource_id: &str) -> Result<()>;
}

// ── Reachability Port ─────────────────────────────────────────────────────────

/// Live network checks against a workspace port.
///
/// Neither method retries internally and neither blocks past `timeout`.
/// Every connection is closed before returning.
#[allow(async_fn_in_trait)]
pub trait ReachabilityProber {
    /// Whether anything accepts a TCP connection on `host:port`.
    async fn tcp_open(&self, host: &str, port: u16, timeout: Duration) -> bool;
    /// TCP connect followed by an SSH handshake up to the authentication stage.
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> ProbeOutcome;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with a timeout and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Time Port ─────────────────────────────────────────────────────────────────

/// Suspends between polling attempts; swapped for a recorder in tests.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
