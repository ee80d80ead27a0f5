//! Application service: workspace readiness reconciliation.
//!
//! A workspace's lifecycle state is never stored. Every call re-reads the
//! platform's coarse status and, only when the platform reports the resource
//! as active, probes the published SSH port. `await_ready` repeats that
//! resolution on a fixed interval within a bounded attempt budget.

use std::time::Duration;

use anyhow::{Context, Result};
use dokpod_common::{LifecycleState, ProbeOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::ports::{PlatformClient, ReachabilityProber, Sleeper};
use crate::domain::error::{is_not_found, is_transient};
use crate::domain::{PlatformStatus, PollPolicy, Provisional};

// ── Resolution ────────────────────────────────────────────────────────────────

/// Anything that can answer "what state is this workspace in right now".
#[allow(async_fn_in_trait)]
pub trait LifecycleResolver {
    async fn resolve(&self, name: &str) -> Result<LifecycleState>;
}

/// Combines the platform's coarse status with a live SSH probe.
pub struct StatusReconciler<'a, P, R> {
    platform: &'a P,
    prober: &'a R,
    host: &'a str,
    probe_timeout: Duration,
}

impl<'a, P: PlatformClient, R: ReachabilityProber> StatusReconciler<'a, P, R> {
    pub fn new(platform: &'a P, prober: &'a R, host: &'a str, probe_timeout: Duration) -> Self {
        Self {
            platform,
            prober,
            host,
            probe_timeout,
        }
    }

    /// Resolve a resource already known by id.
    ///
    /// # Errors
    ///
    /// Returns any platform failure other than not-found.
    pub async fn resolve_resource(&self, resource_id: &str) -> Result<LifecycleState> {
        let fresh = match self.platform.get_resource(resource_id).await {
            Ok(Some(w)) => w,
            Ok(None) => return Ok(LifecycleState::NotFound),
            Err(e) if is_not_found(&e) => return Ok(LifecycleState::NotFound),
            Err(e) => {
                return Err(e).with_context(|| format!("reading resource {resource_id}"));
            }
        };

        let status = PlatformStatus::parse(&fresh.platform_status);
        if status == PlatformStatus::Unrecognized {
            warn!(
                resource_id,
                status = %fresh.platform_status,
                "unrecognized platform status, treating as busy"
            );
        }

        match status.provisional() {
            Provisional::Settled(state) => {
                debug!(resource_id, status = %fresh.platform_status, %state, "platform status is final");
                Ok(state)
            }
            Provisional::Active => {
                let Some(port) = fresh.ssh_port else {
                    debug!(resource_id, "active but no SSH port assigned yet");
                    return Ok(LifecycleState::Busy);
                };
                let outcome = self.prober.probe(self.host, port, self.probe_timeout).await;
                debug!(resource_id, port, ?outcome, "probed SSH port");
                Ok(match outcome {
                    ProbeOutcome::ReachableExpectedService => LifecycleState::Running,
                    ProbeOutcome::ReachableUnknownService | ProbeOutcome::Unreachable => {
                        LifecycleState::Busy
                    }
                })
            }
        }
    }
}

impl<P: PlatformClient, R: ReachabilityProber> LifecycleResolver for StatusReconciler<'_, P, R> {
    async fn resolve(&self, name: &str) -> Result<LifecycleState> {
        let listing = self
            .platform
            .list_resources()
            .await
            .context("listing workspaces")?;
        let Some(entry) = listing.into_iter().find(|w| w.name == name) else {
            debug!(name, "workspace absent from platform listing");
            return Ok(LifecycleState::NotFound);
        };
        self.resolve_resource(&entry.resource_id).await
    }
}

/// Single-shot status for the `status` command: never fails.
///
/// Transient failures read as `Busy`; any other failure as `NotFound`.
pub async fn current_state(resolver: &impl LifecycleResolver, name: &str) -> LifecycleState {
    match resolver.resolve(name).await {
        Ok(state) => state,
        Err(e) if is_transient(&e) => {
            warn!(name, error = %format!("{e:#}"), "status check failed transiently");
            LifecycleState::Busy
        }
        Err(e) => {
            warn!(name, error = %format!("{e:#}"), "status check failed");
            LifecycleState::NotFound
        }
    }
}

// ── Polling ───────────────────────────────────────────────────────────────────

/// Outcome of [`await_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwaitOutcome {
    Ready,
    TimedOut { attempts: u32 },
    Cancelled,
}

/// Poll until the workspace resolves to `Running` or the budget runs out.
///
/// A failed resolution counts as `Busy`. `NotFound` and `Stopped` keep
/// polling, since the platform may lag behind a just-triggered deploy. The
/// sleeper is called only between attempts.
pub async fn await_ready(
    resolver: &impl LifecycleResolver,
    sleeper: &impl Sleeper,
    name: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> AwaitOutcome {
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return AwaitOutcome::Cancelled;
        }
        let state = resolver.resolve(name).await.unwrap_or_else(|e| {
            warn!(name, attempt, error = %format!("{e:#}"), "resolve failed, counting as busy");
            LifecycleState::Busy
        });
        if state == LifecycleState::Running {
            info!(name, attempt, "workspace is running");
            return AwaitOutcome::Ready;
        }
        info!(name, attempt, max = policy.max_attempts, %state, "waiting for workspace");
        if attempt < policy.max_attempts {
            tokio::select! {
                () = sleeper.sleep(policy.interval) => {}
                () = cancel.cancelled() => return AwaitOutcome::Cancelled,
            }
        }
    }
    AwaitOutcome::TimedOut {
        attempts: policy.max_attempts,
    }
}
