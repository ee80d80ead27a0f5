//! Application service: SSH port allocation.
//!
//! Linear ascending scan over the configured range. A candidate is skipped
//! when the platform snapshot lists it, when something already accepts TCP
//! connections on it, or when the platform refuses the claim. Each port is
//! tried at most once; the platform's claim call arbitrates races between
//! concurrent `create` invocations.

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::ports::{ClaimOutcome, PlatformClient, ReachabilityProber};
use crate::domain::error::{AllocationError, is_transient};
use crate::domain::{PortClaim, PortRange, Workspace};

/// Inputs for one allocation run.
#[derive(Debug, Clone, Copy)]
pub struct AllocationRequest<'a> {
    /// Host the published port will be reachable on.
    pub host: &'a str,
    pub range: PortRange,
    /// Resource that will own the claim.
    pub resource_id: &'a str,
    /// Bound on each occupancy check.
    pub connect_timeout: Duration,
}

/// Ports the platform already reports as published by any resource.
///
/// Advisory only: the listing may lag behind recent claims and never sees
/// listeners the platform does not manage.
#[must_use]
pub fn usage_snapshot(resources: &[Workspace]) -> BTreeSet<u16> {
    resources
        .iter()
        .flat_map(|w| w.published_ports.iter().copied().chain(w.ssh_port))
        .collect()
}

/// Find a free port in `request.range` and register it for the resource.
///
/// # Errors
///
/// Returns [`AllocationError::Exhausted`] when every candidate was taken,
/// [`AllocationError::Cancelled`] when `cancel` fires between candidates,
/// and any non-transient platform error from a claim call.
pub async fn allocate_port(
    platform: &impl PlatformClient,
    prober: &impl ReachabilityProber,
    request: &AllocationRequest<'_>,
    snapshot: &BTreeSet<u16>,
    cancel: &CancellationToken,
) -> Result<PortClaim> {
    let range = request.range;
    let mut taken: BTreeSet<u16> = BTreeSet::new();

    for port in range.iter() {
        if cancel.is_cancelled() {
            return Err(AllocationError::Cancelled.into());
        }
        if snapshot.contains(&port) {
            debug!(port, "skipping port published on the platform");
            continue;
        }
        if prober
            .tcp_open(request.host, port, request.connect_timeout)
            .await
        {
            debug!(port, "skipping port with an active listener");
            taken.insert(port);
            continue;
        }

        let claim = PortClaim::tcp(port, request.resource_id);
        match platform.claim_port(&claim).await {
            Ok(ClaimOutcome::Claimed) => {
                info!(port, resource_id = request.resource_id, "claimed SSH port");
                return Ok(claim);
            }
            Ok(ClaimOutcome::Conflict) => {
                debug!(port, "claim rejected as conflict");
                taken.insert(port);
            }
            Err(e) if is_transient(&e) => {
                warn!(port, error = %format!("{e:#}"), "claim failed transiently, trying next port");
                taken.insert(port);
            }
            Err(e) => return Err(e).with_context(|| format!("claiming port {port}")),
        }
    }

    debug!(
        locally_taken = taken.len(),
        snapshot = snapshot.len(),
        "port range exhausted"
    );
    Err(AllocationError::Exhausted {
        min: range.min(),
        max: range.max(),
    }
    .into())
}
