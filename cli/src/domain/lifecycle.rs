//! Mapping from the platform's coarse status string to a provisional
//! lifecycle state.
//!
//! Pure functions only. Reachability is layered on top of this by the status
//! reconciler; nothing here performs I/O.

use dokpod_common::LifecycleState;

/// Coarse status buckets reported by the deployment platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformStatus {
    /// `done`, `running`: deployment finished, container should be up.
    Active,
    /// `idle`, `stopped`.
    Idle,
    /// `building`, `deploying`, `restarting`.
    InProgress,
    /// `error`, `failed`.
    Failed,
    /// Anything else, including the empty string.
    Unrecognized,
}

pub const ACTIVE_STATUSES: &[&str] = &["done", "running"];
pub const IDLE_STATUSES: &[&str] = &["idle", "stopped"];
pub const IN_PROGRESS_STATUSES: &[&str] = &["building", "deploying", "restarting"];
pub const FAILED_STATUSES: &[&str] = &["error", "failed"];

impl PlatformStatus {
    /// Classify a raw status string. Matching ignores case and surrounding
    /// whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let status = raw.trim().to_ascii_lowercase();
        let status = status.as_str();
        if ACTIVE_STATUSES.contains(&status) {
            Self::Active
        } else if IDLE_STATUSES.contains(&status) {
            Self::Idle
        } else if IN_PROGRESS_STATUSES.contains(&status) {
            Self::InProgress
        } else if FAILED_STATUSES.contains(&status) {
            Self::Failed
        } else {
            Self::Unrecognized
        }
    }

    /// Provisional state before any reachability check.
    ///
    /// Unrecognized statuses map to `Busy`: never toward ready, never toward
    /// gone.
    #[must_use]
    pub fn provisional(self) -> Provisional {
        match self {
            Self::Active => Provisional::Active,
            Self::Idle => Provisional::Settled(LifecycleState::Stopped),
            Self::InProgress | Self::Unrecognized => Provisional::Settled(LifecycleState::Busy),
            Self::Failed => Provisional::Settled(LifecycleState::NotFound),
        }
    }
}

/// Outcome of the status table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisional {
    /// Platform says active; the final answer depends on a probe.
    Active,
    /// Final answer, no probe needed.
    Settled(LifecycleState),
}
