//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Workspace errors ──────────────────────────────────────────────────────────

/// Errors related to workspace identity and lookup.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Workspace '{0}' not found on the platform.")]
    NotFound(String),

    #[error(
        "Could not determine the machine ID. Set MACHINE_ID or DEVPOD_MACHINE_ID (found: {found})."
    )]
    MissingMachineId { found: String },

    #[error("Invalid workspace name '{0}': must be 1-63 chars of [a-zA-Z0-9._-]")]
    InvalidName(String),

    #[error("No SSH port is assigned to workspace '{0}'.")]
    NoPortAssigned(String),
}

// ── Port allocation errors ────────────────────────────────────────────────────

/// Terminal outcomes of port allocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("no available ports in range {min}-{max}")]
    Exhausted { min: u16, max: u16 },

    #[error("port allocation cancelled")]
    Cancelled,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to provider configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Invalid port range {min}-{max}: minimum must be non-zero and not above maximum")]
    InvalidRange { min: u16, max: u16 },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

// ── Platform errors ───────────────────────────────────────────────────────────

/// Classified failures of a platform API call.
///
/// Services downcast to this type to decide between absorbing a failure
/// (transient) and surfacing it.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform resource not found: {0}")]
    NotFound(String),

    #[error("platform rejected the request as a conflict: {0}")]
    Conflict(String),

    #[error("platform unavailable: {0}")]
    Transient(String),

    #[error("platform rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to decode platform response: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Whether this failure should be retried or absorbed rather than surfaced.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Decode(_))
    }
}

/// Whether `err` wraps a transient [`PlatformError`].
#[must_use]
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PlatformError>()
        .is_some_and(PlatformError::is_transient)
}

/// Whether `err` wraps [`PlatformError::NotFound`].
#[must_use]
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PlatformError>(),
        Some(PlatformError::NotFound(_))
    )
}

/// Whether `err` wraps [`PlatformError::Conflict`].
#[must_use]
pub fn is_conflict(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PlatformError>(),
        Some(PlatformError::Conflict(_))
    )
}
