//! Workspace domain types and pure validation functions.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use std::fmt;

use crate::domain::error::{ConfigError, WorkspaceError};

/// Environment variables consulted, in order, for the workspace's machine id.
pub const MACHINE_ID_VARS: &[&str] = &[
    "MACHINE_ID",
    "DEVPOD_MACHINE_ID",
    "DEVPOD_WORKSPACE_ID",
    "WORKSPACE_ID",
];

/// Protocol tag used for every port claim.
pub const CLAIM_PROTOCOL: &str = "tcp";

/// Maximum accepted workspace name length.
const MAX_NAME_LEN: usize = 63;

// ── Platform view ────────────────────────────────────────────────────────────

/// One platform resource backing a workspace, as freshly read from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Caller-assigned, platform-unique name.
    pub name: String,
    /// Opaque platform resource id.
    pub resource_id: String,
    /// Coarse platform status string, verbatim.
    pub platform_status: String,
    /// Published port mapped to the container's SSH port, if registered.
    pub ssh_port: Option<u16>,
    /// Every published port registered on the resource, any target.
    pub published_ports: Vec<u16>,
}

// ── Port range ───────────────────────────────────────────────────────────────

/// Inclusive candidate range `[min, max]` for published SSH ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    min: u16,
    max: u16,
}

impl PortRange {
    /// Default DevPod SSH port range.
    pub const DEFAULT: Self = Self {
        min: 2222,
        max: 2250,
    };

    /// Build a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] if `min` is zero or above `max`.
    pub fn new(min: u16, max: u16) -> Result<Self, ConfigError> {
        if min == 0 || min > max {
            return Err(ConfigError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(self) -> u16 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> u16 {
        self.max
    }

    /// Number of candidate ports.
    #[must_use]
    pub fn len(self) -> usize {
        usize::from(self.max - self.min) + 1
    }

    /// A validated range is never empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        false
    }

    #[must_use]
    pub fn contains(self, port: u16) -> bool {
        (self.min..=self.max).contains(&port)
    }

    /// Candidates in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u16> {
        self.min..=self.max
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

// ── Claims and connection info ───────────────────────────────────────────────

/// A published port registered to one workspace's resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortClaim {
    pub port: u16,
    pub protocol: &'static str,
    pub resource_id: String,
}

impl PortClaim {
    #[must_use]
    pub fn tcp(port: u16, resource_id: impl Into<String>) -> Self {
        Self {
            port,
            protocol: CLAIM_PROTOCOL,
            resource_id: resource_id.into(),
        }
    }
}

/// Connection details handed back to DevPod after `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub machine_id: String,
    pub host: String,
    pub port: u16,
    pub user: String,
}

impl ConnectionInfo {
    /// The `KEY=value` lines DevPod parses from the provider's stdout.
    #[must_use]
    pub fn to_env_lines(&self) -> Vec<String> {
        vec![
            format!("DEVPOD_MACHINE_ID={}", self.machine_id),
            format!("DEVPOD_MACHINE_HOST={}", self.host),
            format!("DEVPOD_MACHINE_PORT={}", self.port),
            format!("DEVPOD_MACHINE_USER={}", self.user),
        ]
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

/// Resolve the machine id from the first non-empty variable in
/// [`MACHINE_ID_VARS`].
///
/// `lookup` abstracts the environment so callers and tests stay pure.
///
/// # Errors
///
/// Returns [`WorkspaceError::MissingMachineId`] when none is set, or
/// [`WorkspaceError::InvalidName`] when the value is not a valid name.
pub fn resolve_machine_id(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, WorkspaceError> {
    let id = MACHINE_ID_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .ok_or_else(|| WorkspaceError::MissingMachineId {
            found: MACHINE_ID_VARS.join(", "),
        })?;
    validate_workspace_name(&id)?;
    Ok(id)
}

/// Validates a workspace name: 1-63 characters of `[a-zA-Z0-9._-]`.
///
/// # Errors
///
/// Returns [`WorkspaceError::InvalidName`] if the name doesn't match.
pub fn validate_workspace_name(name: &str) -> Result<(), WorkspaceError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(WorkspaceError::InvalidName(name.to_string()))
    }
}
