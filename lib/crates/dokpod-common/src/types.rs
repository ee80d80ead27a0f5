use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state reported to DevPod, one token per line on stdout.
///
/// Never stored. Always derived from the platform's coarse status and a live
/// reachability probe of the workspace's SSH port.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    NotFound,
    Stopped,
    Busy,
    Running,
}

impl LifecycleState {
    /// The exact, case-sensitive token DevPod expects.
    #[must_use]
    pub fn as_token(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::Stopped => "Stopped",
            Self::Busy => "Busy",
            Self::Running => "Running",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Returned when a string is not one of the four lifecycle tokens.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown lifecycle state '{0}'")]
pub struct UnknownLifecycleState(pub String);

impl FromStr for LifecycleState {
    type Err = UnknownLifecycleState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NotFound" => Ok(Self::NotFound),
            "Stopped" => Ok(Self::Stopped),
            "Busy" => Ok(Self::Busy),
            "Running" => Ok(Self::Running),
            other => Err(UnknownLifecycleState(other.to_string())),
        }
    }
}

/// Result of probing a host/port for the workspace's SSH daemon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// TCP connect failed or timed out.
    Unreachable,
    /// Port accepts connections but did not complete the SSH negotiation
    /// up to the authentication stage (still booting, or something else
    /// listens there).
    ReachableUnknownService,
    /// SSH daemon answered and rejected (or accepted) authentication.
    ReachableExpectedService,
}

impl ProbeOutcome {
    #[must_use]
    pub fn is_reachable(self) -> bool {
        !matches!(self, Self::Unreachable)
    }

    #[must_use]
    pub fn is_expected_service(self) -> bool {
        matches!(self, Self::ReachableExpectedService)
    }
}
