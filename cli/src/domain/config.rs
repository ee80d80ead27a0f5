//! Domain types and validators for provider configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access. The infra
//! loader fills [`RawSettings`] from the YAML file and the environment, then
//! [`ProviderSettings::from_raw`] applies defaults and validation.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::domain::error::ConfigError;
use crate::domain::workspace::PortRange;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_PROJECT_NAME: &str = "devpod-workspaces";
pub const DEFAULT_DOCKER_IMAGE: &str = "cruizba/ubuntu-dind:latest";
pub const DEFAULT_SSH_USER: &str = "root";
pub const DEFAULT_MACHINE_TYPE: &str = "small";
pub const DEFAULT_POLL_ATTEMPTS: u32 = 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

// ── Polling ──────────────────────────────────────────────────────────────────

/// Bounded polling budget: `max_attempts` tries, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    /// Budget used by `command` while waiting for the platform to report the
    /// workspace's SSH port.
    pub const PORT_LOOKUP: Self = Self {
        max_attempts: 10,
        interval: Duration::from_secs(2),
    };
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_ATTEMPTS,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

// ── Raw settings ─────────────────────────────────────────────────────────────

/// Unvalidated settings as read from one source.
///
/// Field names match both the YAML file keys and the `DOKPLOY_`-stripped,
/// lowercased environment variable names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RawSettings {
    pub server_url: Option<String>,
    pub api_token: Option<String>,
    pub project_name: Option<String>,
    pub server_id: Option<String>,
    pub ssh_port_min: Option<u16>,
    pub ssh_port_max: Option<u16>,
    pub poll_attempts: Option<u32>,
    pub poll_interval_secs: Option<u64>,
    pub probe_timeout_secs: Option<u64>,
    pub docker_image: Option<String>,
    pub ssh_user: Option<String>,
    pub machine_type: Option<String>,
}

impl RawSettings {
    /// Layer `over` on top of `self`; set fields in `over` win.
    #[must_use]
    pub fn overlay(self, over: Self) -> Self {
        Self {
            server_url: over.server_url.or(self.server_url),
            api_token: over.api_token.or(self.api_token),
            project_name: over.project_name.or(self.project_name),
            server_id: over.server_id.or(self.server_id),
            ssh_port_min: over.ssh_port_min.or(self.ssh_port_min),
            ssh_port_max: over.ssh_port_max.or(self.ssh_port_max),
            poll_attempts: over.poll_attempts.or(self.poll_attempts),
            poll_interval_secs: over.poll_interval_secs.or(self.poll_interval_secs),
            probe_timeout_secs: over.probe_timeout_secs.or(self.probe_timeout_secs),
            docker_image: over.docker_image.or(self.docker_image),
            ssh_user: over.ssh_user.or(self.ssh_user),
            machine_type: over.machine_type.or(self.machine_type),
        }
    }
}

// ── Validated settings ───────────────────────────────────────────────────────

/// Validated provider configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Base URL without a trailing slash.
    pub server_url: String,
    pub api_token: String,
    pub project_name: String,
    pub server_id: Option<String>,
    pub port_range: PortRange,
    pub poll: PollPolicy,
    pub probe_timeout: Duration,
    pub docker_image: String,
    pub ssh_user: String,
    pub machine_type: String,
    /// Host component of `server_url`; workspaces are reached on it.
    pub ssh_host: String,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("server_url", &self.server_url)
            .field("api_token", &"[REDACTED]")
            .field("project_name", &self.project_name)
            .field("server_id", &self.server_id)
            .field("port_range", &self.port_range)
            .field("poll", &self.poll)
            .field("probe_timeout", &self.probe_timeout)
            .field("docker_image", &self.docker_image)
            .field("ssh_user", &self.ssh_user)
            .field("machine_type", &self.machine_type)
            .field("ssh_host", &self.ssh_host)
            .finish()
    }
}

impl ProviderSettings {
    /// Apply defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a missing required key, an unusable
    /// server URL, an invalid port range, or a zero poll/probe budget.
    pub fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let server_url = required(raw.server_url, "DOKPLOY_SERVER_URL")?;
        let server_url = server_url.trim_end_matches('/').to_string();
        let api_token = required(raw.api_token, "DOKPLOY_API_TOKEN")?;
        let ssh_host = extract_host(&server_url).ok_or_else(|| ConfigError::InvalidValue {
            key: "DOKPLOY_SERVER_URL",
            value: server_url.clone(),
        })?;

        let port_range = PortRange::new(
            raw.ssh_port_min.unwrap_or(PortRange::DEFAULT.min()),
            raw.ssh_port_max.unwrap_or(PortRange::DEFAULT.max()),
        )?;

        let max_attempts = raw.poll_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DOKPLOY_POLL_ATTEMPTS",
                value: "0".into(),
            });
        }
        let interval_secs = at_least_one_sec(
            raw.poll_interval_secs,
            DEFAULT_POLL_INTERVAL_SECS,
            "DOKPLOY_POLL_INTERVAL_SECS",
        )?;
        let probe_secs = at_least_one_sec(
            raw.probe_timeout_secs,
            DEFAULT_PROBE_TIMEOUT_SECS,
            "DOKPLOY_PROBE_TIMEOUT_SECS",
        )?;

        Ok(Self {
            server_url,
            api_token,
            project_name: non_blank(raw.project_name)
                .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
            server_id: non_blank(raw.server_id),
            port_range,
            poll: PollPolicy {
                max_attempts,
                interval: Duration::from_secs(interval_secs),
            },
            probe_timeout: Duration::from_secs(probe_secs),
            docker_image: non_blank(raw.docker_image)
                .unwrap_or_else(|| DEFAULT_DOCKER_IMAGE.to_string()),
            ssh_user: non_blank(raw.ssh_user).unwrap_or_else(|| DEFAULT_SSH_USER.to_string()),
            machine_type: non_blank(raw.machine_type)
                .unwrap_or_else(|| DEFAULT_MACHINE_TYPE.to_string()),
            ssh_host,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    non_blank(value).ok_or(ConfigError::Missing(key))
}

fn at_least_one_sec(value: Option<u64>, default: u64, key: &'static str) -> Result<u64, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::InvalidValue {
            key,
            value: "0".into(),
        }),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

/// Host component of an `http(s)://` URL, without port or credentials.
///
/// Returns `None` for anything that does not parse as an absolute HTTP URL
/// with a host. IPv6 hosts come back without brackets.
#[must_use]
pub fn extract_host(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host()? {
        Host::Domain(domain) if domain.is_empty() => None,
        Host::Domain(domain) => Some(domain.to_string()),
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
