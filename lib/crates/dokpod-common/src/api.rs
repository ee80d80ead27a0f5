//! Dokploy REST API wire types.
//!
//! Field names follow the Dokploy tRPC-over-REST JSON (camelCase). Only the
//! fields the provider reads or writes are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Container port the workspace's SSH daemon listens on.
pub const SSH_TARGET_PORT: u16 = 22;

/// A Dokploy project, as returned by `project.all`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub applications: Vec<Application>,
}

/// A Dokploy application, the platform resource backing one workspace.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
    pub name: String,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Coarse platform status (`idle`, `running`, `done`, `error`, ...).
    #[serde(rename = "applicationStatus", default)]
    pub status: String,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
}

impl Application {
    /// Published (host-side) port mapped to `target`, if any.
    #[must_use]
    pub fn published_port_for(&self, target: u16) -> Option<u16> {
        self.ports
            .iter()
            .find(|p| p.target_port == target)
            .map(|p| p.published_port)
    }
}

/// A published-port registration on an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    #[serde(default)]
    pub port_id: Option<String>,
    pub published_port: u16,
    pub target_port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub application_id: Option<String>,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub project_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerProviderRequest<'a> {
    pub application_id: &'a str,
    pub docker_image: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRequest<'a> {
    pub application_id: &'a str,
    pub env: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationRequest<'a> {
    pub application_id: &'a str,
    pub command: &'a str,
}

/// Body for `application.deploy`, `.start`, `.stop` and `.remove`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationIdRequest<'a> {
    pub application_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortRequest<'a> {
    pub published_port: u16,
    pub target_port: u16,
    pub protocol: &'a str,
    pub application_id: &'a str,
}
