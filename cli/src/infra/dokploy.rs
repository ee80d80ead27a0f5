//! Dokploy REST client: implements the `PlatformClient` port.
//!
//! Every failure leaves this module as a [`PlatformError`] inside
//! `anyhow::Error`, so services can tell transient failures (retry or absorb)
//! from terminal ones (surface).

use std::time::Duration;

use anyhow::{Context, Result};
use dokpod_common::api::{
    ApiErrorBody, Application, ApplicationIdRequest, CreateApplicationRequest,
    CreatePortRequest, CreateProjectRequest, DockerProviderRequest, EnvironmentRequest, Project,
    SSH_TARGET_PORT, UpdateApplicationRequest,
};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::ports::{
    ClaimOutcome, ContainerSpec, PlatformClient, ResourceSpec,
};
use crate::domain::error::{PlatformError, is_conflict, is_not_found};
use crate::domain::{PortClaim, Workspace};

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body echoed into an error message.
const MAX_ERROR_BODY: usize = 300;

pub struct DokployClient {
    base_url: String,
    api_token: String,
    http: reqwest::Client,
}

impl DokployClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_token: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_token, REQUEST_TIMEOUT)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, api_token: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dokpod/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            http,
        })
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<String> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(%method, %url, ?query, body = ?body, "dokploy request (x-api-key=[REDACTED])");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header("x-api-key", &self.api_token)
            .header("accept", "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PlatformError::Transient(format!("{method} {endpoint}: {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| PlatformError::Transient(format!("reading {endpoint} response: {e}")))?;
        debug!(status, endpoint, body = %text, "dokploy response");

        classify_response(status, &text)?;
        Ok(text)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let text = self.request(Method::GET, endpoint, query, None).await?;
        decode(endpoint, &text)
    }

    async fn send_json(&self, method: Method, endpoint: &str, body: &impl Serialize) -> Result<String> {
        let value = serde_json::to_value(body)
            .with_context(|| format!("serializing {endpoint} request"))?;
        self.request(method, endpoint, &[], Some(value)).await
    }

    async fn post(&self, endpoint: &str, body: &impl Serialize) -> Result<String> {
        self.send_json(Method::POST, endpoint, body).await
    }

    async fn projects(&self) -> Result<Vec<Project>> {
        self.get("/api/project.all", &[]).await
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| PlatformError::Decode(format!("{endpoint}: {e}")).into())
}

/// Map an HTTP status and body to success or a [`PlatformError`].
///
/// Any 5xx is transient whatever its body says; the not-found and conflict
/// rules apply to 4xx responses only.
///
/// # Errors
///
/// Returns the classified error for any non-2xx status.
pub fn classify_response(status: u16, body: &str) -> Result<(), PlatformError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code.as_deref().unwrap_or_default();
    let message = parsed
        .message
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect());

    if status >= 500 {
        return Err(PlatformError::Transient(format!("HTTP {status}: {message}")));
    }
    if status == 404 || code == "NOT_FOUND" {
        return Err(PlatformError::NotFound(message));
    }
    if status == 409 || code == "CONFLICT" || message.to_ascii_lowercase().contains("already") {
        return Err(PlatformError::Conflict(message));
    }
    Err(PlatformError::Rejected {
        status,
        body: message,
    })
}

fn to_workspace(app: Application) -> Workspace {
    Workspace {
        ssh_port: app.published_port_for(SSH_TARGET_PORT),
        published_ports: app.ports.iter().map(|p| p.published_port).collect(),
        name: app.name,
        resource_id: app.application_id,
        platform_status: app.status,
    }
}

impl PlatformClient for DokployClient {
    async fn health(&self) -> Result<()> {
        self.request(Method::GET, "/api/settings.health", &[], None)
            .await
            .context("checking server health")?;
        self.projects().await.context("verifying API token")?;
        Ok(())
    }

    async fn list_resources(&self) -> Result<Vec<Workspace>> {
        Ok(self
            .projects()
            .await?
            .into_iter()
            .flat_map(|p| p.applications)
            .map(to_workspace)
            .collect())
    }

    async fn find_project(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .projects()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.project_id))
    }

    async fn create_project(&self, name: &str, description: &str) -> Result<String> {
        let text = self
            .post(
                "/api/project.create",
                &CreateProjectRequest { name, description },
            )
            .await?;
        let project: Project = decode("/api/project.create", &text)?;
        Ok(project.project_id)
    }

    async fn create_resource(&self, spec: &ResourceSpec<'_>) -> Result<String> {
        let text = self
            .post(
                "/api/application.create",
                &CreateApplicationRequest {
                    name: spec.name,
                    description: spec.description,
                    project_id: spec.project_id,
                    server_id: spec.server_id,
                },
            )
            .await?;
        let app: Application = decode("/api/application.create", &text)?;
        Ok(app.application_id)
    }

    async fn get_resource(&self, resource_id: &str) -> Result<Option<Workspace>> {
        match self
            .get::<Application>("/api/application.one", &[("applicationId", resource_id)])
            .await
        {
            Ok(app) => Ok(Some(to_workspace(app))),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn claim_port(&self, claim: &PortClaim) -> Result<ClaimOutcome> {
        let result = self
            .post(
                "/api/port.create",
                &CreatePortRequest {
                    published_port: claim.port,
                    target_port: SSH_TARGET_PORT,
                    protocol: claim.protocol,
                    application_id: &claim.resource_id,
                },
            )
            .await;
        match result {
            Ok(_) => Ok(ClaimOutcome::Claimed),
            Err(e) if is_conflict(&e) => Ok(ClaimOutcome::Conflict),
            Err(e) => Err(e),
        }
    }

    async fn configure(&self, resource_id: &str, spec: &ContainerSpec<'_>) -> Result<()> {
        self.post(
            "/api/application.saveDockerProvider",
            &DockerProviderRequest {
                application_id: resource_id,
                docker_image: spec.docker_image,
            },
        )
        .await
        .context("saving docker provider")?;
        self.post(
            "/api/application.saveEnvironment",
            &EnvironmentRequest {
                application_id: resource_id,
                env: spec.env,
            },
        )
        .await
        .context("saving environment")?;
        self.post(
            "/api/application.update",
            &UpdateApplicationRequest {
                application_id: resource_id,
                command: spec.command,
            },
        )
        .await
        .context("saving startup command")?;
        Ok(())
    }

    async fn deploy(&self, resource_id: &str) -> Result<()> {
        self.post(
            "/api/application.deploy",
            &ApplicationIdRequest {
                application_id: resource_id,
            },
        )
        .await?;
        Ok(())
    }

    async fn start(&self, resource_id: &str) -> Result<()> {
        self.post(
            "/api/application.start",
            &ApplicationIdRequest {
                application_id: resource_id,
            },
        )
        .await?;
        Ok(())
    }

    async fn stop(&self, resource_id: &str) -> Result<()> {
        self.post(
            "/api/application.stop",
            &ApplicationIdRequest {
                application_id: resource_id,
            },
        )
        .await?;
        Ok(())
    }

    async fn delete_resource(&self, resource_id: &str) -> Result<()> {
        self.send_json(
            Method::DELETE,
            "/api/application.remove",
            &ApplicationIdRequest {
                application_id: resource_id,
            },
        )
        .await?;
        Ok(())
    }
}
