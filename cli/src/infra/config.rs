//! Provider settings loader: optional YAML file, then `DOKPLOY_*` environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::{ProviderSettings, RawSettings};

/// Settings file looked up in the home directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".dokploy-provider.yaml";

/// Prefix of the provider's environment variables.
pub const ENV_PREFIX: &str = "DOKPLOY_";

/// Unprefixed variable DevPod sets from the provider option.
pub const MACHINE_TYPE_VAR: &str = "MACHINE_TYPE";

/// Load settings from the process environment and the settings file.
///
/// # Errors
///
/// Returns an error if an explicit file cannot be read, a file or variable
/// cannot be parsed, or validation fails.
pub fn load_settings(explicit: Option<&Path>) -> Result<ProviderSettings> {
    let file = config_file_path(explicit, dirs::home_dir());
    settings_from(std::env::vars(), file.as_deref())
}

/// The settings file to read, if any.
///
/// An explicit path is always used (a missing file is then an error); the
/// home-directory default only when it exists.
#[must_use]
pub fn config_file_path(explicit: Option<&Path>, home: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    home.map(|h| h.join(DEFAULT_CONFIG_FILE))
        .filter(|p| p.is_file())
}

/// Build settings from explicit variables and an optional file.
/// Environment values override file values; empty variables count as unset.
///
/// # Errors
///
/// See [`load_settings`].
pub fn settings_from<I>(vars: I, file: Option<&Path>) -> Result<ProviderSettings>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .collect();

    let from_file = match file {
        Some(path) => read_file(path)?,
        None => RawSettings::default(),
    };

    let mut from_env: RawSettings = envy::prefixed(ENV_PREFIX)
        .from_iter(vars.iter().cloned())
        .context("failed to read DOKPLOY_* environment variables")?;
    if from_env.machine_type.is_none() {
        from_env.machine_type = vars
            .iter()
            .find(|(k, _)| k == MACHINE_TYPE_VAR)
            .map(|(_, v)| v.clone());
    }

    let settings = ProviderSettings::from_raw(from_file.overlay(from_env))?;
    tracing::debug!(?settings, "settings loaded");
    Ok(settings)
}

fn read_file(path: &Path) -> Result<RawSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(RawSettings::default());
    }
    serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}
