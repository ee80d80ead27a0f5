//! DevPod machine key files.
//!
//! DevPod writes a key pair into the machine folder before `create`; the
//! public half is injected into the workspace, the private half is used by
//! `command`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::ssh::normalize_public_key;

pub const MACHINE_FOLDER_VAR: &str = "MACHINE_FOLDER";
pub const PUBLIC_KEY_FILE: &str = "id_devpod_rsa.pub";
pub const PRIVATE_KEY_FILE: &str = "id_devpod_rsa";

#[derive(Debug, Clone)]
pub struct MachineKeys {
    folder: PathBuf,
}

impl MachineKeys {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Keys in the folder named by `MACHINE_FOLDER`.
    ///
    /// # Errors
    ///
    /// Returns an error if `MACHINE_FOLDER` is unset or empty.
    pub fn from_env() -> Result<Self> {
        let folder = std::env::var(MACHINE_FOLDER_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{MACHINE_FOLDER_VAR} is not set"))?;
        Ok(Self::new(folder))
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The OpenSSH public key line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a key.
    pub fn public_key(&self) -> Result<String> {
        let path = self.folder.join(PUBLIC_KEY_FILE);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read SSH public key {}", path.display()))?;
        normalize_public_key(&raw).with_context(|| format!("invalid SSH public key in {}", path.display()))
    }

    #[must_use]
    pub fn identity_file(&self) -> PathBuf {
        self.folder.join(PRIVATE_KEY_FILE)
    }
}
