//! Embedded assets compiled into the binary.
//!
//! `include_dir!` embeds everything under `cli/assets/`:
//!   - `setup-root.sh`: container startup script; installs and runs sshd
//!     with the machine's public key authorized

use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

pub const SETUP_SCRIPT: &str = "setup-root.sh";

/// Raw bytes of one embedded asset.
///
/// # Errors
///
/// Returns an error if no asset with the given `name` exists.
pub fn get_asset(name: &str) -> Result<&'static [u8]> {
    EMBEDDED_ASSETS
        .get_file(name)
        .map(|f| f.contents())
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found: {name}"))
}

/// The startup script template, placeholders intact.
///
/// # Errors
///
/// Returns an error if the script is missing or not UTF-8.
pub fn setup_script() -> Result<&'static str> {
    std::str::from_utf8(get_asset(SETUP_SCRIPT)?).context("setup script is not UTF-8")
}
