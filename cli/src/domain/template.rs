//! Startup script substitution and the container command wrapper.
//!
//! Pure functions only. The script text itself is embedded by
//! `infra::assets`.

use base64::Engine as _;

pub const SSH_KEY_PLACEHOLDER: &str = "__SSH_PUBLIC_KEY_PLACEHOLDER__";
pub const SSH_USER_PLACEHOLDER: &str = "__SSH_USER_PLACEHOLDER__";

/// Substitute the workspace's public key and login user into the setup script.
///
/// Double quotes in the key are escaped; the script interpolates it inside a
/// double-quoted string.
#[must_use]
pub fn render_setup_script(template: &str, public_key: &str, ssh_user: &str) -> String {
    let escaped_key = public_key.trim().replace('"', "\\\"");
    template
        .replace(SSH_KEY_PLACEHOLDER, &escaped_key)
        .replace(SSH_USER_PLACEHOLDER, ssh_user)
}

/// Wrap a script as a single shell command that survives the platform's
/// command field without quoting issues.
#[must_use]
pub fn wrap_as_command(script: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(script);
    format!("echo '{encoded}' | base64 -d | bash")
}

/// `KEY=value` environment block stored on the platform resource.
#[must_use]
pub fn environment_block(machine_id: &str, public_key: &str, machine_type: &str) -> String {
    [
        format!("SSH_PUBLIC_KEY={}", public_key.trim()),
        format!("DEVPOD_MACHINE_ID={machine_id}"),
        format!("MACHINE_TYPE={machine_type}"),
    ]
    .join("\n")
}
