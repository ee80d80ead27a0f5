//! Tracing subscriber setup.
//!
//! Logs never go to stdout: DevPod parses it for status tokens and
//! connection details.

use std::path::Path;

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Directory and file name of the dev-mode log.
pub const DEV_LOG_DIR: &str = "/tmp";
pub const DEV_LOG_FILE_NAME: &str = "dokploy-provider.log";

/// Variables that switch the provider into dev mode.
pub const DEV_MODE_VARS: &[&str] = &["DEVPOD_PROVIDER_DEV", "DOKPLOY_PROVIDER_DEV"];

/// Whether any dev-mode variable is `true` (or `1`).
pub fn is_dev_mode(lookup: impl Fn(&str) -> Option<String>) -> bool {
    DEV_MODE_VARS.iter().any(|var| {
        lookup(var).is_some_and(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v == "1"
        })
    })
}

/// Filter directive used when `RUST_LOG` is unset.
#[must_use]
pub fn default_directive(verbose: bool, dev_mode: bool) -> &'static str {
    if verbose || dev_mode { "debug" } else { "info" }
}

/// Append-only, never-rotated log file [`DEV_LOG_FILE_NAME`] in `dir`.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn dev_log_appender(dir: impl AsRef<Path>) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(DEV_LOG_FILE_NAME)
        .build(dir)
}

/// Install the global subscriber. `RUST_LOG` wins over the defaults.
///
/// In dev mode logs are appended to [`DEV_LOG_FILE_NAME`] under
/// [`DEV_LOG_DIR`], falling back to stderr when it cannot be opened.
/// Calling this twice is a no-op.
pub fn init(verbose: bool, dev_mode: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, dev_mode)));

    if dev_mode {
        match dev_log_appender(DEV_LOG_DIR) {
            Ok(appender) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(appender)
                    .try_init();
                return;
            }
            Err(e) => eprintln!(
                "warning: cannot open {DEV_LOG_DIR}/{DEV_LOG_FILE_NAME}: {e}; logging to stderr"
            ),
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
