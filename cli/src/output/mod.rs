//! Output formatting module
//!
//! Two channels: human progress on stderr through [`OutputContext`], and the
//! DevPod protocol on stdout (status tokens, `DEVPOD_MACHINE_*` lines).

pub mod reporter;
pub mod styles;

use std::io::{self, Write};

use console::Term;
use dokpod_common::LifecycleState;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::domain::ConnectionInfo;

/// Output context carrying the stderr stylesheet.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
}

impl OutputContext {
    /// Colors only when `no_color` is unset and stderr is a terminal.
    #[must_use]
    pub fn new(no_color: bool) -> Self {
        let mut styles = Styles::default();
        if !no_color && Term::stderr().is_term() {
            styles.colorize();
        }
        Self { styles }
    }

    /// Print an in-progress step prefixed with `→`.
    pub fn step(&self, msg: &str) {
        eprintln!("  {} {msg}", "→".style(self.styles.step));
    }

    /// Print a success message prefixed with `✓`.
    pub fn success(&self, msg: &str) {
        eprintln!("  {} {msg}", "✓".style(self.styles.success));
    }

    /// Print a warning message prefixed with `!`.
    pub fn warn(&self, msg: &str) {
        eprintln!("  {} {msg}", "!".style(self.styles.warning));
    }
}

// ── Protocol output (stdout) ─────────────────────────────────────────────────

/// Write exactly one status token followed by a newline.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_status(out: &mut impl Write, state: LifecycleState) -> io::Result<()> {
    writeln!(out, "{state}")?;
    out.flush()
}

/// Write the `DEVPOD_MACHINE_*` connection lines.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_connection(out: &mut impl Write, info: &ConnectionInfo) -> io::Result<()> {
    for line in info.to_env_lines() {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
