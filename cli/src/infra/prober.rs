//! Network infrastructure: implements `ReachabilityProber`.
//!
//! TCP checks use `tokio::net::TcpStream` under a timeout. The SSH handshake
//! is delegated to the system `ssh` client in batch mode through the
//! `CommandRunner` port, and its result is classified by
//! `domain::ssh::classify_handshake`.

use std::time::Duration;

use dokpod_common::ProbeOutcome;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::application::ports::{CommandRunner, ReachabilityProber};
use crate::domain::ssh::{classify_handshake, handshake_probe_args};

/// Production prober: TCP connect, then an unauthenticated SSH handshake.
pub struct SshProber<R> {
    runner: R,
    user: String,
}

impl<R: CommandRunner> SshProber<R> {
    pub fn new(runner: R, user: impl Into<String>) -> Self {
        Self {
            runner,
            user: user.into(),
        }
    }
}

/// Connect and immediately close. `false` on refusal, DNS failure or timeout.
async fn connect_once(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            debug!(host, port, error = %e, "tcp connect failed");
            false
        }
        Err(_) => {
            debug!(host, port, "tcp connect timed out");
            false
        }
    }
}

impl<R: CommandRunner> ReachabilityProber for SshProber<R> {
    async fn tcp_open(&self, host: &str, port: u16, timeout: Duration) -> bool {
        connect_once(host, port, timeout).await
    }

    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> ProbeOutcome {
        let deadline = Instant::now() + timeout;
        if !connect_once(host, port, timeout).await {
            return ProbeOutcome::Unreachable;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return ProbeOutcome::ReachableUnknownService;
        }
        let args = handshake_probe_args(&self.user, host, port, remaining.as_secs().max(1));
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        match self.runner.run_with_timeout("ssh", &arg_refs, remaining).await {
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let outcome = classify_handshake(output.status.code(), &stderr);
                debug!(host, port, code = ?output.status.code(), stderr = %stderr.trim(), ?outcome, "ssh handshake");
                outcome
            }
            Err(e) => {
                warn!(host, port, error = %format!("{e:#}"), "ssh handshake did not complete");
                ProbeOutcome::ReachableUnknownService
            }
        }
    }
}
