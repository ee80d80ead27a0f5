//! Status reconciliation through the public service API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use dokpod_cli::application::services::status_reconciler::{
    AwaitOutcome, LifecycleResolver, StatusReconciler, await_ready, current_state,
};
use dokpod_cli::domain::PollPolicy;
use dokpod_cli::infra::dokploy::classify_response;
use dokpod_common::LifecycleState;
use tokio_util::sync::CancellationToken;

use crate::helpers::{CountingSleeper, HOST, InMemoryDokploy, ScriptedProber, ws};

const TIMEOUT: Duration = Duration::from_secs(3);

async fn status_of(platform: &InMemoryDokploy, prober: &ScriptedProber, name: &str) -> LifecycleState {
    let reconciler = StatusReconciler::new(platform, prober, HOST, TIMEOUT);
    current_state(&reconciler, name).await
}

#[tokio::test]
async fn unknown_workspace_is_not_found() {
    let platform = InMemoryDokploy::new(Vec::new());
    let prober = ScriptedProber::default();
    assert_eq!(status_of(&platform, &prober, "ghost").await, LifecycleState::NotFound);
    assert!(prober.probed.borrow().is_empty());
}

#[tokio::test]
async fn idle_is_stopped_without_probing() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "idle", Some(2230))]);
    let prober = ScriptedProber::sshd_everywhere();
    assert_eq!(status_of(&platform, &prober, "ws").await, LifecycleState::Stopped);
    assert!(prober.probed.borrow().is_empty());
}

#[tokio::test]
async fn deploying_is_busy() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "deploying", Some(2230))]);
    let prober = ScriptedProber::sshd_everywhere();
    assert_eq!(status_of(&platform, &prober, "ws").await, LifecycleState::Busy);
}

#[tokio::test]
async fn active_with_sshd_is_running() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "done", Some(2230))]);
    let prober = ScriptedProber {
        ssh_ports: [2230].into(),
        ..ScriptedProber::default()
    };
    assert_eq!(status_of(&platform, &prober, "ws").await, LifecycleState::Running);
    assert_eq!(*prober.probed.borrow(), [2230]);
}

#[tokio::test]
async fn active_with_foreign_listener_is_busy() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "running", Some(2230))]);
    let prober = ScriptedProber {
        busy_ports: [2230].into(),
        ..ScriptedProber::default()
    };
    assert_eq!(status_of(&platform, &prober, "ws").await, LifecycleState::Busy);
}

#[tokio::test]
async fn active_with_dead_port_is_busy() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "done", Some(2230))]);
    assert_eq!(
        status_of(&platform, &ScriptedProber::default(), "ws").await,
        LifecycleState::Busy
    );
}

#[tokio::test]
async fn transient_listing_failure_reads_as_busy() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "done", Some(2230))]);
    platform.inner.lock().unwrap().fail_list = true;
    assert_eq!(
        status_of(&platform, &ScriptedProber::sshd_everywhere(), "ws").await,
        LifecycleState::Busy
    );
}

#[tokio::test]
async fn resolve_is_stateless_across_calls() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "done", Some(2230))]);
    let down = ScriptedProber::default();
    let up = ScriptedProber::sshd_everywhere();

    let reconciler = StatusReconciler::new(&platform, &up, HOST, TIMEOUT);
    assert_eq!(reconciler.resolve("ws").await.unwrap(), LifecycleState::Running);
    let reconciler = StatusReconciler::new(&platform, &down, HOST, TIMEOUT);
    assert_eq!(reconciler.resolve("ws").await.unwrap(), LifecycleState::Busy);
}

#[tokio::test]
async fn await_ready_stops_at_first_running() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "done", Some(2230))]);
    let prober = ScriptedProber::sshd_everywhere();
    let reconciler = StatusReconciler::new(&platform, &prober, HOST, TIMEOUT);
    let sleeper = CountingSleeper::default();

    let outcome = await_ready(
        &reconciler,
        &sleeper,
        "ws",
        PollPolicy::default(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(outcome, AwaitOutcome::Ready);
    assert_eq!(*sleeper.count.borrow(), 0);
}

#[tokio::test]
async fn await_ready_sleeps_between_attempts_only() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "building", Some(2230))]);
    let prober = ScriptedProber::sshd_everywhere();
    let reconciler = StatusReconciler::new(&platform, &prober, HOST, TIMEOUT);
    let sleeper = CountingSleeper::default();
    let policy = PollPolicy {
        max_attempts: 5,
        interval: Duration::from_secs(5),
    };

    let outcome = await_ready(&reconciler, &sleeper, "ws", policy, &CancellationToken::new()).await;

    assert_eq!(outcome, AwaitOutcome::TimedOut { attempts: 5 });
    assert_eq!(*sleeper.count.borrow(), 4);
    assert_eq!(*sleeper.total.borrow(), Duration::from_secs(20));
}

#[tokio::test]
async fn await_ready_honours_prior_cancellation() {
    let platform = InMemoryDokploy::new(vec![ws("ws", "a1", "done", Some(2230))]);
    let prober = ScriptedProber::sshd_everywhere();
    let reconciler = StatusReconciler::new(&platform, &prober, HOST, TIMEOUT);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = await_ready(
        &reconciler,
        &CountingSleeper::default(),
        "ws",
        PollPolicy::default(),
        &cancel,
    )
    .await;

    assert_eq!(outcome, AwaitOutcome::Cancelled);
    assert!(platform.calls().is_empty());
}

/// Answers every lookup with a server error whose body reads like a conflict.
struct BusyServer;

impl LifecycleResolver for BusyServer {
    async fn resolve(&self, _name: &str) -> anyhow::Result<LifecycleState> {
        classify_response(503, r#"{"message":"A deployment is already in progress"}"#)?;
        Ok(LifecycleState::Running)
    }
}

#[tokio::test]
async fn server_error_mentioning_already_reads_as_busy() {
    assert_eq!(current_state(&BusyServer, "ws").await, LifecycleState::Busy);
}
