//! start / stop / delete and provider init through the public service API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use dokpod_cli::application::services::provider_init::{MachineCheck, init_provider};
use dokpod_cli::application::services::workspace_lifecycle::{LifecycleAction, apply};
use dokpod_cli::domain::WorkspaceError;

use crate::helpers::{CollectingReporter, InMemoryDokploy, ws};

fn platform() -> InMemoryDokploy {
    InMemoryDokploy::new(vec![
        ws("ws-a", "app-a", "done", Some(2222)),
        ws("ws-b", "app-b", "idle", Some(2223)),
    ])
}

#[tokio::test]
async fn stop_then_start_target_the_named_resource() {
    let platform = platform();
    let reporter = CollectingReporter::default();

    apply(&platform, &reporter, "ws-a", LifecycleAction::Stop)
        .await
        .unwrap();
    apply(&platform, &reporter, "ws-b", LifecycleAction::Start)
        .await
        .unwrap();

    let calls = platform.calls();
    assert!(calls.contains(&"stop:app-a".to_string()));
    assert!(calls.contains(&"start:app-b".to_string()));
    assert_eq!(platform.resource_named("ws-a").unwrap().platform_status, "idle");
}

#[tokio::test]
async fn delete_removes_only_that_workspace() {
    let platform = platform();
    apply(
        &platform,
        &CollectingReporter::default(),
        "ws-a",
        LifecycleAction::Delete,
    )
    .await
    .unwrap();

    assert!(platform.resource_named("ws-a").is_none());
    assert!(platform.resource_named("ws-b").is_some());
}

#[tokio::test]
async fn missing_workspace_is_a_hard_error_for_every_action() {
    for action in [
        LifecycleAction::Start,
        LifecycleAction::Stop,
        LifecycleAction::Delete,
    ] {
        let platform = platform();
        let err = apply(&platform, &CollectingReporter::default(), "ghost", action)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<WorkspaceError>(),
                Some(WorkspaceError::NotFound(name)) if name == "ghost"
            ),
            "{action:?}: {err:#}"
        );
    }
}

#[tokio::test]
async fn init_reports_existing_machine_port() {
    let platform = platform();
    let check = init_provider(&platform, &CollectingReporter::default(), Some("ws-b"))
        .await
        .unwrap();
    assert_eq!(check, MachineCheck::Present { ssh_port: Some(2223) });
    assert_eq!(platform.calls()[0], "health");
}
