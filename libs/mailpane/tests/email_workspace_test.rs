// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

/// End-to-end tests for wiring email panes together through a workspace.
///
/// Covers the email list → email detail selection flow, a pulled folder
/// link, cycles between panes, and configuration loaded from disk.
use std::sync::Arc;

use mailpane::core::definitions::data_types::{EMAIL_DATA, FOLDER_DATA};
use mailpane::{
    ComponentLifecycle, Definition, DependencyStatus, LinkDefinition, LocalCommunication,
    SyncStrategy, Workspace, WorkspaceConfig, DATA_NOTIFICATION,
};
use serde_json::json;

fn email_panes() -> Arc<LocalCommunication> {
    let comm = Arc::new(LocalCommunication::new());
    comm.register_component("emailList", "emailList");
    comm.register_component("emailDetail", "emailDetail");
    comm.register_component("folderExplorer", "folderExplorer");
    comm
}

fn email_workspace(comm: &Arc<LocalCommunication>) -> Workspace {
    let mut workspace = Workspace::new(WorkspaceConfig::default(), comm.clone());
    workspace.register_definition(Definition::provider("emailList", EMAIL_DATA));
    workspace.register_definition(Definition::consumer("emailDetail", EMAIL_DATA));
    workspace.register_link_definition(
        LinkDefinition::new("email-selection", EMAIL_DATA, "emailList", "emailDetail")
            .with_id("email-selection"),
    );
    workspace
}

#[test]
fn test_selecting_an_email_updates_detail_pane() {
    let comm = email_panes();
    let mut workspace = email_workspace(&comm);

    let link = workspace
        .link(
            "emailList",
            "emailDetail",
            EMAIL_DATA,
            &"email-selection".into(),
            None,
        )
        .expect("Failed to link panes");

    let dependency = workspace.graph().dependency(&link.dependency_id).unwrap();
    assert_eq!(dependency.status, DependencyStatus::Connected);

    workspace
        .runtime_mut()
        .update_dependency_data(&link.instance_id, json!({"id": 42}))
        .expect("Failed to update data");

    let notifications = comm.notifications_to("emailDetail");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, DATA_NOTIFICATION);
    assert_eq!(notifications[0].payload, json!({"id": 42}));

    let instance = workspace.runtime().instance(&link.instance_id).unwrap();
    assert_eq!(instance.current_data, Some(json!({"id": 42})));
}

#[tokio::test]
async fn test_folder_selection_is_pulled() {
    let comm = email_panes();
    comm.respond_with("folderExplorer", |_, _| Ok(json!({"folder": "INBOX", "unread": 3})));

    let mut workspace = email_workspace(&comm);
    workspace.register_definition(Definition::provider("folderExplorer", FOLDER_DATA));
    workspace.register_definition(Definition::consumer("emailList", FOLDER_DATA));
    let folders = workspace.register_link_definition(
        LinkDefinition::new("folder-sync", FOLDER_DATA, "folderExplorer", "emailList")
            .sync(SyncStrategy::Pull),
    );

    let link = workspace
        .link("folderExplorer", "emailList", FOLDER_DATA, &folders, None)
        .unwrap();
    let results = workspace.sync_pending().await;
    assert_eq!(results.len(), 1);
    assert!(results[0].1.is_ok());

    let instance = workspace.runtime().instance(&link.instance_id).unwrap();
    assert_eq!(instance.current_data, Some(json!({"folder": "INBOX", "unread": 3})));

    let dependency = workspace.graph().dependency(&link.dependency_id).unwrap();
    assert_eq!(dependency.status, DependencyStatus::Ready);
    assert_eq!(dependency.performance.update_count, 1);
}

#[test]
fn test_pane_cycle_is_reported_not_rejected() {
    let comm = email_panes();
    let mut workspace = email_workspace(&comm);
    workspace.register_definition(Definition::consumer("emailList", EMAIL_DATA));
    workspace.register_definition(Definition::provider("emailDetail", EMAIL_DATA));
    let reply = workspace.register_link_definition(LinkDefinition::new(
        "reply-context",
        EMAIL_DATA,
        "emailDetail",
        "emailList",
    ));

    workspace
        .link("emailList", "emailDetail", EMAIL_DATA, &"email-selection".into(), None)
        .unwrap();
    let back = workspace
        .link("emailDetail", "emailList", EMAIL_DATA, &reply, None)
        .unwrap();

    let dependency = workspace.graph().dependency(&back.dependency_id).unwrap();
    assert_eq!(dependency.status, DependencyStatus::CycleDetected);
    let instance = workspace.runtime().instance(&back.instance_id).unwrap();
    assert_eq!(instance.status, DependencyStatus::CycleDetected);

    // Data does not loop back through the cyclic link.
    workspace.publish("emailDetail", json!({"id": 1}));
    assert!(comm.notifications_to("emailList").is_empty());

    workspace.handle_lifecycle(&ComponentLifecycle::Unregistered {
        component_id: "emailDetail".into(),
    });
    assert_eq!(workspace.graph().dependency_count(), 0);
    assert_eq!(workspace.graph().chains().count(), 0);
}

#[test]
fn test_unlinking_loop_partner_reconnects_cyclic_link() {
    let comm = email_panes();
    let mut workspace = email_workspace(&comm);
    workspace.register_definition(Definition::consumer("emailList", EMAIL_DATA));
    workspace.register_definition(Definition::provider("emailDetail", EMAIL_DATA));
    let reply = workspace.register_link_definition(LinkDefinition::new(
        "reply-context",
        EMAIL_DATA,
        "emailDetail",
        "emailList",
    ));

    let selection = workspace
        .link("emailList", "emailDetail", EMAIL_DATA, &"email-selection".into(), None)
        .unwrap();
    let back = workspace
        .link("emailDetail", "emailList", EMAIL_DATA, &reply, None)
        .unwrap();
    assert_eq!(
        workspace.runtime().instance(&back.instance_id).unwrap().status,
        DependencyStatus::CycleDetected
    );

    workspace.unlink(&selection.instance_id).unwrap();

    let dependency = workspace.graph().dependency(&back.dependency_id).unwrap();
    assert_eq!(dependency.status, DependencyStatus::Connected);
    let instance = workspace.runtime().instance(&back.instance_id).unwrap();
    assert_eq!(instance.status, DependencyStatus::Connected);
    assert!(instance.is_active);

    let stored = workspace.publish("emailDetail", json!({"id": 9}));
    assert_eq!(stored, vec![back.instance_id.clone()]);
    assert_eq!(comm.notifications_to("emailList").len(), 1);
    assert_eq!(
        workspace.graph().dependency(&back.dependency_id).unwrap().status,
        DependencyStatus::Ready
    );
}

#[test]
fn test_workspace_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(WorkspaceConfig::FILE_NAME),
        "logging:\n  capacity: 3\nruntime:\n  pull_timeout_ms: 250\n",
    )
    .unwrap();

    let config = WorkspaceConfig::load(dir.path()).unwrap();
    assert_eq!(config.logging.capacity, 3);
    assert_eq!(config.suggestions.min_frequency, 2);

    let comm = email_panes();
    let mut workspace = Workspace::new(config, comm.clone());
    workspace.register_definition(Definition::provider("emailList", EMAIL_DATA));
    workspace.register_definition(Definition::consumer("emailDetail", EMAIL_DATA));
    workspace
        .graph_mut()
        .create_dependency("emailList", "emailDetail", EMAIL_DATA)
        .unwrap();

    assert_eq!(workspace.graph().logs().len(), 3);
    assert_eq!(workspace.runtime().config().pull_timeout_ms, Some(250));
}
