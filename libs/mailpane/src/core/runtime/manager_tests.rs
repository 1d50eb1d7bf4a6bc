// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Runtime manager tests against the in-process `LocalCommunication`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};

use super::*;
use crate::core::config::RuntimeConfig;
use crate::core::definitions::data_types;
use crate::core::error::{DependencyError, Result};
use crate::core::graph::DependencyStatus;
use crate::core::pubsub::{topics, Event, EventBus, EventListener, RuntimeEvent};

// =============================================================================
// Helpers
// =============================================================================

const SELECTION: &str = "email-selection";
const FOLDER_SYNC: &str = "folder-sync";

fn communication() -> Arc<LocalCommunication> {
    let comm = Arc::new(LocalCommunication::new());
    comm.register_component("list", "emailList");
    comm.register_component("detail", "emailDetail");
    comm.register_component("folders", "folderExplorer");
    comm
}

fn selection_definition() -> LinkDefinition {
    LinkDefinition::new(SELECTION, data_types::EMAIL_DATA, "emailList", "emailDetail")
        .with_id(SELECTION)
        .option(
            ConfigOption::new("sortOrder")
                .default_value(json!("date"))
                .choices([json!("date"), json!("sender")]),
        )
}

fn folder_definition() -> LinkDefinition {
    LinkDefinition::new(FOLDER_SYNC, data_types::FOLDER_DATA, "folderExplorer", "emailList")
        .with_id(FOLDER_SYNC)
        .sync(SyncStrategy::Pull)
}

fn manager_with(comm: &Arc<LocalCommunication>, config: RuntimeConfig) -> RuntimeManager {
    let mut manager = RuntimeManager::with_config(config, comm.clone(), Arc::new(EventBus::new()));
    manager.register_definition(selection_definition());
    manager.register_definition(folder_definition());
    manager
}

fn manager(comm: &Arc<LocalCommunication>) -> RuntimeManager {
    manager_with(comm, RuntimeConfig::default())
}

fn selection(
    manager: &mut RuntimeManager,
    config: Option<InstanceConfig>,
) -> crate::core::ids::InstanceId {
    manager
        .create_dependency(&SELECTION.into(), "list", "detail", config)
        .expect("selection link")
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl EventListener for Recorder {
    fn on_event(&mut self, event: &Event) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

// =============================================================================
// Creation and configuration
// =============================================================================

#[test]
fn test_create_push_instance() {
    let comm = communication();
    let mut manager = manager(&comm);

    let id = selection(&mut manager, None);
    let instance = manager.instance(&id).unwrap();

    assert_eq!(instance.status, DependencyStatus::Connected);
    assert!(instance.is_active);
    assert!(!instance.is_ready);
    assert_eq!(instance.provider_type, "emailList");
    assert_eq!(instance.config.options.get("sortOrder"), Some(&json!("date")));
    assert_eq!(comm.push_handlers("list"), vec![id.clone()]);
    assert_eq!(manager.pending_sync().count(), 0);
    assert_eq!(manager.instances_by_provider("list").len(), 1);
    assert_eq!(manager.instances_by_consumer("detail").len(), 1);
}

#[test]
fn test_create_rejects_wrong_component_types() {
    let comm = communication();
    let mut manager = manager(&comm);

    let err = manager
        .create_dependency(&SELECTION.into(), "detail", "list", None)
        .unwrap_err();
    assert!(matches!(err, DependencyError::TypeMismatch { .. }));
    assert_eq!(manager.instance_count(), 0);
}

#[test]
fn test_create_reports_missing_lookups() {
    let comm = communication();
    let mut manager = manager(&comm);

    let err = manager
        .create_dependency(&"unknown".into(), "list", "detail", None)
        .unwrap_err();
    assert!(err.is_not_found());

    let err = manager
        .create_dependency(&SELECTION.into(), "list", "ghost", None)
        .unwrap_err();
    assert!(matches!(err, DependencyError::ComponentNotFound(_)));
}

#[test]
fn test_create_rejects_invalid_choice() {
    let comm = communication();
    let mut manager = manager(&comm);

    let config = InstanceConfig::new().option("sortOrder", json!("size"));
    let err = manager
        .create_dependency(&SELECTION.into(), "list", "detail", Some(config))
        .unwrap_err();
    assert!(matches!(err, DependencyError::Validation(_)));
    assert_eq!(manager.instance_count(), 0);
}

#[test]
fn test_create_twice_updates_in_place() {
    let comm = communication();
    let mut manager = manager(&comm);

    let first = selection(&mut manager, None);
    let second = selection(
        &mut manager,
        Some(InstanceConfig::new().option("sortOrder", json!("sender"))),
    );

    assert_eq!(first, second);
    assert_eq!(manager.instance_count(), 1);
    assert_eq!(
        manager.instance(&first).unwrap().config.options.get("sortOrder"),
        Some(&json!("sender"))
    );
}

#[test]
fn test_invalid_config_update_leaves_previous_config() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, None);

    manager
        .update_dependency_config(&id, InstanceConfig::new().option("sortOrder", json!("sender")))
        .unwrap();
    let err = manager
        .update_dependency_config(&id, InstanceConfig::new().option("sortOrder", json!("size")))
        .unwrap_err();

    assert!(matches!(err, DependencyError::Validation(_)));
    assert_eq!(
        manager.instance(&id).unwrap().config.options.get("sortOrder"),
        Some(&json!("sender"))
    );
}

// =============================================================================
// Data flow
// =============================================================================

#[test]
fn test_update_data_stores_and_notifies() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, None);

    let outcome = manager.update_dependency_data(&id, json!({"id": 42})).unwrap();
    assert_eq!(outcome, DataOutcome::Stored);

    let instance = manager.instance(&id).unwrap();
    assert_eq!(instance.current_data, Some(json!({"id": 42})));
    assert!(instance.is_ready);
    assert_eq!(instance.status, DependencyStatus::Ready);

    let notifications = comm.notifications_to("detail");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].from, "list");
    assert_eq!(notifications[0].kind, DATA_NOTIFICATION);
    assert_eq!(notifications[0].payload, json!({"id": 42}));
}

#[test]
fn test_filtered_data_changes_nothing() {
    let comm = communication();
    let mut manager = manager(&comm);
    let config = InstanceConfig::new().filter(|data| data["unread"] == json!(true));
    let id = selection(&mut manager, Some(config));

    manager.update_dependency_data(&id, json!({"id": 1, "unread": true})).unwrap();
    let before = manager.instance(&id).unwrap().clone();
    comm.clear_notifications();

    let outcome = manager
        .update_dependency_data(&id, json!({"id": 2, "unread": false}))
        .unwrap();

    assert_eq!(outcome, DataOutcome::Filtered);
    let after = manager.instance(&id).unwrap();
    assert_eq!(after.current_data, before.current_data);
    assert_eq!(after.last_updated, before.last_updated);
    assert!(comm.notifications().is_empty());
}

#[test]
fn test_auto_update_false_stores_without_notifying() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, Some(InstanceConfig::new().auto_update(false)));

    manager.update_dependency_data(&id, json!({"id": 3})).unwrap();

    assert_eq!(manager.instance(&id).unwrap().current_data, Some(json!({"id": 3})));
    assert!(comm.notifications().is_empty());
}

#[test]
fn test_instance_transform_overrides_definition_transform() {
    let comm = communication();
    let mut manager = RuntimeManager::new(comm.clone());
    let definition_id = manager.register_definition(
        LinkDefinition::new("ids", data_types::EMAIL_DATA, "emailList", "emailDetail")
            .transform(|data| json!({"id": data["id"], "source": "definition"})),
    );

    let plain = manager
        .create_dependency(&definition_id, "list", "detail", None)
        .unwrap();
    manager.update_dependency_data(&plain, json!({"id": 5, "body": "..."})).unwrap();
    assert_eq!(
        manager.instance(&plain).unwrap().current_data,
        Some(json!({"id": 5, "source": "definition"}))
    );

    manager
        .update_dependency_config(
            &plain,
            InstanceConfig::new().transform(|data| json!({"id": data["id"], "source": "instance"})),
        )
        .unwrap();
    manager.update_dependency_data(&plain, json!({"id": 6})).unwrap();
    assert_eq!(
        manager.instance(&plain).unwrap().current_data,
        Some(json!({"id": 6, "source": "instance"}))
    );
}

#[test]
fn test_validator_rejection_leaves_state() {
    let comm = communication();
    let mut manager = RuntimeManager::new(comm.clone());
    let definition_id = manager.register_definition(
        LinkDefinition::new("ids", data_types::EMAIL_DATA, "emailList", "emailDetail")
            .validator(|data| data.get("id").is_some()),
    );
    let id = manager
        .create_dependency(&definition_id, "list", "detail", None)
        .unwrap();

    let err = manager
        .update_dependency_data(&id, json!({"subject": "no id"}))
        .unwrap_err();

    assert!(matches!(err, DependencyError::Validation(_)));
    let instance = manager.instance(&id).unwrap();
    assert!(instance.current_data.is_none());
    assert_eq!(instance.status, DependencyStatus::Connected);
    assert!(comm.notifications().is_empty());
}

#[test]
fn test_notify_component_skips_suspended() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, None);

    assert_eq!(manager.notify_component_dependencies("list", json!({"id": 1})), vec![id.clone()]);

    manager.suspend(&id).unwrap();
    assert!(manager.notify_component_dependencies("list", json!({"id": 2})).is_empty());
    assert_eq!(manager.instance(&id).unwrap().current_data, Some(json!({"id": 1})));
}

#[test]
fn test_data_event_published() {
    let comm = communication();
    let bus = Arc::new(EventBus::new());
    let recorder = Arc::new(Mutex::new(Recorder::default()));
    bus.subscribe(topics::DATA, recorder.clone());

    let mut manager = RuntimeManager::with_config(RuntimeConfig::default(), comm.clone(), bus);
    manager.register_definition(selection_definition());
    let id = selection(&mut manager, None);
    manager.update_dependency_data(&id, json!({"id": 9})).unwrap();

    let recorder = recorder.lock();
    assert_eq!(recorder.events.len(), 1);
    match &recorder.events[0] {
        Event::Runtime(RuntimeEvent::DataUpdated { instance_id, data, .. }) => {
            assert_eq!(instance_id, &id);
            assert_eq!(data, &json!({"id": 9}));
        }
        other => panic!("unexpected event {:?}", other),
    }
}

// =============================================================================
// Pull
// =============================================================================

#[tokio::test]
async fn test_request_data_rejected_for_push_links() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, None);

    let err = manager.request_data(&id, None).await.unwrap_err();
    assert!(matches!(err, DependencyError::UnsupportedStrategy { .. }));
}

#[tokio::test]
async fn test_pull_instance_syncs_initial_data() {
    let comm = communication();
    comm.respond_with("folders", |method, payload| {
        assert_eq!(method, DATA_REQUEST);
        assert_eq!(payload["dataType"], data_types::FOLDER_DATA);
        Ok(json!({"folder": "inbox"}))
    });
    let mut manager = manager(&comm);

    let id = manager
        .create_dependency(&FOLDER_SYNC.into(), "folders", "list", None)
        .unwrap();
    assert!(comm.push_handlers("folders").is_empty());
    assert_eq!(manager.pending_sync().count(), 1);

    let results = manager.sync_pending().await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0].1, Ok(DataOutcome::Stored)));
    assert_eq!(manager.pending_sync().count(), 0);

    let instance = manager.instance(&id).unwrap();
    assert_eq!(instance.current_data, Some(json!({"folder": "inbox"})));
    assert_eq!(comm.notifications_to("list").len(), 1);
}

#[tokio::test]
async fn test_request_passes_params() {
    let comm = communication();
    comm.respond_with("folders", |_, payload| Ok(payload["params"].clone()));
    let mut manager = manager(&comm);
    let id = manager
        .create_dependency(&FOLDER_SYNC.into(), "folders", "list", None)
        .unwrap();

    manager
        .request_data(&id, Some(json!({"path": "Archive/2024"})))
        .await
        .unwrap();
    assert_eq!(
        manager.instance(&id).unwrap().current_data,
        Some(json!({"path": "Archive/2024"}))
    );
}

#[tokio::test]
async fn test_pull_failure_marks_error_and_reraises() {
    let comm = communication();
    comm.respond_with("folders", |_, _| {
        Err(DependencyError::Communication("mailbox offline".into()))
    });
    let mut manager = manager(&comm);
    let id = manager
        .create_dependency(&FOLDER_SYNC.into(), "folders", "list", None)
        .unwrap();

    let err = manager.request_data(&id, None).await.unwrap_err();
    assert!(matches!(err, DependencyError::PullFailed(_)));

    let instance = manager.instance(&id).unwrap();
    assert_eq!(instance.status, DependencyStatus::Error);
    assert!(instance.error.as_deref().unwrap_or_default().contains("mailbox offline"));
    assert!(!instance.is_active);
}

#[tokio::test]
async fn test_pull_timeout_maps_to_error() {
    let comm = communication();
    comm.respond_with("folders", |_, _| Ok(Value::Null));
    comm.set_latency("folders", Duration::from_millis(500));
    let mut manager = manager_with(
        &comm,
        RuntimeConfig {
            pull_timeout_ms: Some(20),
        },
    );
    let id = manager
        .create_dependency(&FOLDER_SYNC.into(), "folders", "list", None)
        .unwrap();

    let err = manager.request_data(&id, None).await.unwrap_err();
    assert!(matches!(err, DependencyError::Timeout(20)));
    assert_eq!(manager.instance(&id).unwrap().status, DependencyStatus::Error);
}

#[tokio::test]
async fn test_reactivation_queues_resync() {
    let comm = communication();
    comm.respond_with("folders", |_, _| Err(DependencyError::Communication("down".into())));
    let mut manager = manager(&comm);
    let id = manager
        .create_dependency(&FOLDER_SYNC.into(), "folders", "list", None)
        .unwrap();

    let results = manager.sync_pending().await;
    assert!(results[0].1.is_err());
    assert_eq!(manager.pending_sync().count(), 0);

    comm.respond_with("folders", |_, _| Ok(json!({"folder": "sent"})));
    manager
        .set_dependency_status(&id, DependencyStatus::Connected, None)
        .unwrap();
    assert_eq!(manager.pending_sync().count(), 1);

    manager.sync_pending().await;
    let instance = manager.instance(&id).unwrap();
    assert_eq!(instance.status, DependencyStatus::Ready);
    assert!(instance.error.is_none());
}

// =============================================================================
// Status and lifecycle
// =============================================================================

#[test]
fn test_suspend_resume_transitions() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, None);

    manager.suspend(&id).unwrap();
    assert_eq!(manager.instance(&id).unwrap().status, DependencyStatus::Suspended);
    assert!(!manager.instance(&id).unwrap().is_active);
    assert!(manager.suspend(&id).is_err());

    manager.resume(&id).unwrap();
    assert_eq!(manager.instance(&id).unwrap().status, DependencyStatus::Connected);
    assert!(manager.resume(&id).is_err());
}

#[test]
fn test_set_status_on_unknown_instance() {
    let comm = communication();
    let mut manager = manager(&comm);
    let err = manager
        .set_dependency_status(&"ins_missing".into(), DependencyStatus::Ready, None)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_visibility_suspends_and_resumes_without_removing() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, None);

    let hidden = ComponentLifecycle::VisibilityChanged {
        component_id: "detail".into(),
        visible: false,
    };
    assert_eq!(manager.handle_lifecycle(&hidden), 1);
    assert_eq!(manager.instance(&id).unwrap().status, DependencyStatus::Suspended);

    let shown = ComponentLifecycle::VisibilityChanged {
        component_id: "detail".into(),
        visible: true,
    };
    assert_eq!(manager.handle_lifecycle(&shown), 1);
    assert_eq!(manager.instance(&id).unwrap().status, DependencyStatus::Connected);
    assert_eq!(manager.instance_count(), 1);
}

#[test]
fn test_unregister_cascades_removal() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, None);
    manager
        .create_dependency(&FOLDER_SYNC.into(), "folders", "list", None)
        .unwrap();

    let removed = manager.handle_lifecycle(&ComponentLifecycle::Unregistered {
        component_id: "list".into(),
    });

    assert_eq!(removed, 2);
    assert!(manager.instance(&id).is_none());
    assert!(manager.instances_by_provider("list").is_empty());
    assert_eq!(manager.pending_sync().count(), 0);
    assert!(comm.push_handlers("list").is_empty());
}

#[test]
fn test_reset_clears_data() {
    let comm = communication();
    let mut manager = manager(&comm);
    let id = selection(&mut manager, None);
    manager.update_dependency_data(&id, json!({"id": 1})).unwrap();

    assert_eq!(manager.reset_component_dependencies("detail"), 1);

    let instance = manager.instance(&id).unwrap();
    assert!(instance.current_data.is_none());
    assert!(!instance.is_ready);
    assert_eq!(instance.status, DependencyStatus::Connected);
}

#[test]
fn test_remove_definition_removes_instances() {
    let comm = communication();
    let mut manager = manager(&comm);
    selection(&mut manager, None);

    assert!(manager.remove_definition(&SELECTION.into()).is_some());
    assert_eq!(manager.instance_count(), 0);
    assert!(manager.definition(&SELECTION.into()).is_none());
}
