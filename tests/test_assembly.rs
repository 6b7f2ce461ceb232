//! End-to-end assembly tests: a configuration document in, a frozen service
//! graph (or a descriptive error) out.

use cronwire::{
    Assembler, Capability, CollaboratorCatalog, CollaboratorType, ConfigDocument, GraphBuilder,
    ParameterTable, Recipe, Registration, SetupCall, StartupAction, TASK_TAG,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn assembler() -> Assembler {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Assembler::new(ParameterTable::with_defaults("/tmp/app", false))
}

/// The spec'd end-to-end scenario: two tasks, no storage or driver override.
#[test]
fn test_default_stack_with_two_tasks() {
    let doc = ConfigDocument::from_yaml_str(
        r#"
tasks:
  - taskA
  - entity: taskB
    args: [5]
"#,
    )
    .unwrap();

    let graph = assembler().assemble(&doc).unwrap();

    // Default file-backed store and file-based driver.
    assert_eq!(
        graph.get("cron.timestampStorage").unwrap().recipe,
        Recipe::Type {
            name: "FileTimestampStorage".to_string(),
            args: vec![json!("/tmp/app/cron")],
        }
    );
    assert_eq!(
        graph.get("cron.criticalSectionDriver").unwrap().recipe,
        Recipe::Type {
            name: "FileMutexDriver".to_string(),
            args: vec![json!("/tmp/app/critical-section")],
        }
    );

    // Exactly two task registrations, both attached to the coordinator.
    let task_keys = graph.keys_by_tag(TASK_TAG);
    assert_eq!(task_keys.len(), 2);
    let coordinator = graph.get("cron.coordinator").unwrap();
    assert_eq!(
        coordinator.setup_calls,
        vec![SetupCall::AddTasks(task_keys)]
    );

    // No log hook, no diagnostics panel.
    assert!(!coordinator
        .setup_calls
        .iter()
        .any(|call| matches!(call, SetupCall::SetLogService(_))));
    assert!(!graph.contains("cron.diagnostics"));
    assert!(graph.startup_actions().is_empty());
}

/// Exactly one registration per pluggable slot, never zero, never two.
#[test]
fn test_one_registration_per_slot() {
    let graph = assembler().assemble(&ConfigDocument::new()).unwrap();

    for slot in ["cron.timestampStorage", "cron.criticalSectionDriver"] {
        assert!(graph.contains(slot), "slot {slot} missing");
    }
    // The whole default graph: storage, driver, critical section,
    // coordinator. Nothing extra.
    assert_eq!(graph.len(), 4);
}

/// Duplicate bare identifiers collapse to a single attached task.
#[test]
fn test_duplicate_tasks_attach_once() {
    let doc = ConfigDocument::new().with_option("tasks", json!(["taskA", "taskA"]));
    let graph = assembler().assemble(&doc).unwrap();

    let task_keys = graph.keys_by_tag(TASK_TAG);
    assert_eq!(task_keys.len(), 1);
    assert_eq!(
        graph.get("cron.coordinator").unwrap().setup_calls,
        vec![SetupCall::AddTasks(task_keys)]
    );
}

/// Distinct declarations with distinct hashes produce distinct registrations.
#[test]
fn test_distinct_tasks_stay_distinct() {
    let doc = ConfigDocument::new().with_option(
        "tasks",
        json!(["taskA", {"entity": "taskA", "args": [1]}, {"entity": "taskA", "args": [2]}]),
    );
    let graph = assembler().assemble(&doc).unwrap();
    assert_eq!(graph.keys_by_tag(TASK_TAG).len(), 3);
}

/// Placeholders in task descriptor arguments are expanded against the
/// parameter table before the registration is created.
#[test]
fn test_task_args_are_expanded() {
    let doc = ConfigDocument::new().with_option(
        "tasks",
        json!([{"entity": "ScratchTask", "args": ["%tempDir%/scratch"]}]),
    );

    let graph = assembler().assemble(&doc).unwrap();
    let task_keys = graph.keys_by_tag(TASK_TAG);
    assert_eq!(task_keys.len(), 1);
    assert_eq!(
        graph.get(&task_keys[0]).unwrap().recipe,
        Recipe::Construct {
            entity: "ScratchTask".to_string(),
            args: vec![json!("/tmp/app/scratch")],
        }
    );
}

/// Two pre-seeded candidates for the same capability and no explicit
/// configuration: assembly fails, it does not pick one.
#[test]
fn test_ambiguous_auto_discovery_aborts_assembly() {
    let mut builder = GraphBuilder::new();
    for (key, entity) in [("app.store1", "StoreA"), ("app.store2", "StoreB")] {
        builder
            .add(
                Registration::construct(key, entity, vec![])
                    .provides(Capability::TimestampStore),
            )
            .unwrap();
    }

    let err = assembler()
        .assemble_into(&ConfigDocument::new(), builder)
        .unwrap_err();
    assert!(matches!(
        err,
        cronwire::AssemblyError::ResolutionAmbiguity { .. }
    ));
}

/// A single pre-seeded candidate is discovered and aliased.
#[test]
fn test_unique_candidate_is_discovered() {
    let mut builder = GraphBuilder::new();
    builder
        .add(
            Registration::construct("app.store", "RedisStorage", vec![])
                .provides(Capability::TimestampStore),
        )
        .unwrap();

    let graph = assembler()
        .assemble_into(&ConfigDocument::new(), builder)
        .unwrap();
    assert_eq!(
        graph.get("cron.timestampStorage").unwrap().recipe,
        Recipe::Alias("app.store".to_string())
    );
}

/// A log hook missing log_end fails naming log_end specifically.
#[test]
fn test_log_hook_missing_log_end() {
    let catalog = CollaboratorCatalog::builtin()
        .with_type(CollaboratorType::new("StartOnlyLog").with_operations(["log_start"]));
    let doc = ConfigDocument::new().with_option("logService", json!("StartOnlyLog"));

    let err = assembler().with_catalog(catalog).assemble(&doc).unwrap_err();
    match err {
        cronwire::AssemblyError::MissingCapability {
            collaborator,
            operation,
        } => {
            assert_eq!(collaborator, "StartOnlyLog");
            assert_eq!(operation, "log_end");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// A conforming log hook is attached by a late-binding setup call.
#[test]
fn test_log_hook_attached_when_conformant() {
    let catalog = CollaboratorCatalog::builtin().with_type(
        CollaboratorType::new("AuditLog")
            .with_capability(Capability::LogHook)
            .with_operations(["log_start", "log_end"]),
    );
    let doc = ConfigDocument::new().with_option("logService", json!("AuditLog"));

    let graph = assembler().with_catalog(catalog).assemble(&doc).unwrap();
    assert!(graph
        .get("cron.coordinator")
        .unwrap()
        .setup_calls
        .contains(&SetupCall::SetLogService("AuditLog".to_string())));
}

/// showDiagnosticsPanel = false: no panel registration, no startup action,
/// even in debug mode.
#[test]
fn test_panel_disabled_explicitly() {
    let doc = ConfigDocument::new().with_option("showDiagnosticsPanel", json!(false));
    let graph = Assembler::new(ParameterTable::with_defaults("/tmp/app", true))
        .assemble(&doc)
        .unwrap();

    assert!(!graph.contains("cron.diagnostics"));
    assert!(graph.startup_actions().is_empty());
}

/// showDiagnosticsPanel = true outside debug mode still registers the panel
/// and defers its attachment to startup.
#[test]
fn test_panel_enabled_explicitly() {
    let doc = ConfigDocument::new().with_option("showDiagnosticsPanel", json!(true));
    let graph = assembler().assemble(&doc).unwrap();

    assert!(graph.contains("cron.diagnostics"));
    assert_eq!(
        graph.startup_actions(),
        &[StartupAction::AttachDiagnosticsPanel {
            panel: "cron.diagnostics".to_string(),
            host: "DiagnosticsHost".to_string(),
            coordinator: "cron.coordinator".to_string(),
            storage: "cron.timestampStorage".to_string(),
        }]
    );
}

/// Invalid shapes abort before any resolution happens.
#[test]
fn test_shape_error_aborts_before_resolution() {
    let doc = ConfigDocument::new()
        .with_option("timestampStorage", json!(17))
        .with_option("tasks", json!(["taskA"]));

    let err = assembler().assemble(&doc).unwrap_err();
    match err {
        cronwire::AssemblyError::ConfigShape { option, .. } => {
            assert_eq!(option, "timestampStorage");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Assembly is deterministic: identical input, identical graph.
#[test]
fn test_assembly_is_deterministic() {
    let doc = ConfigDocument::from_yaml_str(
        r#"
tasks:
  - taskC
  - taskA
  - entity: taskB
    args: [5, "%tempDir%/scratch"]
maxExecutionTime: 120
"#,
    )
    .unwrap();

    let first = assembler().assemble(&doc).unwrap();
    let second = assembler().assemble(&doc).unwrap();
    assert_eq!(first, second);
}

/// An explicit descriptor for a slot is used verbatim, with placeholder
/// arguments expanded.
#[test]
fn test_descriptor_slot_override() {
    let doc = ConfigDocument::new().with_option(
        "criticalSectionDriver",
        json!({"entity": "RedisMutexDriver", "args": ["%tempDir%/locks", 3]}),
    );

    let graph = assembler().assemble(&doc).unwrap();
    assert_eq!(
        graph.get("cron.criticalSectionDriver").unwrap().recipe,
        Recipe::Construct {
            entity: "RedisMutexDriver".to_string(),
            args: vec![json!("/tmp/app/locks"), json!(3)],
        }
    );
}
