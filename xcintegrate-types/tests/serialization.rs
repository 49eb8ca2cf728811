use pretty_assertions::assert_eq;
use xcintegrate_types::events::{EventCounts, IntegrationEvent};
use xcintegrate_types::project::{BuildPhase, ObjectId, PhaseIsa, Project, SymbolType};
use xcintegrate_types::report::{IntegrationReport, TargetReport, ToolInfo};
use xcintegrate_types::target::{ExecutionPosition, InstallSet, ScriptPhaseDescriptor};

#[test]
fn build_phases_are_tagged_by_isa() {
    let phase = BuildPhase::new(
        PhaseIsa::ShellScript,
        ObjectId("P1".into()),
        Some("[CP] Check Pods Manifest.lock".into()),
    );
    let value = serde_json::to_value(&phase).expect("serialize");
    assert_eq!(value["isa"], "PBXShellScriptBuildPhase");
    assert_eq!(value["id"], "P1");
    assert_eq!(value["name"], "[CP] Check Pods Manifest.lock");

    let sources: BuildPhase =
        serde_json::from_str(r#"{ "isa": "PBXSourcesBuildPhase", "id": "S1" }"#)
            .expect("deserialize");
    assert_eq!(sources.isa(), PhaseIsa::Sources);
    assert_eq!(sources.name(), None);
}

#[test]
fn project_defaults_fill_missing_sections() {
    let project: Project = serde_json::from_str(r#"{ "name": "App" }"#).expect("deserialize");
    assert_eq!(project.schema, "xcintegrate.project.v1");
    assert_eq!(project.frameworks_group.name, "Frameworks");
    assert!(project.targets.is_empty());
}

#[test]
fn project_round_trip_keeps_unknown_content() {
    let raw = serde_json::json!({
        "schema": "xcintegrate.project.v1",
        "name": "App",
        "object_version": 56,
        "frameworks_group": {
            "name": "Frameworks",
            "children": [],
            "source_tree": "<group>"
        },
        "targets": [
            {
                "id": "T1",
                "name": "Clip",
                "symbol_type": "on_demand_install_capable_application",
                "product_name": "Clip",
                "build_phases": [
                    { "isa": "PBXResourcesBuildPhase", "id": "R1", "files": ["F-Assets"] }
                ]
            }
        ]
    });
    let project: Project = serde_json::from_value(raw.clone()).expect("deserialize");
    let clip = &project.targets[0];
    assert_eq!(
        clip.symbol_type,
        SymbolType::Other("on_demand_install_capable_application".into())
    );
    assert!(!clip.symbol_type.embeds_frameworks());

    let saved = serde_json::to_string_pretty(&project).expect("serialize");
    let reloaded: serde_json::Value = serde_json::from_str(&saved).expect("reparse");
    assert_eq!(reloaded, raw);
}

#[test]
fn script_phase_descriptor_omits_unset_fields() {
    let descriptor = ScriptPhaseDescriptor::new("Lint", "swiftlint").at(ExecutionPosition::AfterCompile);
    let value = serde_json::to_value(&descriptor).expect("serialize");
    assert_eq!(value["execution_position"], "after_compile");
    assert!(value.get("shell_path").is_none());
    assert!(value.get("input_files").is_none());
}

#[test]
fn install_set_defaults_to_empty() {
    let install: InstallSet = serde_json::from_str("{}").expect("deserialize");
    assert_eq!(install.schema, "xcintegrate.install.v1");
    assert!(install.aggregate_targets.is_empty());
    assert!(install.units.is_empty());
}

#[test]
fn events_are_tagged_by_type() {
    let event = IntegrationEvent::PhaseMoved {
        native_target: "App".into(),
        phase: "[CP] Check Pods Manifest.lock".into(),
        from: 3,
        to: 0,
    };
    let value = serde_json::to_value(&event).expect("serialize");
    assert_eq!(value["type"], "phase_moved");
    assert_eq!(value["type"], event.kind());
    assert_eq!(value["from"], 3);
}

#[test]
fn report_omits_empty_sandbox_list() {
    let mut report = IntegrationReport::new(ToolInfo {
        name: "xcintegrate".into(),
        version: Some("0.1.0".into()),
    });
    let events = vec![IntegrationEvent::ProductReferenceAdded {
        native_target: "App".into(),
        path: "libPods_App.a".into(),
    }];
    report.counts = EventCounts::from_events(&events);
    report.targets.push(TargetReport {
        label: "Pods-App".into(),
        native_targets: vec!["App".into()],
        missing_native_targets: vec![],
        counts: report.counts,
        events,
    });

    let value = serde_json::to_value(&report).expect("serialize");
    assert_eq!(value["schema"], "xcintegrate.report.v1");
    assert!(value.get("sandbox_removed").is_none());
    assert_eq!(value["counts"]["product_references_added"], 1);
    assert_eq!(
        value["targets"][0]["events"][0]["type"],
        "product_reference_added"
    );
    assert!(!report.is_noop());
}
