use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use xcintegrate_core::adapters::{FsWritePort, JsonInstallSource, JsonProjectStore};
use xcintegrate_core::pipeline::{
    run_clean_sandbox, run_integrate, write_clean_artifacts, write_integrate_artifacts,
};
use xcintegrate_core::ports::ProjectStore;
use xcintegrate_core::settings::{CleanSettings, IntegrateSettings};
use xcintegrate_core::NullSink;
use xcintegrate_types::project::{NativeTarget, Project, SymbolType};
use xcintegrate_types::report::ToolInfo;
use xcintegrate_types::target::{InstallSet, IntegrationTarget};

fn tool() -> ToolInfo {
    ToolInfo {
        name: "xcintegrate".into(),
        version: None,
    }
}

fn setup() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");

    let mut project = Project::new("App");
    project
        .targets
        .push(NativeTarget::new("App", SymbolType::Application));
    JsonProjectStore::new(root.join("project.json"))
        .save_project(&project)
        .expect("seed project");

    let install = InstallSet {
        aggregate_targets: vec![IntegrationTarget {
            label: "Pods-App".into(),
            product_basename: "Pods_App".into(),
            user_target_names: vec!["App".into()],
            ..IntegrationTarget::default()
        }],
        ..InstallSet::default()
    };
    std::fs::write(
        root.join("install.json"),
        serde_json::to_string_pretty(&install).expect("serialize"),
    )
    .expect("seed install");

    (temp, root)
}

#[test]
fn integrate_writes_project_and_report() {
    let (_temp, root) = setup();
    let store = JsonProjectStore::new(root.join("project.json"));
    let install = JsonInstallSource::new(root.join("install.json"));

    let outcome = run_integrate(
        &IntegrateSettings::default(),
        &store,
        &install,
        &NullSink,
        tool(),
    )
    .expect("integrate");
    let out_dir = root.join("out");
    write_integrate_artifacts(&outcome, &out_dir, &FsWritePort).expect("write");

    let saved = store.load_project().expect("reload");
    assert_eq!(saved, outcome.project);
    assert_eq!(
        saved.targets[0].build_phases[0].name(),
        Some("[CP] Check Pods Manifest.lock")
    );

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out_dir.join("report.json")).expect("read report"),
    )
    .expect("parse report");
    assert_eq!(report["schema"], "xcintegrate.report.v1");
    assert_eq!(report["targets"][0]["label"], "Pods-App");
    assert!(out_dir.join("report.md").exists());
    assert!(out_dir.join("project.diff").exists());
}

#[test]
fn reintegrating_leaves_file_byte_identical() {
    let (_temp, root) = setup();
    let store = JsonProjectStore::new(root.join("project.json"));
    let install = JsonInstallSource::new(root.join("install.json"));
    let settings = IntegrateSettings::default();

    run_integrate(&settings, &store, &install, &NullSink, tool()).expect("first");
    let first = std::fs::read_to_string(root.join("project.json")).expect("read");
    let outcome = run_integrate(&settings, &store, &install, &NullSink, tool()).expect("second");
    let second = std::fs::read_to_string(root.join("project.json")).expect("read");

    assert_eq!(first, second);
    assert!(outcome.diff.is_empty());
    assert!(outcome.report.is_noop());
}

#[test]
fn malformed_install_set_is_invalid_input() {
    let (_temp, root) = setup();
    std::fs::write(root.join("install.json"), "[1, 2").expect("write");

    let err = run_integrate(
        &IntegrateSettings::default(),
        &JsonProjectStore::new(root.join("project.json")),
        &JsonInstallSource::new(root.join("install.json")),
        &NullSink,
        tool(),
    )
    .err()
    .expect("error");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn clean_dry_run_lists_without_removing() {
    let (_temp, root) = setup();
    let support = root.join("Pods").join("Target Support Files");
    std::fs::create_dir_all(support.join("Pods-App")).expect("mkdir");
    std::fs::create_dir_all(support.join("Pods-Old")).expect("mkdir");
    let install = JsonInstallSource::new(root.join("install.json"));

    let dry = CleanSettings {
        sandbox_root: root.join("Pods"),
        dry_run: true,
        out_dir: None,
    };
    let outcome = run_clean_sandbox(&dry, &install, &NullSink, tool()).expect("dry run");
    assert_eq!(outcome.stale, vec![support.join("Pods-Old")]);
    assert!(support.join("Pods-Old").exists());

    let real = CleanSettings {
        dry_run: false,
        ..dry
    };
    let outcome = run_clean_sandbox(&real, &install, &NullSink, tool()).expect("clean");
    assert!(!support.join("Pods-Old").exists());
    assert!(support.join("Pods-App").exists());
    assert_eq!(outcome.report.counts.sandbox_directories_removed, 1);

    let out_dir = root.join("out");
    write_clean_artifacts(&outcome, &out_dir, &FsWritePort).expect("write");
    let md = std::fs::read_to_string(out_dir.join("report.md")).expect("read");
    assert!(md.contains("Pods-Old"));
}

#[test]
fn integrate_preserves_unmodelled_project_content() {
    let (_temp, root) = setup();
    let raw = serde_json::json!({
        "name": "App",
        "object_version": 56,
        "frameworks_group": {
            "name": "Frameworks",
            "source_tree": "<group>",
            "children": [
                { "id": "R-UIKIT", "path": "UIKit.framework", "source_tree": "SDKROOT", "last_known_file_type": "wrapper.framework" }
            ]
        },
        "targets": [
            {
                "id": "T-APP",
                "name": "App",
                "symbol_type": "application",
                "product_name": "MyApp",
                "build_phases": [
                    { "isa": "PBXSourcesBuildPhase", "id": "P-SOURCES", "files": ["F-main.swift", "F-App.swift"] },
                    {
                        "isa": "PBXFrameworksBuildPhase",
                        "id": "P-LINK",
                        "build_action_mask": 2147483647u64,
                        "files": [{ "id": "B-UIKIT", "file_ref": "R-UIKIT", "settings": { "ATTRIBUTES": ["Weak"] } }]
                    }
                ]
            },
            { "id": "T-PROF", "name": "Profiler", "symbol_type": "instruments_package" }
        ]
    });
    std::fs::write(
        root.join("project.json"),
        serde_json::to_string_pretty(&raw).expect("serialize"),
    )
    .expect("seed project");

    let store = JsonProjectStore::new(root.join("project.json"));
    let install = JsonInstallSource::new(root.join("install.json"));
    let outcome = run_integrate(
        &IntegrateSettings::default(),
        &store,
        &install,
        &NullSink,
        tool(),
    )
    .expect("integrate");
    assert!(!outcome.report.is_noop());

    let saved: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(root.join("project.json")).expect("read"),
    )
    .expect("parse");
    assert_eq!(saved["object_version"], 56);
    assert_eq!(saved["frameworks_group"]["source_tree"], "<group>");
    assert_eq!(
        saved["frameworks_group"]["children"][0]["last_known_file_type"],
        "wrapper.framework"
    );

    let app = &saved["targets"][0];
    assert_eq!(app["product_name"], "MyApp");
    let sources = app["build_phases"]
        .as_array()
        .expect("phases")
        .iter()
        .find(|p| p["id"] == "P-SOURCES")
        .expect("sources phase");
    assert_eq!(sources["files"], serde_json::json!(["F-main.swift", "F-App.swift"]));
    let link = app["build_phases"]
        .as_array()
        .expect("phases")
        .iter()
        .find(|p| p["id"] == "P-LINK")
        .expect("link phase");
    assert_eq!(link["build_action_mask"], 2147483647u64);
    assert_eq!(link["files"][0]["settings"]["ATTRIBUTES"][0], "Weak");

    assert_eq!(saved["targets"][1]["symbol_type"], "instruments_package");
}
