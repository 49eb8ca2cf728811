//! Core integrate and clean-sandbox pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: the project graph, the install set and report
//! artifacts all go through the port traits.

use crate::ports::{InstallSource, ProjectStore, WritePort};
use crate::render::render_report_md;
use crate::settings::{CleanSettings, IntegrateSettings};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use tracing::{debug, info};
use xcintegrate_domain::{
    EventSink, RecordingSink, Sandbox, TargetIntegrator, clean_sandbox, stale_sandbox_dirs,
};
use xcintegrate_types::events::{EventCounts, IntegrationEvent};
use xcintegrate_types::project::Project;
use xcintegrate_types::report::{IntegrationReport, TargetReport, ToolInfo};
use xcintegrate_types::target::{InstallSet, IntegrationTarget};

/// Error type for pipeline results. Exit code 2 = invalid input, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::InvalidInput(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }

    /// Classify a load failure: malformed JSON is the caller's input problem, anything else
    /// (missing file, permissions) is ours.
    pub fn from_load(err: anyhow::Error) -> Self {
        if err.chain().any(|c| c.is::<serde_json::Error>()) {
            ToolError::InvalidInput(format!("{err:#}"))
        } else {
            ToolError::Internal(err)
        }
    }
}

/// Outcome of `run_integrate`.
pub struct IntegrateOutcome {
    pub project: Project,
    pub report: IntegrationReport,
    /// Unified diff of the project snapshot, empty when nothing changed.
    pub diff: String,
}

/// Integrate the selected aggregate targets into the stored project.
///
/// Targets are integrated one after another against the same project graph, which is saved
/// once at the end (never in dry-run mode, never when nothing changed).
pub fn run_integrate(
    settings: &IntegrateSettings,
    store: &dyn ProjectStore,
    install: &dyn InstallSource,
    sink: &dyn EventSink,
    tool: ToolInfo,
) -> Result<IntegrateOutcome, ToolError> {
    let started_at = Utc::now();

    let mut project = store.load_project().map_err(ToolError::from_load)?;
    let install = install.load_install_set().map_err(ToolError::from_load)?;
    let targets = select_targets(&install, &settings.labels)?;

    let before = snapshot_json(&project)?;
    let mut report = IntegrationReport::new(tool);
    report.run.started_at = Some(started_at);
    report.run.dry_run = settings.dry_run;

    let mut all_events: Vec<IntegrationEvent> = Vec::new();
    for target in targets {
        let outcome = TargetIntegrator::new(target, settings.options).integrate(&mut project, sink);
        debug!(target = %target.label, events = outcome.events.len(), "integrated target");
        all_events.extend(outcome.events.iter().cloned());
        report.targets.push(TargetReport {
            label: target.label.clone(),
            native_targets: outcome.native_targets,
            missing_native_targets: outcome.missing_native_targets,
            counts: outcome.counts,
            events: outcome.events,
        });
    }
    report.counts = EventCounts::from_events(&all_events);

    let after = snapshot_json(&project)?;
    let diff = if before == after {
        String::new()
    } else {
        diffy::create_patch(&before, &after).to_string()
    };

    if settings.dry_run {
        info!("dry run, project left untouched");
    } else if diff.is_empty() {
        info!("project already up to date");
    } else {
        store.save_project(&project).context("save project")?;
        info!(targets = report.targets.len(), "integrated project");
    }

    report.run.ended_at = Some(Utc::now());
    Ok(IntegrateOutcome {
        project,
        report,
        diff,
    })
}

/// Write report.json, report.md and (when non-empty) project.diff into `out_dir`.
pub fn write_integrate_artifacts(
    outcome: &IntegrateOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    write_report(&outcome.report, out_dir, writer)?;
    if !outcome.diff.is_empty() {
        writer.write_file(&out_dir.join("project.diff"), outcome.diff.as_bytes())?;
    }
    Ok(())
}

/// Outcome of `run_clean_sandbox`.
pub struct CleanOutcome {
    /// Stale directories, removed unless the run was a dry run.
    pub stale: Vec<Utf8PathBuf>,
    pub report: IntegrationReport,
}

/// Remove sandbox directories the install set no longer produces.
pub fn run_clean_sandbox(
    settings: &CleanSettings,
    install: &dyn InstallSource,
    sink: &dyn EventSink,
    tool: ToolInfo,
) -> Result<CleanOutcome, ToolError> {
    let started_at = Utc::now();
    let install = install.load_install_set().map_err(ToolError::from_load)?;
    let sandbox = Sandbox::new(settings.sandbox_root.clone());

    let mut report = IntegrationReport::new(tool);
    report.run.started_at = Some(started_at);
    report.run.dry_run = settings.dry_run;

    let stale = if settings.dry_run {
        stale_sandbox_dirs(&sandbox, &install)?
    } else {
        let recorder = RecordingSink::forwarding(sink);
        let removed = clean_sandbox(&sandbox, &install, &recorder)?;
        report.counts = EventCounts::from_events(&recorder.into_events());
        removed
    };
    info!(count = stale.len(), dry_run = settings.dry_run, "sandbox cleaned");

    report.sandbox_removed = stale.iter().map(|p| p.to_string()).collect();
    report.run.ended_at = Some(Utc::now());
    Ok(CleanOutcome { stale, report })
}

pub fn write_clean_artifacts(
    outcome: &CleanOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    write_report(&outcome.report, out_dir, writer)
}

fn write_report(
    report: &IntegrationReport,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), json.as_bytes())?;
    writer.write_file(
        &out_dir.join("report.md"),
        render_report_md(report).as_bytes(),
    )?;
    Ok(())
}

fn select_targets<'a>(
    install: &'a InstallSet,
    labels: &[String],
) -> Result<Vec<&'a IntegrationTarget>, ToolError> {
    if labels.is_empty() {
        return Ok(install.aggregate_targets.iter().collect());
    }
    labels
        .iter()
        .map(|label| {
            install.aggregate_target(label).ok_or_else(|| {
                let known: Vec<&str> = install
                    .aggregate_targets
                    .iter()
                    .map(|t| t.label.as_str())
                    .collect();
                ToolError::InvalidInput(format!(
                    "unknown target '{}' (known: {})",
                    label,
                    known.join(", ")
                ))
            })
        })
        .collect()
}

fn snapshot_json(project: &Project) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(project).context("serialize project")?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryInstallSource, InMemoryProjectStore};
    use xcintegrate_domain::NullSink;
    use xcintegrate_types::project::{NativeTarget, SymbolType};

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "xcintegrate".into(),
            version: Some("0.0.0".into()),
        }
    }

    fn install() -> InstallSet {
        InstallSet {
            aggregate_targets: vec![IntegrationTarget {
                label: "Pods-App".into(),
                product_basename: "Pods_App".into(),
                user_target_names: vec!["App".into()],
                ..IntegrationTarget::default()
            }],
            ..InstallSet::default()
        }
    }

    fn store() -> InMemoryProjectStore {
        let mut project = Project::new("App");
        project
            .targets
            .push(NativeTarget::new("App", SymbolType::Application));
        InMemoryProjectStore::new(project)
    }

    #[test]
    fn integrate_saves_once_and_second_run_is_noop() {
        let store = store();
        let source = InMemoryInstallSource::new(install());
        let settings = IntegrateSettings::default();

        let first = run_integrate(&settings, &store, &source, &NullSink, tool()).unwrap();
        assert!(!first.report.is_noop());
        assert!(!first.diff.is_empty());
        assert_eq!(store.saves(), 1);

        let second = run_integrate(&settings, &store, &source, &NullSink, tool()).unwrap();
        assert!(second.report.is_noop());
        assert!(second.diff.is_empty());
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn dry_run_leaves_store_untouched() {
        let store = store();
        let source = InMemoryInstallSource::new(install());
        let settings = IntegrateSettings {
            dry_run: true,
            ..IntegrateSettings::default()
        };

        let outcome = run_integrate(&settings, &store, &source, &NullSink, tool()).unwrap();
        assert!(outcome.diff.contains("+"));
        assert!(outcome.report.run.dry_run);
        assert_eq!(store.saves(), 0);
        assert!(store.project().targets[0].build_phases.is_empty());
    }

    #[test]
    fn unknown_label_is_invalid_input() {
        let settings = IntegrateSettings {
            labels: vec!["Pods-Nope".into()],
            ..IntegrateSettings::default()
        };
        let err = run_integrate(
            &settings,
            &store(),
            &InMemoryInstallSource::new(install()),
            &NullSink,
            tool(),
        )
        .err()
        .unwrap();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Pods-Nope"));
    }

    #[test]
    fn load_errors_are_classified() {
        let parse = anyhow::Error::from(serde_json::from_str::<Project>("{").unwrap_err())
            .context("parse project");
        assert_eq!(ToolError::from_load(parse).exit_code(), 2);
        let io = anyhow::anyhow!("read project.json: not found");
        assert_eq!(ToolError::from_load(io).exit_code(), 1);
    }
}
