//! Rendering helpers (markdown) for human-readable artifacts.

use xcintegrate_types::events::{EventCounts, IntegrationEvent};
use xcintegrate_types::report::IntegrationReport;

pub fn render_report_md(report: &IntegrationReport) -> String {
    let mut out = String::new();
    out.push_str("# xcintegrate report\n\n");
    if report.run.dry_run {
        out.push_str("_Dry run: nothing was written._\n\n");
    }
    push_counts(&mut out, &report.counts);
    out.push('\n');

    if !report.targets.is_empty() {
        out.push_str("## Targets\n\n");
    }
    for target in &report.targets {
        out.push_str(&format!("### {}\n\n", target.label));
        out.push_str(&format!(
            "- Native targets: {}\n",
            join_or_dash(&target.native_targets)
        ));
        if !target.missing_native_targets.is_empty() {
            out.push_str(&format!(
                "- Missing native targets: {}\n",
                target.missing_native_targets.join(", ")
            ));
        }
        out.push('\n');
        if target.events.is_empty() {
            out.push_str("_Already up to date._\n\n");
            continue;
        }
        for event in &target.events {
            out.push_str(&format!("- {}\n", describe(event)));
        }
        out.push('\n');
    }

    if !report.sandbox_removed.is_empty() {
        out.push_str("## Sandbox\n\n");
        for path in &report.sandbox_removed {
            out.push_str(&format!("- `{}`\n", path));
        }
        out.push('\n');
    }

    out
}

fn push_counts(out: &mut String, counts: &EventCounts) {
    out.push_str(&format!(
        "- Phases: {} added, {} removed, {} moved\n",
        counts.phases_added, counts.phases_removed, counts.phases_moved
    ));
    out.push_str(&format!(
        "- Product references: {} added, {} removed\n",
        counts.product_references_added, counts.product_references_removed
    ));
    if counts.sandbox_directories_removed > 0 {
        out.push_str(&format!(
            "- Sandbox directories removed: {}\n",
            counts.sandbox_directories_removed
        ));
    }
}

fn describe(event: &IntegrationEvent) -> String {
    match event {
        IntegrationEvent::PhaseAdded {
            native_target,
            phase,
        } => format!("`{native_target}`: added `{phase}`"),
        IntegrationEvent::PhaseRemoved {
            native_target,
            phase,
        } => format!("`{native_target}`: removed `{phase}`"),
        IntegrationEvent::PhaseMoved {
            native_target,
            phase,
            from,
            to,
        } => format!("`{native_target}`: moved `{phase}` from {from} to {to}"),
        IntegrationEvent::ProductReferenceAdded {
            native_target,
            path,
        } => format!("`{native_target}`: linked `{path}`"),
        IntegrationEvent::ProductReferenceRemoved {
            native_target,
            path,
        } => format!("`{native_target}`: unlinked `{path}`"),
        IntegrationEvent::SandboxDirectoryRemoved { path } => format!("removed `{path}`"),
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
