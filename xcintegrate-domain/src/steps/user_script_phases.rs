use super::{IntegrationStep, StepMeta, for_each_named};
use crate::constants::{USER_BUILD_PHASE_PREFIX, user_build_phase_name};
use crate::events::EventSink;
use crate::integrator::IntegrationContext;
use crate::ordering::{Placement, Reorder, enforce};
use crate::phases::{find_or_create_shell_script_phase, remove_script_phase_named};
use crate::reconcile::reconcile_by_key;
use std::collections::HashSet;
use tracing::{debug, warn};
use xcintegrate_types::events::IntegrationEvent;
use xcintegrate_types::project::{NativeTarget, Project, ShellScriptBuildPhase};
use xcintegrate_types::target::ScriptPhaseDescriptor;

/// Converges the `[CP-User]` phases of each native target onto the declared script phases.
pub struct UserScriptPhasesStep;

impl UserScriptPhasesStep {
    fn existing_logical_names(native: &NativeTarget) -> Vec<String> {
        native
            .shell_script_phases()
            .filter_map(|p| p.name.as_deref())
            .filter_map(|n| n.strip_prefix(USER_BUILD_PHASE_PREFIX))
            .map(str::to_string)
            .collect()
    }

    fn apply_descriptor(phase: &mut ShellScriptBuildPhase, d: &ScriptPhaseDescriptor) {
        phase.shell_script = d.script.clone();
        if let Some(shell_path) = &d.shell_path {
            phase.shell_path = shell_path.clone();
        }
        if let Some(paths) = &d.input_files {
            phase.input_paths = paths.clone();
        }
        if let Some(paths) = &d.output_files {
            phase.output_paths = paths.clone();
        }
        if let Some(paths) = &d.input_file_lists {
            phase.input_file_list_paths = paths.clone();
        }
        if let Some(paths) = &d.output_file_lists {
            phase.output_file_list_paths = paths.clone();
        }
        if let Some(show) = d.show_env_vars_in_log {
            phase.show_env_vars_in_log = show;
        }
        if let Some(always) = d.always_out_of_date {
            phase.always_out_of_date = always;
        }
        if let Some(dependency_file) = &d.dependency_file {
            phase.dependency_file = Some(dependency_file.clone());
        }
    }

    fn reconcile_target(
        native: &mut NativeTarget,
        descriptors: &[ScriptPhaseDescriptor],
        sink: &dyn EventSink,
    ) {
        let delta = reconcile_by_key(
            descriptors.iter().map(|d| d.name.clone()),
            Self::existing_logical_names(native),
        );
        for stale in &delta.delete {
            remove_script_phase_named(native, &user_build_phase_name(stale), sink);
        }

        // First declaration of a name wins, matching the key set above.
        let mut seen = HashSet::new();
        for d in descriptors {
            if !seen.insert(d.name.as_str()) {
                warn!(native_target = %native.name, phase = %d.name, "duplicate script phase declaration ignored");
                continue;
            }
            let full_name = user_build_phase_name(&d.name);
            let phase = find_or_create_shell_script_phase(native, &full_name, &full_name, sink);
            Self::apply_descriptor(phase, d);
            let id = phase.id.clone();

            let Some(placement) = Placement::for_execution_position(d.execution_position) else {
                continue;
            };
            match enforce(native, &id, placement) {
                Reorder::Moved { from, to } => sink.emit(IntegrationEvent::PhaseMoved {
                    native_target: native.name.clone(),
                    phase: full_name,
                    from,
                    to,
                }),
                Reorder::NoAnchor => {
                    debug!(native_target = %native.name, phase = %full_name, ?placement, "anchor phase missing, not reordering")
                }
                Reorder::Satisfied => {}
            }
        }
    }
}

impl IntegrationStep for UserScriptPhasesStep {
    fn meta(&self) -> StepMeta {
        StepMeta {
            key: "user_script_phases",
            title: "Create, update, reorder and remove declared script phases",
        }
    }

    fn apply(&self, ctx: &IntegrationContext<'_>, project: &mut Project, sink: &dyn EventSink) {
        for_each_named(project, &ctx.native_targets, |native| {
            Self::reconcile_target(native, &ctx.target.script_phases, sink);
        });
    }
}
