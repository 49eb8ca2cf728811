use super::{IntegrationStep, StepMeta, for_each_named};
use crate::constants::{EMBED_FRAMEWORK_PHASE_NAME, build_phase_name};
use crate::events::EventSink;
use crate::integrator::IntegrationContext;
use crate::paths::{enforce_path_limit, framework_input_paths, framework_output_paths};
use crate::phases::{find_or_create_shell_script_phase, remove_script_phase};
use xcintegrate_types::project::Project;
use xcintegrate_types::target::FrameworkPath;

pub struct EmbedFrameworksStep;

impl EmbedFrameworksStep {
    /// Native targets that copy frameworks into their own bundle. Empty when the aggregate
    /// target needs a host: extensions get their frameworks embedded by the host app.
    fn eligible(ctx: &IntegrationContext<'_>, project: &Project) -> Vec<String> {
        if ctx.target.requires_host_target {
            return vec![];
        }
        ctx.native_targets
            .iter()
            .filter(|name| {
                project
                    .native_target(name)
                    .is_some_and(|t| t.symbol_type.embeds_frameworks())
            })
            .cloned()
            .collect()
    }
}

impl IntegrationStep for EmbedFrameworksStep {
    fn meta(&self) -> StepMeta {
        StepMeta {
            key: "embed_frameworks",
            title: "Embed dynamic frameworks into the product bundle",
        }
    }

    fn apply(&self, ctx: &IntegrationContext<'_>, project: &mut Project, sink: &dyn EventSink) {
        let full_name = build_phase_name(EMBED_FRAMEWORK_PHASE_NAME);
        let eligible = Self::eligible(ctx, project);

        if !ctx.target.includes_frameworks() {
            for_each_named(project, &eligible, |native| {
                remove_script_phase(native, &full_name, EMBED_FRAMEWORK_PHASE_NAME, sink);
            });
            return;
        }

        let script_path = ctx.target.embed_frameworks_script_path();
        let (mut input_paths, mut output_paths) = (Vec::new(), Vec::new());
        if ctx.options.input_output_paths {
            let frameworks: Vec<FrameworkPath> = ctx
                .target
                .framework_paths_by_config
                .iter()
                .flat_map(|c| c.paths.iter().cloned())
                .collect();
            input_paths = framework_input_paths(&script_path, &frameworks);
            output_paths = framework_output_paths(&frameworks);
            enforce_path_limit(&mut input_paths, &mut output_paths);
        }

        for_each_named(project, &eligible, |native| {
            let phase = find_or_create_shell_script_phase(
                native,
                &full_name,
                EMBED_FRAMEWORK_PHASE_NAME,
                sink,
            );
            phase.shell_script = format!("\"{script_path}\"\n");
            phase.input_paths = input_paths.clone();
            phase.output_paths = output_paths.clone();
        });
    }
}

/// Removes embed phases left behind on targets that embed into a host. Older integrations
/// added the phase to extensions too.
pub struct EmbeddedTargetCleanupStep;

impl IntegrationStep for EmbeddedTargetCleanupStep {
    fn meta(&self) -> StepMeta {
        StepMeta {
            key: "embedded_target_cleanup",
            title: "Remove embed phases from targets embedded into a host",
        }
    }

    fn apply(&self, ctx: &IntegrationContext<'_>, project: &mut Project, sink: &dyn EventSink) {
        let full_name = build_phase_name(EMBED_FRAMEWORK_PHASE_NAME);
        for_each_named(project, &ctx.native_targets, |native| {
            if native.symbol_type.embeds_into_host() {
                remove_script_phase(native, &full_name, EMBED_FRAMEWORK_PHASE_NAME, sink);
            }
        });
    }
}
