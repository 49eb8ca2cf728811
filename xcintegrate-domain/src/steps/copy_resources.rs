use super::{IntegrationStep, StepMeta, for_each_named};
use crate::constants::{COPY_PODS_RESOURCES_PHASE_NAME, build_phase_name};
use crate::events::EventSink;
use crate::integrator::IntegrationContext;
use crate::paths::{dedup_preserving_order, enforce_path_limit, resource_output_paths};
use crate::phases::{find_or_create_shell_script_phase, remove_script_phase};
use xcintegrate_types::project::{Project, SymbolType};

pub struct CopyResourcesStep;

impl IntegrationStep for CopyResourcesStep {
    fn meta(&self) -> StepMeta {
        StepMeta {
            key: "copy_resources",
            title: "Copy resources into the product bundle",
        }
    }

    fn apply(&self, ctx: &IntegrationContext<'_>, project: &mut Project, sink: &dyn EventSink) {
        let full_name = build_phase_name(COPY_PODS_RESOURCES_PHASE_NAME);

        if !ctx.target.includes_resources() {
            for_each_named(project, &ctx.native_targets, |native| {
                remove_script_phase(native, &full_name, COPY_PODS_RESOURCES_PHASE_NAME, sink);
            });
            return;
        }

        let script_path = ctx.target.copy_resources_script_path();
        let (mut input_paths, mut output_paths) = (Vec::new(), Vec::new());
        if ctx.options.input_output_paths {
            let resources: Vec<String> = dedup_preserving_order(
                ctx.target
                    .resource_paths_by_config
                    .iter()
                    .flat_map(|c| c.paths.iter().cloned()),
            );
            output_paths = resource_output_paths(resources.iter().map(String::as_str));
            input_paths = std::iter::once(script_path.clone())
                .chain(resources)
                .collect();
            enforce_path_limit(&mut input_paths, &mut output_paths);
        }

        for_each_named(project, &ctx.native_targets, |native| {
            // Static libraries have no bundle to copy into.
            if native.symbol_type == SymbolType::StaticLibrary {
                return;
            }
            let phase = find_or_create_shell_script_phase(
                native,
                &full_name,
                COPY_PODS_RESOURCES_PHASE_NAME,
                sink,
            );
            phase.shell_script = format!("\"{script_path}\"\n");
            phase.input_paths = input_paths.clone();
            phase.output_paths = output_paths.clone();
        });
    }
}
