use super::{IntegrationStep, StepMeta, for_each_named};
use crate::constants::{
    CHECK_MANIFEST_PHASE_NAME, MANIFEST_LOCK_INPUT_PATH, PODFILE_LOCK_INPUT_PATH,
    build_phase_name,
};
use crate::events::EventSink;
use crate::integrator::IntegrationContext;
use crate::ordering::{Placement, Reorder, enforce};
use crate::phases::find_or_create_shell_script_phase;
use xcintegrate_types::events::IntegrationEvent;
use xcintegrate_types::project::Project;

/// Fails the build before any compile work when the sandbox is out of date.
pub const CHECK_MANIFEST_SCRIPT: &str = r#"diff "${PODS_PODFILE_DIR_PATH}/Podfile.lock" "${PODS_ROOT}/Manifest.lock" > /dev/null
if [ $? != 0 ] ; then
    echo "error: The sandbox is not in sync with the Podfile.lock. Run 'pod install' to bring it up to date." >&2
    exit 1
fi
echo "SUCCESS" > "${SCRIPT_OUTPUT_FILE_0}"
"#;

pub struct CheckManifestStep;

impl IntegrationStep for CheckManifestStep {
    fn meta(&self) -> StepMeta {
        StepMeta {
            key: "check_manifest",
            title: "Check the sandbox manifest before compiling",
        }
    }

    fn apply(&self, ctx: &IntegrationContext<'_>, project: &mut Project, sink: &dyn EventSink) {
        let full_name = build_phase_name(CHECK_MANIFEST_PHASE_NAME);
        let output_path = ctx.target.check_manifest_lock_output_path();

        for_each_named(project, &ctx.native_targets, |native| {
            let phase =
                find_or_create_shell_script_phase(native, &full_name, CHECK_MANIFEST_PHASE_NAME, sink);
            phase.shell_script = CHECK_MANIFEST_SCRIPT.to_string();
            phase.input_paths = vec![
                PODFILE_LOCK_INPUT_PATH.to_string(),
                MANIFEST_LOCK_INPUT_PATH.to_string(),
            ];
            phase.output_paths = vec![output_path.clone()];
            let id = phase.id.clone();

            if let Reorder::Moved { from, to } = enforce(native, &id, Placement::First) {
                sink.emit(IntegrationEvent::PhaseMoved {
                    native_target: native.name.clone(),
                    phase: full_name.clone(),
                    from,
                    to,
                });
            }
        });
    }
}
