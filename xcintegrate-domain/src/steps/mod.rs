use crate::events::EventSink;
use crate::integrator::IntegrationContext;
use xcintegrate_types::project::{NativeTarget, Project};

mod check_manifest;
mod copy_resources;
mod embed_frameworks;
mod product_reference;
mod user_script_phases;

/// One converge-to-desired pass over the project graph.
///
/// Steps never fail: anything they cannot act on (a missing anchor phase, an ineligible target)
/// is skipped.
pub trait IntegrationStep {
    fn meta(&self) -> StepMeta;

    fn apply(&self, ctx: &IntegrationContext<'_>, project: &mut Project, sink: &dyn EventSink);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMeta {
    pub key: &'static str,
    pub title: &'static str,
}

/// Built-in steps in execution order. Product references come first because the later steps
/// assume one correctly typed link per native target.
pub fn builtin_steps() -> Vec<Box<dyn IntegrationStep>> {
    vec![
        Box::new(product_reference::ProductReferenceStep),
        Box::new(embed_frameworks::EmbedFrameworksStep),
        Box::new(embed_frameworks::EmbeddedTargetCleanupStep),
        Box::new(copy_resources::CopyResourcesStep),
        Box::new(check_manifest::CheckManifestStep),
        Box::new(user_script_phases::UserScriptPhasesStep),
    ]
}

pub fn builtin_step_metas() -> Vec<StepMeta> {
    builtin_steps().iter().map(|s| s.meta()).collect()
}

/// Run `f` over each named native target that exists in `project`.
fn for_each_named(
    project: &mut Project,
    names: &[String],
    mut f: impl FnMut(&mut NativeTarget),
) {
    for target in project.targets.iter_mut() {
        if names.iter().any(|n| n == &target.name) {
            f(target);
        }
    }
}
