use crate::events::{EventSink, RecordingSink};
use crate::steps::{self, IntegrationStep};
use tracing::{debug, warn};
use xcintegrate_types::events::{EventCounts, IntegrationEvent};
use xcintegrate_types::project::Project;
use xcintegrate_types::target::IntegrationTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrationOptions {
    /// Compute input/output paths for the embed-frameworks and copy-resources phases.
    pub input_output_paths: bool,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            input_output_paths: true,
        }
    }
}

/// Everything a step needs besides the project graph itself.
#[derive(Debug, Clone)]
pub struct IntegrationContext<'a> {
    pub target: &'a IntegrationTarget,
    /// Names of the user's native targets that exist in the project, in declaration order.
    pub native_targets: Vec<String>,
    pub options: IntegrationOptions,
}

impl<'a> IntegrationContext<'a> {
    pub fn new(target: &'a IntegrationTarget, project: &Project, options: IntegrationOptions) -> Self {
        let native_targets = target
            .user_target_names
            .iter()
            .filter(|name| project.native_target(name).is_some())
            .cloned()
            .collect();
        Self {
            target,
            native_targets,
            options,
        }
    }

    pub fn missing_native_targets(&self) -> Vec<String> {
        self.target
            .user_target_names
            .iter()
            .filter(|name| !self.native_targets.contains(name))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationOutcome {
    pub native_targets: Vec<String>,
    pub missing_native_targets: Vec<String>,
    pub events: Vec<IntegrationEvent>,
    pub counts: EventCounts,
}

impl IntegrationOutcome {
    pub fn is_noop(&self) -> bool {
        self.counts.is_noop()
    }
}

/// Integrates one aggregate target into the native targets it maps to.
pub struct TargetIntegrator<'a> {
    target: &'a IntegrationTarget,
    options: IntegrationOptions,
    steps: Vec<Box<dyn IntegrationStep>>,
}

impl<'a> TargetIntegrator<'a> {
    pub fn new(target: &'a IntegrationTarget, options: IntegrationOptions) -> Self {
        Self {
            target,
            options,
            steps: steps::builtin_steps(),
        }
    }

    pub fn with_steps(
        target: &'a IntegrationTarget,
        options: IntegrationOptions,
        steps: Vec<Box<dyn IntegrationStep>>,
    ) -> Self {
        Self {
            target,
            options,
            steps,
        }
    }

    /// Converge `project` onto the desired state for this target.
    ///
    /// Callers must serialize integrations that share a project. Running this twice in a row
    /// yields an outcome with no events the second time.
    pub fn integrate(&self, project: &mut Project, sink: &dyn EventSink) -> IntegrationOutcome {
        let ctx = IntegrationContext::new(self.target, project, self.options);
        let missing = ctx.missing_native_targets();
        for name in &missing {
            warn!(
                target = %self.target.label,
                native_target = %name,
                "native target not found in project, skipping"
            );
        }

        let recorder = RecordingSink::forwarding(sink);
        for step in &self.steps {
            let meta = step.meta();
            debug!(target = %self.target.label, step = meta.key, "running integration step");
            step.apply(&ctx, project, &recorder);
        }

        let events = recorder.into_events();
        IntegrationOutcome {
            counts: EventCounts::from_events(&events),
            native_targets: ctx.native_targets,
            missing_native_targets: missing,
            events,
        }
    }
}
