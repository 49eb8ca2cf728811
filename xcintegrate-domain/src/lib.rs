//! Domain logic: converge a user project graph onto the desired integration state.
//!
//! This crate owns *what* the project should look like after integration and how to get there
//! without disturbing user-authored configuration. Loading and saving the project graph is the
//! `xcintegrate-core` crate's job.
//!
//! Every reconciliation entry point is infallible and idempotent: running it again over a
//! converged graph emits no events and changes nothing. The sandbox cleanup pass is the only
//! part that touches the filesystem.

pub mod constants;
mod events;
mod integrator;
pub mod ordering;
pub mod paths;
pub mod phases;
pub mod reconcile;
mod sandbox;
mod steps;

pub use events::{EventSink, NullSink, RecordingSink, TracingSink};
pub use integrator::{IntegrationContext, IntegrationOptions, IntegrationOutcome, TargetIntegrator};
pub use sandbox::{
    DirectorySet, Sandbox, clean_sandbox, desired_sandbox_dirs, stale_sandbox_dirs,
};
pub use steps::{IntegrationStep, StepMeta, builtin_step_metas, builtin_steps};
