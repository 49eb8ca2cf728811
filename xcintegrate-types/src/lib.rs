//! Shared DTOs (schemas-as-code) for the xcintegrate workspace.
//!
//! # Design constraints
//! - Project graph types mirror an externally defined format: nodes carry names and
//!   type tags, not stable identity keys.
//! - Target model types are produced by an upstream orchestrator and are read-only here.
//! - Prefer adding optional fields over changing semantics.

pub mod events;
pub mod project;
pub mod report;
pub mod target;

/// Schema identifiers.
pub mod schema {
    pub const XCINTEGRATE_REPORT_V1: &str = "xcintegrate.report.v1";
    pub const XCINTEGRATE_PROJECT_V1: &str = "xcintegrate.project.v1";
    pub const XCINTEGRATE_INSTALL_V1: &str = "xcintegrate.install.v1";
}
