//! Embeddable core library for xcintegrate.
//!
//! Provides a clap-free, I/O-abstracted entry point for integrating aggregate targets into a
//! user project and cleaning the sandbox afterwards.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`ProjectStore`](ports::ProjectStore): load and save the project graph
//! - [`InstallSource`](ports::InstallSource): load the install set
//! - [`WritePort`](ports::WritePort): write report artifacts
//!
//! The [`adapters`] module provides default JSON file and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_integrate`](pipeline::run_integrate): integrate targets and build a report
//! - [`run_clean_sandbox`](pipeline::run_clean_sandbox): remove stale sandbox directories

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod render;
pub mod settings;

// Re-export the domain's sinks so embedders don't need xcintegrate-domain directly.
pub use xcintegrate_domain::{EventSink, IntegrationOptions, NullSink, RecordingSink, TracingSink};
