use serde::{Deserialize, Serialize};

/// Observable side effects of an integration or sandbox cleanup pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrationEvent {
    PhaseAdded {
        native_target: String,
        phase: String,
    },
    PhaseRemoved {
        native_target: String,
        phase: String,
    },
    PhaseMoved {
        native_target: String,
        phase: String,
        from: usize,
        to: usize,
    },
    ProductReferenceAdded {
        native_target: String,
        path: String,
    },
    ProductReferenceRemoved {
        native_target: String,
        path: String,
    },
    SandboxDirectoryRemoved {
        path: String,
    },
}

impl IntegrationEvent {
    /// Short machine-readable kind, e.g. `phase_added`.
    pub fn kind(&self) -> &'static str {
        match self {
            IntegrationEvent::PhaseAdded { .. } => "phase_added",
            IntegrationEvent::PhaseRemoved { .. } => "phase_removed",
            IntegrationEvent::PhaseMoved { .. } => "phase_moved",
            IntegrationEvent::ProductReferenceAdded { .. } => "product_reference_added",
            IntegrationEvent::ProductReferenceRemoved { .. } => "product_reference_removed",
            IntegrationEvent::SandboxDirectoryRemoved { .. } => "sandbox_directory_removed",
        }
    }

    pub fn native_target(&self) -> Option<&str> {
        match self {
            IntegrationEvent::PhaseAdded { native_target, .. }
            | IntegrationEvent::PhaseRemoved { native_target, .. }
            | IntegrationEvent::PhaseMoved { native_target, .. }
            | IntegrationEvent::ProductReferenceAdded { native_target, .. }
            | IntegrationEvent::ProductReferenceRemoved { native_target, .. } => {
                Some(native_target)
            }
            IntegrationEvent::SandboxDirectoryRemoved { .. } => None,
        }
    }
}

/// Per-kind counts over a sequence of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub phases_added: u64,
    pub phases_removed: u64,
    pub phases_moved: u64,
    pub product_references_added: u64,
    pub product_references_removed: u64,
    pub sandbox_directories_removed: u64,
}

impl EventCounts {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a IntegrationEvent>) -> Self {
        let mut counts = Self::default();
        for event in events {
            match event {
                IntegrationEvent::PhaseAdded { .. } => counts.phases_added += 1,
                IntegrationEvent::PhaseRemoved { .. } => counts.phases_removed += 1,
                IntegrationEvent::PhaseMoved { .. } => counts.phases_moved += 1,
                IntegrationEvent::ProductReferenceAdded { .. } => {
                    counts.product_references_added += 1
                }
                IntegrationEvent::ProductReferenceRemoved { .. } => {
                    counts.product_references_removed += 1
                }
                IntegrationEvent::SandboxDirectoryRemoved { .. } => {
                    counts.sandbox_directories_removed += 1
                }
            }
        }
        counts
    }

    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}
