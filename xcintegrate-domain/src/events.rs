use std::cell::RefCell;
use tracing::info;
use xcintegrate_types::events::IntegrationEvent;

/// Receiver for integration side-effect notifications.
///
/// Notifications are fire-and-forget: the reconciler never reads anything back from a sink.
pub trait EventSink {
    fn emit(&self, event: IntegrationEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: IntegrationEvent) {}
}

/// Logs every event at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: IntegrationEvent) {
        match &event {
            IntegrationEvent::PhaseAdded {
                native_target,
                phase,
            } => info!(%native_target, %phase, "adding build phase"),
            IntegrationEvent::PhaseRemoved {
                native_target,
                phase,
            } => info!(%native_target, %phase, "removing build phase"),
            IntegrationEvent::PhaseMoved {
                native_target,
                phase,
                from,
                to,
            } => info!(%native_target, %phase, from, to, "moving build phase"),
            IntegrationEvent::ProductReferenceAdded {
                native_target,
                path,
            } => info!(%native_target, %path, "linking product reference"),
            IntegrationEvent::ProductReferenceRemoved {
                native_target,
                path,
            } => info!(%native_target, %path, "removing old product reference"),
            IntegrationEvent::SandboxDirectoryRemoved { path } => {
                info!(%path, "removing stale sandbox directory")
            }
        }
    }
}

/// Collects events, optionally forwarding each one to another sink first.
#[derive(Default)]
pub struct RecordingSink<'a> {
    inner: Option<&'a dyn EventSink>,
    events: RefCell<Vec<IntegrationEvent>>,
}

impl<'a> RecordingSink<'a> {
    pub fn new() -> Self {
        Self {
            inner: None,
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn forwarding(inner: &'a dyn EventSink) -> Self {
        Self {
            inner: Some(inner),
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<IntegrationEvent> {
        self.events.borrow().clone()
    }

    pub fn into_events(self) -> Vec<IntegrationEvent> {
        self.events.into_inner()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSink for RecordingSink<'_> {
    fn emit(&self, event: IntegrationEvent) {
        if let Some(inner) = self.inner {
            inner.emit(event.clone());
        }
        self.events.borrow_mut().push(event);
    }
}
