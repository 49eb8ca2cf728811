//! Position constraints on a native target's phase list.
//!
//! Each constraint pins one phase relative to the list head or to the first phase of a given
//! type. Solving a constraint computes the destination index and performs at most one move; a
//! satisfied constraint never moves anything, which keeps repeated integrations stable.

use xcintegrate_types::project::{NativeTarget, ObjectId, PhaseIsa};
use xcintegrate_types::target::ExecutionPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The phase must be the first in the list.
    First,
    /// The phase must come before the first phase of this type.
    Before(PhaseIsa),
    /// The phase must come after the first phase of this type.
    After(PhaseIsa),
}

impl Placement {
    pub fn for_execution_position(position: ExecutionPosition) -> Option<Self> {
        match position {
            ExecutionPosition::BeforeCompile => Some(Placement::Before(PhaseIsa::Sources)),
            ExecutionPosition::AfterCompile => Some(Placement::After(PhaseIsa::Sources)),
            ExecutionPosition::BeforeHeaders => Some(Placement::Before(PhaseIsa::Headers)),
            ExecutionPosition::AfterHeaders => Some(Placement::After(PhaseIsa::Headers)),
            ExecutionPosition::Any => None,
        }
    }
}

/// Outcome of solving one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reorder {
    /// Already where it should be.
    Satisfied,
    /// Moved from one index to another.
    Moved { from: usize, to: usize },
    /// The anchor phase (or the phase itself) does not exist; nothing to do.
    NoAnchor,
}

/// Destination index for the phase currently at `current`, or `None` when `placement` holds.
///
/// Indices follow remove-then-insert semantics: the phase is removed from `current` and
/// reinserted at the returned index. For `Before` the anchor's own index puts the phase just
/// ahead of it; for `After` the anchor shifts down by one on removal, so the same index lands
/// just behind it.
pub fn destination(target: &NativeTarget, current: usize, placement: Placement) -> Option<usize> {
    match placement {
        Placement::First => (current != 0).then_some(0),
        Placement::Before(isa) => {
            let anchor = target.first_index_of(isa)?;
            (current > anchor).then_some(anchor)
        }
        Placement::After(isa) => {
            let anchor = target.first_index_of(isa)?;
            (current < anchor).then_some(anchor)
        }
    }
}

/// Enforce `placement` for the phase with `phase_id`.
pub fn enforce(target: &mut NativeTarget, phase_id: &ObjectId, placement: Placement) -> Reorder {
    let Some(current) = target.index_of(phase_id) else {
        return Reorder::NoAnchor;
    };
    let anchor_present = match placement {
        Placement::First => true,
        Placement::Before(isa) | Placement::After(isa) => target.first_index_of(isa).is_some(),
    };
    if !anchor_present {
        return Reorder::NoAnchor;
    }
    match destination(target, current, placement) {
        Some(to) => {
            let phase = target.build_phases.remove(current);
            target.build_phases.insert(to, phase);
            Reorder::Moved { from: current, to }
        }
        None => Reorder::Satisfied,
    }
}
