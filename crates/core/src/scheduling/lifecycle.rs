//! Visit lifecycle state machine.
//!
//! `scheduled → confirmed → in_progress → completed`, with every non-terminal
//! state able to fall into one of the terminal cancellation states
//! (`cancelled_by_client`, `cancelled_by_agent`, `no_show`). A confirmed
//! visit may complete directly without passing through `in_progress`.
//! Terminal states admit no transition at all.

use showings_domain::{Result, SchedulingError, VisitStatusKind};

/// Whether the lifecycle permits moving from `from` to `to`.
pub fn can_transition(from: VisitStatusKind, to: VisitStatusKind) -> bool {
    use VisitStatusKind::{
        CancelledByAgent, CancelledByClient, Completed, Confirmed, InProgress, NoShow, Scheduled,
    };

    match (from, to) {
        // Forward progress
        (Scheduled, Confirmed) => true,
        (Confirmed, InProgress) => true,
        // The looser completion rule: a confirmed visit may complete without
        // an explicit in-progress step.
        (Confirmed | InProgress, Completed) => true,
        // Any non-terminal state may be abandoned.
        (
            Scheduled | Confirmed | InProgress,
            CancelledByClient | CancelledByAgent | NoShow,
        ) => true,
        // Everything else, including any move out of a terminal state.
        (_, _) => false,
    }
}

/// Validate a transition, reporting the offending state pair on failure.
///
/// Invalid transitions are rejected synchronously and never retried; the
/// current state is already fixed, so a retry could not succeed.
pub fn ensure_transition(from: VisitStatusKind, to: VisitStatusKind) -> Result<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(SchedulingError::InvalidTransition { from, to })
    }
}
