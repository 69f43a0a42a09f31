//! # Status Workflow
//!
//! One transition table for every caller.
//!
//! ```text
//!   pickup ──► washing ──► completed ──► delivered ■
//! ```
//!
//! Forward, one step at a time. No self-transitions, no moving back, no
//! skipping, nothing out of `delivered`. An illegal move is an expected
//! answer, so [`validate_transition`] returns a [`TransitionCheck`] instead of
//! an error; [`require_transition`] gives the error form for code that is
//! about to write.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::BatchStatus;

/// Outcome of a transition check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransitionCheck {
    pub is_valid: bool,
    /// Human-readable explanation; present iff `is_valid` is false.
    #[ts(optional)]
    pub reason: Option<String>,
}

impl TransitionCheck {
    fn allowed() -> Self {
        TransitionCheck {
            is_valid: true,
            reason: None,
        }
    }

    fn denied(reason: String) -> Self {
        TransitionCheck {
            is_valid: false,
            reason: Some(reason),
        }
    }
}

/// Checks a status move. Never fails.
///
/// ## Example
/// ```rust
/// use linen_core::types::BatchStatus;
/// use linen_core::workflow::validate_transition;
///
/// assert!(validate_transition(BatchStatus::Washing, BatchStatus::Completed).is_valid);
///
/// let check = validate_transition(BatchStatus::Completed, BatchStatus::Washing);
/// assert!(!check.is_valid);
/// assert!(!check.reason.unwrap().is_empty());
/// ```
pub fn validate_transition(from: BatchStatus, to: BatchStatus) -> TransitionCheck {
    if from.is_terminal() {
        return TransitionCheck::denied(format!(
            "batch is already {from}; delivered batches cannot change status"
        ));
    }

    if from == to {
        return TransitionCheck::denied(format!("batch is already {from}"));
    }

    if to.ordinal() < from.ordinal() {
        return TransitionCheck::denied(format!(
            "batches cannot move backwards from {from} to {to}"
        ));
    }

    match from.next() {
        Some(next) if next == to => TransitionCheck::allowed(),
        Some(next) => TransitionCheck::denied(format!(
            "cannot skip ahead from {from} to {to}; the next status is {next}"
        )),
        None => TransitionCheck::denied(format!("{from} has no next status")),
    }
}

/// Checks a move given as wire strings, e.g. straight from a form.
///
/// Unknown or legacy status names are reported as invalid, not raised.
pub fn validate_transition_str(from: &str, to: &str) -> TransitionCheck {
    match (from.parse::<BatchStatus>(), to.parse::<BatchStatus>()) {
        (Ok(from), Ok(to)) => validate_transition(from, to),
        (Err(e), _) | (_, Err(e)) => TransitionCheck::denied(e.to_string()),
    }
}

/// Error form of [`validate_transition`].
///
/// ## Errors
/// `InvalidTransition` carrying the same reason.
pub fn require_transition(from: BatchStatus, to: BatchStatus) -> CoreResult<()> {
    let check = validate_transition(from, to);
    if check.is_valid {
        return Ok(());
    }

    Err(CoreError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
        reason: check.reason.unwrap_or_default(),
    })
}

/// Statuses reachable in one move; feeds the status dropdown.
pub fn allowed_transitions(from: BatchStatus) -> Vec<BatchStatus> {
    BatchStatus::ALL
        .into_iter()
        .filter(|to| validate_transition(from, *to).is_valid)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use BatchStatus::*;

    #[test]
    fn test_washing_to_completed_is_valid() {
        let check = validate_transition(Washing, Completed);
        assert!(check.is_valid);
        assert_eq!(check.reason, None);
    }

    #[test]
    fn test_completed_to_washing_is_invalid_with_reason() {
        let check = validate_transition(Completed, Washing);
        assert!(!check.is_valid);
        assert!(check.reason.unwrap().contains("backwards"));
    }

    #[test]
    fn test_only_forward_edges_are_valid() {
        let sanctioned = [(Pickup, Washing), (Washing, Completed), (Completed, Delivered)];

        for from in BatchStatus::ALL {
            for to in BatchStatus::ALL {
                let check = validate_transition(from, to);
                assert_eq!(
                    check.is_valid,
                    sanctioned.contains(&(from, to)),
                    "{from} -> {to}"
                );
                assert_eq!(check.reason.is_none(), check.is_valid, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_skipping_and_self_moves() {
        let skip = validate_transition(Pickup, Completed);
        assert!(skip.reason.unwrap().contains("next status is washing"));

        let same = validate_transition(Washing, Washing);
        assert_eq!(same.reason.as_deref(), Some("batch is already washing"));
    }

    #[test]
    fn test_delivered_is_final() {
        for to in BatchStatus::ALL {
            assert!(!validate_transition(Delivered, to).is_valid);
        }
        assert!(allowed_transitions(Delivered).is_empty());
    }

    #[test]
    fn test_allowed_transitions() {
        assert_eq!(allowed_transitions(Pickup), vec![Washing]);
        assert_eq!(allowed_transitions(Washing), vec![Completed]);
        assert_eq!(allowed_transitions(Completed), vec![Delivered]);
    }

    #[test]
    fn test_require_transition() {
        assert!(require_transition(Pickup, Washing).is_ok());

        let err = require_transition(Completed, Washing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(err.kind().http_status(), 409);
    }

    #[test]
    fn test_validate_transition_str() {
        assert!(validate_transition_str("pickup", "washing").is_valid);

        let legacy = validate_transition_str("washing", "processing");
        assert!(!legacy.is_valid);
        assert!(legacy.reason.unwrap().contains("processing"));

        assert!(!validate_transition_str("cancelled", "pickup").is_valid);
    }
}
