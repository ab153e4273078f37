//! State machine trait for status enums.
//!
//! Provides a consistent interface for validating and performing state
//! transitions on small lifecycle enums.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// ```ignore
/// let next = LoadState::Idle.transition_to(LoadState::Loading)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Door {
        Open,
        Closed,
        Welded,
    }

    impl StateMachine for Door {
        fn can_transition_to(&self, target: &Self) -> bool {
            matches!(
                (self, target),
                (Door::Open, Door::Closed)
                    | (Door::Closed, Door::Open)
                    | (Door::Closed, Door::Welded)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Door::Open => vec![Door::Closed],
                Door::Closed => vec![Door::Open, Door::Welded],
                Door::Welded => vec![],
            }
        }
    }

    #[test]
    fn valid_transition_returns_target() {
        assert_eq!(Door::Open.transition_to(Door::Closed).unwrap(), Door::Closed);
    }

    #[test]
    fn invalid_transition_returns_error() {
        let err = Door::Open.transition_to(Door::Welded).unwrap_err();
        assert!(err.to_string().contains("Cannot transition from Open to Welded"));
    }

    #[test]
    fn terminal_state_has_no_transitions() {
        assert!(Door::Welded.is_terminal());
        assert!(!Door::Closed.is_terminal());
    }
}
