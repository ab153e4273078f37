//! Observable subscription state.
//!
//! `PlanState` is what UI observers read: the current plan, whether a
//! store operation is in flight, and where the offerings fetch stands.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

use super::{PlanTier, ReconciliationResult};

/// Lifecycle of an offerings fetch.
///
/// `Idle → Loading → {Idle, Failed}`; a failed fetch may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Failed,
}

impl StateMachine for LoadState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use LoadState::*;
        matches!(
            (self, target),
            (Idle, Loading) | (Loading, Idle) | (Loading, Failed) | (Failed, Loading)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use LoadState::*;
        match self {
            Idle => vec![Loading],
            Loading => vec![Idle, Failed],
            Failed => vec![Loading],
        }
    }
}

/// Snapshot of everything observers may read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanState {
    pub current: ReconciliationResult,
    pub is_loading: bool,
    pub offerings: LoadState,
    pub last_error: Option<String>,
}

impl PlanState {
    pub fn tier(&self) -> PlanTier {
        self.current.tier
    }

    pub fn room_limit(&self) -> u32 {
        self.current.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offerings_fetch_cycle_is_valid() {
        let state = LoadState::Idle;
        let state = state.transition_to(LoadState::Loading).unwrap();
        let state = state.transition_to(LoadState::Failed).unwrap();
        let state = state.transition_to(LoadState::Loading).unwrap();
        assert_eq!(state.transition_to(LoadState::Idle).unwrap(), LoadState::Idle);
    }

    #[test]
    fn cannot_fail_without_loading() {
        assert!(LoadState::Idle.transition_to(LoadState::Failed).is_err());
    }

    #[test]
    fn no_state_is_terminal() {
        assert!(!LoadState::Idle.is_terminal());
        assert!(!LoadState::Failed.is_terminal());
    }

    #[test]
    fn default_state_has_no_plan() {
        let state = PlanState::default();
        assert_eq!(state.tier(), PlanTier::None);
        assert_eq!(state.room_limit(), 0);
        assert!(!state.is_loading);
        assert_eq!(state.offerings, LoadState::Idle);
    }
}
