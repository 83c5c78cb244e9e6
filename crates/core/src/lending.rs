//! The lending state machine for catalog items.
//!
//! A book is either `Available` or `Issued`. Issuing an available book makes
//! it issued; returning an issued book makes it available again. Anything
//! else is a conflict, reported to the caller without mutating state. The
//! storage layer executes these transitions as a single conditional update
//! so that two racing requests cannot both succeed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lending state of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LendingState {
    /// The item is on the shelf and may be issued.
    Available,
    /// The item is checked out and may be returned.
    Issued,
}

/// Kind of ledger record produced by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// The item was issued to a user.
    Issued,
    /// The item was returned by a user.
    Returned,
}

/// Precondition violations of the lending state machine.
///
/// These are expected, recoverable outcomes of racing or repeated requests,
/// not system faults. No mutation occurs when they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LendingError {
    /// Issue requested but the item is already issued.
    #[error("book is already issued")]
    AlreadyIssued,

    /// Return requested but the item is already available.
    #[error("book is already available")]
    AlreadyAvailable,
}

impl LendingState {
    /// Applies an issue intent to this state.
    ///
    /// # Errors
    ///
    /// Returns `LendingError::AlreadyIssued` if the item is not available.
    pub const fn issue(self) -> Result<Self, LendingError> {
        match self {
            Self::Available => Ok(Self::Issued),
            Self::Issued => Err(LendingError::AlreadyIssued),
        }
    }

    /// Applies a return intent to this state.
    ///
    /// # Errors
    ///
    /// Returns `LendingError::AlreadyAvailable` if the item is not issued.
    pub const fn return_item(self) -> Result<Self, LendingError> {
        match self {
            Self::Issued => Ok(Self::Available),
            Self::Available => Err(LendingError::AlreadyAvailable),
        }
    }

    /// Applies a transition intent, returning the new state and the ledger
    /// record kind to append for it.
    ///
    /// # Errors
    ///
    /// Returns the corresponding `LendingError` when the precondition fails.
    pub const fn transition(
        self,
        kind: TransactionKind,
    ) -> Result<(Self, TransactionKind), LendingError> {
        match kind {
            TransactionKind::Issued => match self.issue() {
                Ok(next) => Ok((next, TransactionKind::Issued)),
                Err(e) => Err(e),
            },
            TransactionKind::Returned => match self.return_item() {
                Ok(next) => Ok((next, TransactionKind::Returned)),
                Err(e) => Err(e),
            },
        }
    }
}

impl TransactionKind {
    /// The state a conditional update must observe for this transition to apply.
    #[must_use]
    pub const fn required_state(self) -> LendingState {
        match self {
            Self::Issued => LendingState::Available,
            Self::Returned => LendingState::Issued,
        }
    }

    /// The state a successful transition of this kind leaves behind.
    #[must_use]
    pub const fn resulting_state(self) -> LendingState {
        match self {
            Self::Issued => LendingState::Issued,
            Self::Returned => LendingState::Available,
        }
    }

    /// The conflict reported when the required state is not observed.
    #[must_use]
    pub const fn conflict(self) -> LendingError {
        match self {
            Self::Issued => LendingError::AlreadyIssued,
            Self::Returned => LendingError::AlreadyAvailable,
        }
    }
}

/// The lending state implied by the most recent ledger record for an item.
///
/// An item with no history is `Available`. This is the consistency oracle:
/// for every item, the stored `lending_state` must equal this value computed
/// over its ledger.
#[must_use]
pub const fn state_implied_by(last_record: Option<TransactionKind>) -> LendingState {
    match last_record {
        Some(TransactionKind::Issued) => LendingState::Issued,
        Some(TransactionKind::Returned) | None => LendingState::Available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_issue_available() {
        assert_eq!(LendingState::Available.issue(), Ok(LendingState::Issued));
    }

    #[test]
    fn test_issue_issued_rejected() {
        assert_eq!(
            LendingState::Issued.issue(),
            Err(LendingError::AlreadyIssued)
        );
    }

    #[test]
    fn test_return_issued() {
        assert_eq!(
            LendingState::Issued.return_item(),
            Ok(LendingState::Available)
        );
    }

    #[test]
    fn test_return_available_rejected() {
        assert_eq!(
            LendingState::Available.return_item(),
            Err(LendingError::AlreadyAvailable)
        );
    }

    #[test]
    fn test_round_trip_restores_available() {
        let issued = LendingState::Available.issue().unwrap();
        let back = issued.return_item().unwrap();
        assert_eq!(back, LendingState::Available);
    }

    #[test]
    fn test_required_and_resulting_states() {
        assert_eq!(
            TransactionKind::Issued.required_state(),
            LendingState::Available
        );
        assert_eq!(
            TransactionKind::Issued.resulting_state(),
            LendingState::Issued
        );
        assert_eq!(
            TransactionKind::Returned.required_state(),
            LendingState::Issued
        );
        assert_eq!(
            TransactionKind::Returned.resulting_state(),
            LendingState::Available
        );
    }

    #[test]
    fn test_state_implied_by_ledger() {
        assert_eq!(state_implied_by(None), LendingState::Available);
        assert_eq!(
            state_implied_by(Some(TransactionKind::Issued)),
            LendingState::Issued
        );
        assert_eq!(
            state_implied_by(Some(TransactionKind::Returned)),
            LendingState::Available
        );
    }

    fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
        prop_oneof![
            Just(TransactionKind::Issued),
            Just(TransactionKind::Returned),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any sequence of intents applied to a fresh item, the final
        /// state always matches the state implied by the last accepted
        /// ledger record, and accepted records strictly alternate.
        #[test]
        fn prop_state_matches_ledger(intents in proptest::collection::vec(kind_strategy(), 0..32)) {
            let mut state = LendingState::Available;
            let mut ledger: Vec<TransactionKind> = Vec::new();

            for intent in intents {
                match state.transition(intent) {
                    Ok((next, record)) => {
                        // An accepted record never repeats the previous kind
                        if let Some(last) = ledger.last() {
                            prop_assert_ne!(*last, record);
                        }
                        ledger.push(record);
                        state = next;
                    }
                    Err(_) => {
                        // Rejection mutates nothing
                    }
                }
            }

            prop_assert_eq!(state, state_implied_by(ledger.last().copied()));
        }

        /// A rejected transition reports the conflict matching its intent.
        #[test]
        fn prop_conflict_matches_intent(intent in kind_strategy()) {
            let blocked = intent.resulting_state();
            let result = blocked.transition(intent);
            prop_assert_eq!(result, Err(intent.conflict()));
        }
    }
}
