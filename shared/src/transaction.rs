//! Transaction State Machine
//!
//! A transaction is `Pending` from submission until either a matching
//! response completes it or the timeout window expires. Both end states are
//! terminal: a transaction never transitions twice.

use thiserror::Error;

/// Lifecycle state of one request/response transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Pending,
    Completed,
    TimedOut,
}

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionEvent {
    /// A frame answering this transaction was decoded
    ResponseDecoded,
    /// The timeout window passed with no answer
    Expired,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid transaction transition from {from:?} on {event:?}")]
pub struct TransitionError {
    pub from: TransactionState,
    pub event: TransactionEvent,
}

impl TransactionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionState::Pending)
    }

    /// Get the next state for a given event, if the transition is valid
    pub fn on_event(self, event: TransactionEvent) -> Result<TransactionState, TransitionError> {
        use TransactionEvent::*;
        use TransactionState::*;

        match (self, event) {
            (Pending, ResponseDecoded) => Ok(Completed),
            (Pending, Expired) => Ok(TimedOut),
            (from, event) => Err(TransitionError { from, event }),
        }
    }
}
