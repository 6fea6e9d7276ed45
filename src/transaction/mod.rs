//! Request/response transactions
//!
//! A transaction pairs one outgoing frame with the frame that answers it.
//! Transactions are keyed by `(node, reply message class)`; at most one
//! may be pending per key.

pub mod timeout;
pub mod tracker;
pub mod unit;

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::oneshot;
use zwave_shared::{
    Frame, LibraryType, MessageClass, NodeId, TransactionEvent, TransactionState,
    TransitionError,
};

use crate::command::Command;

pub use timeout::TimeoutSweeper;
pub use tracker::{FrameDisposition, TransactionTracker};

/// Correlation key of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionKey {
    pub node: Option<NodeId>,
    pub class: MessageClass,
}

impl TransactionKey {
    /// Key of the transaction a command opens: its node and the class of
    /// the frame that will answer it
    pub fn for_command(command: &Command) -> Self {
        let class = match command {
            Command::ControllerVersion => MessageClass::GetVersion,
            Command::IsFailedNode(_) => MessageClass::IsFailedNodeId,
            Command::Query { .. } => MessageClass::ApplicationCommandHandler,
            Command::Set { .. } => MessageClass::SendData,
        };
        Self {
            node: command.node(),
            class,
        }
    }

    pub fn for_frame(frame: &Frame) -> Self {
        Self {
            node: frame.node(),
            class: frame.class(),
        }
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => write!(f, "node {} / {:?}", node, self.class),
            None => write!(f, "controller / {:?}", self.class),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Version information reported by the serial controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    pub version: String,
    pub library: LibraryType,
}

/// Typed value a completed transaction produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionResult {
    ControllerVersion(ControllerInfo),
    NodeFailed(bool),
    Level(u8),
    NodeVersion {
        library: LibraryType,
        protocol: (u8, u8),
        application: (u8, u8),
    },
    /// The controller accepted a set command for transmission
    Transmitted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionFailure {
    #[error("controller rejected the frame")]
    Rejected,

    #[error("no response within {0:?}")]
    TimedOut(Duration),
}

pub type TransactionOutcome = Result<TransactionResult, TransactionFailure>;

/// One in-flight request and, once terminal, its outcome
#[derive(Debug, Clone)]
pub struct Transaction {
    id: TransactionId,
    key: TransactionKey,
    command: Command,
    issued_at: Instant,
    state: TransactionState,
    outcome: Option<TransactionOutcome>,
}

impl Transaction {
    pub fn new(id: TransactionId, command: Command, issued_at: Instant) -> Self {
        Self {
            id,
            key: TransactionKey::for_command(&command),
            command,
            issued_at,
            state: TransactionState::Pending,
            outcome: None,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn key(&self) -> TransactionKey {
        self.key
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn outcome(&self) -> Option<&TransactionOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_overdue(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.issued_at) >= timeout
    }

    /// Record the decoded answer. Fails if the transaction is already terminal.
    pub fn complete(&mut self, outcome: TransactionOutcome) -> Result<(), TransitionError> {
        self.state = self.state.on_event(TransactionEvent::ResponseDecoded)?;
        self.outcome = Some(outcome);
        Ok(())
    }

    pub fn time_out(&mut self, after: Duration) -> Result<(), TransitionError> {
        self.state = self.state.on_event(TransactionEvent::Expired)?;
        self.outcome = Some(Err(TransactionFailure::TimedOut(after)));
        Ok(())
    }
}

/// Caller-side view of a submitted transaction.
///
/// Dropping the handle abandons interest in the outcome; the tracker still
/// completes or times the transaction out on its own.
#[derive(Debug)]
pub struct TransactionHandle {
    id: TransactionId,
    key: TransactionKey,
    receiver: oneshot::Receiver<TransactionOutcome>,
}

impl TransactionHandle {
    pub(crate) fn new(
        id: TransactionId,
        key: TransactionKey,
        receiver: oneshot::Receiver<TransactionOutcome>,
    ) -> Self {
        Self { id, key, receiver }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn key(&self) -> TransactionKey {
        self.key
    }

    /// Wait for the outcome. `None` if the tracker was dropped first.
    pub async fn outcome(self) -> Option<TransactionOutcome> {
        self.receiver.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{QueryTarget, SetAction};

    #[test]
    fn test_query_and_set_keys_differ() {
        let node = NodeId(5);
        let query = TransactionKey::for_command(&Command::query(node, QueryTarget::Basic));
        let set = TransactionKey::for_command(&Command::set(node, SetAction::Basic(10)));

        assert_eq!(query.node, Some(node));
        assert_eq!(query.class, MessageClass::ApplicationCommandHandler);
        assert_eq!(set.class, MessageClass::SendData);
        assert_ne!(query, set);
    }

    #[test]
    fn test_controller_key_has_no_node() {
        let key = TransactionKey::for_command(&Command::ControllerVersion);
        assert_eq!(key.node, None);
        assert_eq!(key.to_string(), "controller / GetVersion");
    }

    #[test]
    fn test_transaction_never_transitions_twice() {
        let mut txn = Transaction::new(TransactionId(1), Command::IsFailedNode(NodeId(4)), Instant::now());
        assert_eq!(txn.state(), TransactionState::Pending);

        txn.complete(Ok(TransactionResult::NodeFailed(true))).unwrap();
        assert_eq!(txn.state(), TransactionState::Completed);

        assert!(txn.complete(Ok(TransactionResult::NodeFailed(false))).is_err());
        assert!(txn.time_out(Duration::from_secs(1)).is_err());
        assert_eq!(txn.outcome(), Some(&Ok(TransactionResult::NodeFailed(true))));
    }

    #[test]
    fn test_overdue() {
        let issued = Instant::now();
        let txn = Transaction::new(TransactionId(1), Command::ControllerVersion, issued);
        let timeout = Duration::from_millis(100);

        assert!(!txn.is_overdue(issued, timeout));
        assert!(txn.is_overdue(issued + timeout, timeout));
    }
}
