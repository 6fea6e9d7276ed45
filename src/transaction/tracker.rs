//! Transaction tracker
//!
//! Owns the in-flight set. Submission, completion and timeout all go
//! through one mutex; events are published only after it is released.
//!
//! Controller responses do not echo the node they concern. They arrive in
//! the order the requests were written, so the tracker keeps a queue of
//! requests still owed a response and hands each node-less response to the
//! oldest request of its class.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, Mutex, RwLock};
use tracing::{debug, error, trace, warn};
use zwave_shared::{Frame, FrameType, MessageClass};

use super::unit::{self, DecodeError, Decoded};
use super::{
    ControllerInfo, Transaction, TransactionHandle, TransactionId, TransactionKey,
    TransactionOutcome, TransactionResult,
};
use crate::command::Command;
use crate::error::DispatchError;
use crate::events::{Event, EventRouter};
use crate::transport::Transport;

/// What the tracker did with an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    Completed(TransactionId),
    /// The controller took the request; its answer is still to come
    Acknowledged(TransactionId),
    Unsolicited,
}

struct InFlight {
    transaction: Transaction,
    notify: Option<oneshot::Sender<TransactionOutcome>>,
}

impl InFlight {
    fn finish(mut self) -> Transaction {
        if !self.transaction.state().is_terminal() {
            return self.transaction;
        }
        if let (Some(notify), Some(outcome)) = (self.notify.take(), self.transaction.outcome()) {
            // receiver may have been dropped
            let _ = notify.send(outcome.clone());
        }
        self.transaction
    }
}

/// A written request whose controller response has not arrived yet
#[derive(Debug, Clone, Copy)]
struct OwedResponse {
    id: TransactionId,
    key: TransactionKey,
    class: MessageClass,
}

#[derive(Default)]
struct InFlightSet {
    entries: HashMap<TransactionKey, InFlight>,
    owed: VecDeque<OwedResponse>,
}

impl InFlightSet {
    fn is_live(&self, key: &TransactionKey, id: TransactionId) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.transaction.id() == id)
    }

    /// Drop a transaction along with any response still owed to it
    fn discard(&mut self, key: &TransactionKey, id: TransactionId) {
        if self.is_live(key, id) {
            self.entries.remove(key);
        }
        self.owed.retain(|owed| owed.id != id);
    }

    /// Frames naming a node match that exact key. Node-less responses go to
    /// the oldest request of their class still owed one.
    fn match_key(&mut self, frame: &Frame) -> Option<TransactionKey> {
        let key = TransactionKey::for_frame(frame);
        if key.node.is_some() || frame.frame_type() != FrameType::Response {
            return self.entries.contains_key(&key).then_some(key);
        }

        let position = self.owed.iter().position(|owed| owed.class == key.class)?;
        let owed = self.owed.remove(position)?;
        if self.is_live(&owed.key, owed.id) {
            Some(owed.key)
        } else {
            trace!("Response for finished transaction {}", owed.id);
            None
        }
    }
}

enum Step {
    Unmatched,
    Done(InFlight),
    Acknowledged(TransactionId),
}

pub struct TransactionTracker {
    transport: Arc<dyn Transport>,
    router: Arc<EventRouter>,
    timeout: Duration,
    next_id: AtomicU64,
    in_flight: Mutex<InFlightSet>,
    /// Serializes submissions so `owed` matches the order frames are written
    submit_order: Mutex<()>,
    controller_info: RwLock<Option<ControllerInfo>>,
}

impl TransactionTracker {
    pub fn new(transport: Arc<dyn Transport>, router: Arc<EventRouter>, timeout: Duration) -> Self {
        Self {
            transport,
            router,
            timeout,
            next_id: AtomicU64::new(0),
            in_flight: Mutex::new(InFlightSet::default()),
            submit_order: Mutex::new(()),
            controller_info: RwLock::new(None),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    fn next_id(&self) -> TransactionId {
        TransactionId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Register a transaction for `command` and hand its frame to the transport.
    ///
    /// Returns once the frame is handed off; the outcome arrives through the
    /// returned handle and the event router.
    pub async fn submit(&self, command: Command) -> Result<TransactionHandle, DispatchError> {
        let key = TransactionKey::for_command(&command);
        let frame = unit::encode(&command);
        let class = frame.class();
        let (notify, receiver) = oneshot::channel();

        let _order = self.submit_order.lock().await;
        let id = {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.entries.contains_key(&key) {
                return Err(DispatchError::DuplicateInFlight(key));
            }
            let id = self.next_id();
            in_flight.entries.insert(
                key,
                InFlight {
                    transaction: Transaction::new(id, command, Instant::now()),
                    notify: Some(notify),
                },
            );
            in_flight.owed.push_back(OwedResponse { id, key, class });
            id
        };

        debug!("Submitting transaction {} for {}", id, key);

        if let Err(e) = self.transport.send(frame).await {
            self.in_flight.lock().await.discard(&key, id);
            error!("Failed to send transaction {}: {}", id, e);
            return Err(DispatchError::Transport(e.to_string()));
        }

        Ok(TransactionHandle::new(id, key, receiver))
    }

    /// Write a frame that opens no transaction. Whatever the controller
    /// answers is routed as an unsolicited event.
    pub async fn send_untracked(&self, frame: Frame) -> Result<(), DispatchError> {
        let _order = self.submit_order.lock().await;
        debug!("Sending untracked {:?} request", frame.class());
        self.transport
            .send(frame)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))
    }

    /// Match an inbound frame to its pending transaction, or route it as an
    /// unsolicited event. Frames must be fed one at a time in arrival order.
    pub async fn on_frame_received(&self, frame: Frame) -> Result<FrameDisposition, DispatchError> {
        let step = {
            let mut in_flight = self.in_flight.lock().await;
            let matched = in_flight.match_key(&frame);
            let decoded = matched.and_then(|key| {
                let entry = in_flight.entries.get_mut(&key)?;
                let id = entry.transaction.id();
                Some((key, id, unit::decode(&frame, &mut entry.transaction)))
            });

            match decoded {
                None => Step::Unmatched,
                Some((key, _, Ok(Decoded::Answered))) => match in_flight.entries.remove(&key) {
                    Some(entry) => Step::Done(entry),
                    None => Step::Unmatched,
                },
                Some((_, id, Ok(Decoded::Acknowledged))) => Step::Acknowledged(id),
                Some((_, _, Ok(Decoded::NotAnAnswer))) => Step::Unmatched,
                Some((key, _, Err(DecodeError::Malformed(e)))) => {
                    warn!("Malformed answer for {}: {}", key, e);
                    return Err(DispatchError::MalformedFrame(e));
                }
                Some((key, id, Err(DecodeError::Transition(e)))) => {
                    error!("Transaction for {} could not complete: {}", key, e);
                    in_flight.discard(&key, id);
                    Step::Unmatched
                }
            }
        };

        let entry = match step {
            Step::Done(entry) => entry,
            Step::Acknowledged(id) => {
                debug!("Transaction {} accepted by the controller", id);
                return Ok(FrameDisposition::Acknowledged(id));
            }
            Step::Unmatched => return Ok(self.route_unsolicited(&frame)),
        };

        let transaction = entry.finish();
        let id = transaction.id();
        let key = transaction.key();
        let Some(outcome) = transaction.outcome().cloned() else {
            return Ok(FrameDisposition::Completed(id));
        };
        debug!("Transaction {} for {} completed: {:?}", id, key, outcome);

        if let Ok(TransactionResult::ControllerVersion(info)) = &outcome {
            *self.controller_info.write().await = Some(info.clone());
        }
        let failed_node = match (&outcome, key.node) {
            (Ok(TransactionResult::NodeFailed(true)), Some(node)) => Some(node),
            _ => None,
        };

        self.router
            .publish(Event::TransactionCompleted { id, key, outcome });
        if let Some(node) = failed_node {
            warn!("Controller reports node {} as failed", node);
            self.router.publish(Event::NodeFailed { node });
        }

        Ok(FrameDisposition::Completed(id))
    }

    fn route_unsolicited(&self, frame: &Frame) -> FrameDisposition {
        trace!("Unmatched {:?} frame from {:?}", frame.class(), frame.node());
        self.router.publish(Event::from_frame(frame));
        FrameDisposition::Unsolicited
    }

    /// Time out every transaction pending since before `now - timeout`.
    /// Each one is reported exactly once.
    pub async fn expire_at(&self, now: Instant) -> Vec<TransactionId> {
        let expired: Vec<InFlight> = {
            let mut in_flight = self.in_flight.lock().await;
            let overdue: Vec<TransactionKey> = in_flight
                .entries
                .iter()
                .filter(|(_, entry)| entry.transaction.is_overdue(now, self.timeout))
                .map(|(key, _)| *key)
                .collect();
            let expired: Vec<InFlight> = overdue
                .into_iter()
                .filter_map(|key| in_flight.entries.remove(&key))
                .collect();
            for entry in &expired {
                let id = entry.transaction.id();
                in_flight.owed.retain(|owed| owed.id != id);
            }
            expired
        };

        let mut ids = Vec::with_capacity(expired.len());
        for mut entry in expired {
            if let Err(e) = entry.transaction.time_out(self.timeout) {
                error!("Cannot time out {}: {}", entry.transaction.id(), e);
                continue;
            }
            let transaction = entry.finish();
            let (id, key) = (transaction.id(), transaction.key());
            warn!("Transaction {} for {} timed out after {:?}", id, key, self.timeout);
            self.router.publish(Event::TransactionTimedOut { id, key });
            ids.push(id);
        }
        ids
    }

    pub async fn sweep_timeouts(&self) -> Vec<TransactionId> {
        self.expire_at(Instant::now()).await
    }

    pub async fn pending_count(&self) -> usize {
        self.in_flight.lock().await.entries.len()
    }

    pub async fn is_pending(&self, key: &TransactionKey) -> bool {
        self.in_flight.lock().await.entries.contains_key(key)
    }

    /// Last version reported by the controller, if it has answered one
    pub async fn controller_info(&self) -> Option<ControllerInfo> {
        self.controller_info.read().await.clone()
    }
}
