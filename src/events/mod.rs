//! Events surfaced by the bridge
//!
//! Events are either unsolicited notifications from the controller or
//! reports about transactions finishing. They are immutable and handed to
//! every listener of the [`EventRouter`].

mod router;

pub use router::{ChannelListener, EventListener, EventRouter};

use bytes::Bytes;
use tracing::{debug, info, warn};
use zwave_shared::{CommandClass, Frame, FrameType, MessageClass, NodeId};

use crate::transaction::{TransactionId, TransactionKey, TransactionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NetworkInitializationComplete,
    NodeFailed,
    CommandClassReport,
    NodeUpdate,
    TransactionCompleted,
    TransactionTimedOut,
    Unhandled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The controller finished initialising the network
    NetworkInitializationComplete,
    /// The controller lists `node` as failed
    NodeFailed { node: NodeId },
    /// A command class report nobody was waiting for
    CommandClassReport {
        node: NodeId,
        command_class: u8,
        command: u8,
        data: Bytes,
    },
    /// Node information update (`status` is the raw update state)
    NodeUpdate { node: Option<NodeId>, status: u8 },
    TransactionCompleted {
        id: TransactionId,
        key: TransactionKey,
        outcome: TransactionOutcome,
    },
    TransactionTimedOut {
        id: TransactionId,
        key: TransactionKey,
    },
    /// A frame the bridge has no interpretation for
    Unhandled { frame: Frame },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NetworkInitializationComplete => EventKind::NetworkInitializationComplete,
            Event::NodeFailed { .. } => EventKind::NodeFailed,
            Event::CommandClassReport { .. } => EventKind::CommandClassReport,
            Event::NodeUpdate { .. } => EventKind::NodeUpdate,
            Event::TransactionCompleted { .. } => EventKind::TransactionCompleted,
            Event::TransactionTimedOut { .. } => EventKind::TransactionTimedOut,
            Event::Unhandled { .. } => EventKind::Unhandled,
        }
    }

    /// Node the event originated from, when it names one
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Event::NodeFailed { node } | Event::CommandClassReport { node, .. } => Some(*node),
            Event::NodeUpdate { node, .. } => *node,
            Event::TransactionCompleted { key, .. } | Event::TransactionTimedOut { key, .. } => {
                key.node
            }
            Event::Unhandled { frame } => frame.node(),
            Event::NetworkInitializationComplete => None,
        }
    }

    /// Classify a frame that matched no pending transaction
    pub fn from_frame(frame: &Frame) -> Self {
        let payload = frame.payload();

        match (frame.class(), frame.frame_type()) {
            (MessageClass::ApplicationCommandHandler, FrameType::Request) => {
                // rx_status, node, len, cc, cmd, data...
                let len = payload.get(2).copied().unwrap_or(0) as usize;
                match frame.node() {
                    Some(node) if len >= 2 && payload.len() >= 3 + len => {
                        Event::CommandClassReport {
                            node,
                            command_class: payload[3],
                            command: payload[4],
                            data: payload.slice(5..3 + len),
                        }
                    }
                    _ => Event::Unhandled {
                        frame: frame.clone(),
                    },
                }
            }
            (MessageClass::SerialApiGetInitData, FrameType::Response) => {
                Event::NetworkInitializationComplete
            }
            (MessageClass::ApplicationUpdate, _) if !payload.is_empty() => Event::NodeUpdate {
                node: frame.node(),
                status: payload[0],
            },
            _ => Event::Unhandled {
                frame: frame.clone(),
            },
        }
    }
}

/// Listener that writes every event to the log
#[derive(Debug, Default)]
pub struct LoggingListener;

impl EventListener for LoggingListener {
    fn on_event(&self, event: &Event) {
        match event {
            Event::NetworkInitializationComplete => info!("Z-Wave network initialised"),
            Event::NodeFailed { node } => warn!("Node {} marked failed", node),
            Event::TransactionCompleted { id, key, outcome } => match outcome {
                Ok(result) => info!("Transaction {} ({}) completed: {:?}", id, key, result),
                Err(failure) => warn!("Transaction {} ({}) failed: {}", id, key, failure),
            },
            Event::TransactionTimedOut { id, key } => {
                warn!("Transaction {} ({}) timed out", id, key)
            }
            Event::CommandClassReport {
                node,
                command_class,
                command,
                data,
            } => match CommandClass::from_code(*command_class) {
                Some(class) => debug!(
                    "Report from node {}: {:?} cmd 0x{:02X} {:02X?}",
                    node,
                    class,
                    command,
                    data.as_ref()
                ),
                None => debug!(
                    "Report from node {}: class 0x{:02X} cmd 0x{:02X} {:02X?}",
                    node,
                    command_class,
                    command,
                    data.as_ref()
                ),
            },
            Event::NodeUpdate { node, status } => {
                debug!("Node update for {:?}: status 0x{:02X}", node, status)
            }
            Event::Unhandled { frame } => {
                debug!("Unhandled {:?} {:?} frame", frame.class(), frame.frame_type())
            }
        }
    }
}
