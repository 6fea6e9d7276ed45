//! Protocol frames
//!
//! A [`Frame`] is one serial API message with the transport framing
//! (SOF, length, checksum) already stripped:
//!
//! ```text
//! [ type: u8 ][ message class: u8 ][ payload ... ]
//! ```
//!
//! Frames are immutable once built.

use bytes::Bytes;
use thiserror::Error;

use crate::{FrameType, MessageClass, NodeId, Priority};

/// Errors that can occur while building or parsing frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("{class:?} frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        class: MessageClass,
        expected: usize,
        actual: usize,
    },

    #[error("Frame too long: {actual} bytes (max: {max})")]
    TooLong { max: usize, actual: usize },

    #[error("Unknown message class: 0x{0:02X}")]
    UnknownMessageClass(u8),

    #[error("Unknown frame type: 0x{0:02X}")]
    UnknownFrameType(u8),

    #[error("Invalid length byte: {0}")]
    InvalidLength(u8),

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    BadChecksum { expected: u8, actual: u8 },
}

/// Identifies what a frame is: its class, direction and send priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub class: MessageClass,
    pub frame_type: FrameType,
    pub priority: Priority,
}

/// One protocol message exchanged with the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    node: Option<NodeId>,
    payload: Bytes,
}

impl Frame {
    /// Build an outgoing request frame
    pub fn request(
        class: MessageClass,
        priority: Priority,
        node: Option<NodeId>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            header: FrameHeader {
                class,
                frame_type: FrameType::Request,
                priority,
            },
            node,
            payload: payload.into(),
        }
    }

    /// Build an inbound frame. Inbound frames carry no send priority.
    pub fn inbound(
        class: MessageClass,
        frame_type: FrameType,
        node: Option<NodeId>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            header: FrameHeader {
                class,
                frame_type,
                priority: Priority::Poll,
            },
            node,
            payload: payload.into(),
        }
    }

    /// Parse `[type, class, payload...]` as delivered by the serial codec.
    ///
    /// Frames whose payload names the originating node (application
    /// commands and updates) get their node filled in; controller
    /// responses do not echo the node and are left without one.
    pub fn from_serial(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < 2 {
            return Err(FrameError::InvalidLength(data.len() as u8));
        }

        let frame_type = FrameType::try_from(data[0])?;
        let class = MessageClass::try_from(data[1])?;
        let payload = Bytes::copy_from_slice(&data[2..]);

        let node = match class {
            MessageClass::ApplicationCommandHandler | MessageClass::ApplicationUpdate
                if frame_type == FrameType::Request =>
            {
                payload.get(1).copied().map(NodeId)
            }
            _ => None,
        };

        Ok(Self::inbound(class, frame_type, node, payload))
    }

    /// Serialize to `[type, class, payload...]` for the serial codec
    pub fn to_serial(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(2 + self.payload.len());
        data.push(self.header.frame_type as u8);
        data.push(self.header.class.code());
        data.extend_from_slice(&self.payload);
        data
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn class(&self) -> MessageClass {
        self.header.class
    }

    pub fn frame_type(&self) -> FrameType {
        self.header.frame_type
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Fail with [`FrameError::TooShort`] unless the payload holds `min` bytes
    pub fn require_len(&self, min: usize) -> Result<(), FrameError> {
        if self.payload.len() < min {
            return Err(FrameError::TooShort {
                class: self.header.class,
                expected: min,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    /// Command-class bytes (`cc, cmd, args...`) carried by a SendData request
    pub fn command_bytes(&self) -> Option<&[u8]> {
        if self.header.class != MessageClass::SendData || self.payload.len() < 2 {
            return None;
        }
        let len = self.payload[1] as usize;
        self.payload.get(2..2 + len)
    }
}
