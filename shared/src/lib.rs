//! Z-Wave Shared Protocol Types
//!
//! This crate provides the protocol vocabulary shared between the control
//! bridge and the host that talks to the serial controller: node ids,
//! message classes, command classes, the immutable [`Frame`], the serial
//! codec and the transaction state machine.

pub mod codec;
pub mod command_class;
pub mod frame;
pub mod transaction;

use std::fmt;

pub use command_class::{
    CommandClass, LibraryType, SetpointType, ThermostatFanMode, ThermostatMode,
};
pub use frame::{Frame, FrameError, FrameHeader};
pub use transaction::{TransactionEvent, TransactionState, TransitionError};

/// Timing parameters for the system
pub mod timing {
    /// How long a transaction may stay pending before it times out
    pub const TRANSACTION_TIMEOUT_MS: u64 = 5000;

    /// How often the tracker is swept for overdue transactions
    pub const SWEEP_INTERVAL_MS: u64 = 250;

    /// Serial link speed used by every Z-Wave static controller stick
    pub const SERIAL_BAUD_RATE: u32 = 115_200;
}

/// Transmit options appended to every SendData payload (ACK | AUTO_ROUTE | EXPLORE)
pub const TRANSMIT_OPTIONS: u8 = 0x25;

/// A node on the Z-Wave network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u8);

impl NodeId {
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for NodeId {
    fn from(id: u8) -> Self {
        NodeId(id)
    }
}

/// Serial API function ids ("message classes") understood by the bridge
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    SerialApiGetInitData = 0x02,
    ApplicationCommandHandler = 0x04,
    SendData = 0x13,
    GetVersion = 0x15,
    ApplicationUpdate = 0x49,
    IsFailedNodeId = 0x62,
}

impl MessageClass {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageClass {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x02 => Ok(MessageClass::SerialApiGetInitData),
            0x04 => Ok(MessageClass::ApplicationCommandHandler),
            0x13 => Ok(MessageClass::SendData),
            0x15 => Ok(MessageClass::GetVersion),
            0x49 => Ok(MessageClass::ApplicationUpdate),
            0x62 => Ok(MessageClass::IsFailedNodeId),
            other => Err(FrameError::UnknownMessageClass(other)),
        }
    }
}

/// Direction of a serial data frame
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    Request = 0x00,
    Response = 0x01,
}

impl TryFrom<u8> for FrameType {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x00 => Ok(FrameType::Request),
            0x01 => Ok(FrameType::Response),
            other => Err(FrameError::UnknownFrameType(other)),
        }
    }
}

/// Send-queue priority of an outgoing frame. Ordered highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    High,
    Set,
    Get,
    Poll,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_class_codes() {
        for class in [
            MessageClass::SerialApiGetInitData,
            MessageClass::ApplicationCommandHandler,
            MessageClass::SendData,
            MessageClass::GetVersion,
            MessageClass::ApplicationUpdate,
            MessageClass::IsFailedNodeId,
        ] {
            assert_eq!(MessageClass::try_from(class.code()).unwrap(), class);
        }
        assert!(matches!(
            MessageClass::try_from(0xEE),
            Err(FrameError::UnknownMessageClass(0xEE))
        ));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High < Priority::Set);
        assert!(Priority::Set < Priority::Get);
        assert!(Priority::Get < Priority::Poll);
    }

    #[test]
    fn test_node_display() {
        assert_eq!(NodeId(5).to_string(), "5");
    }
}
