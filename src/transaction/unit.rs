//! Transaction unit: command encoding and response decoding
//!
//! `encode` is pure. `decode` parses a frame against the transaction that
//! is waiting for it and, as its final step, completes that transaction.

use thiserror::Error;
use zwave_shared::command_class::command;
use zwave_shared::{
    Frame, FrameError, LibraryType, MessageClass, NodeId, Priority, TransitionError,
    TRANSMIT_OPTIONS,
};

use super::{ControllerInfo, Transaction, TransactionFailure, TransactionOutcome, TransactionResult};
use crate::command::{Command, QueryTarget, SetAction};

/// Bytes of a GetVersion response: 12 of version text, one library type
const VERSION_RESPONSE_LEN: usize = 13;

/// `rx_status, node, len, cc, cmd`
const APPLICATION_COMMAND_HEADER: usize = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error(transparent)]
    Malformed(#[from] FrameError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// What decoding made of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// The frame answered the transaction, which is now complete
    Answered,
    /// Right key, wrong content (another report from the same node)
    NotAnAnswer,
    /// The controller accepted a query for transmission; its report is
    /// still outstanding
    Acknowledged,
}

/// Build the outgoing frame for a command
pub fn encode(command: &Command) -> Frame {
    match command {
        Command::ControllerVersion => {
            Frame::request(MessageClass::GetVersion, Priority::High, None, Vec::new())
        }
        Command::IsFailedNode(node) => Frame::request(
            MessageClass::IsFailedNodeId,
            Priority::High,
            Some(*node),
            vec![node.get()],
        ),
        Command::Query { node, target } => send_data(*node, Priority::Get, query_bytes(*target)),
        Command::Set { node, action } => send_data(*node, Priority::Set, set_bytes(action)),
    }
}

/// Request for the controller's node list. Its response signals that the
/// network is initialised.
pub fn network_init_request() -> Frame {
    Frame::request(MessageClass::SerialApiGetInitData, Priority::High, None, Vec::new())
}

fn send_data(node: NodeId, priority: Priority, command_bytes: Vec<u8>) -> Frame {
    let mut payload = Vec::with_capacity(command_bytes.len() + 3);
    payload.push(node.get());
    payload.push(command_bytes.len() as u8);
    payload.extend_from_slice(&command_bytes);
    payload.push(TRANSMIT_OPTIONS);
    Frame::request(MessageClass::SendData, priority, Some(node), payload)
}

/// `(get, report)` command ids used to query a target
fn query_commands(target: QueryTarget) -> (u8, u8) {
    target
        .command_class()
        .query_commands()
        .unwrap_or((command::GET, command::REPORT))
}

fn query_bytes(target: QueryTarget) -> Vec<u8> {
    let (get, _) = query_commands(target);
    vec![target.command_class().code(), get]
}

fn set_bytes(action: &SetAction) -> Vec<u8> {
    let cc = action.command_class().code();
    match action {
        SetAction::Basic(level) | SetAction::MultilevelSwitch(level) => {
            vec![cc, command::SET, *level]
        }
        SetAction::BinarySwitch(on) => vec![cc, command::SET, if *on { 0xFF } else { 0x00 }],
        SetAction::Configuration(param) => {
            let mut bytes = vec![cc, command::CONFIGURATION_SET, param.index(), param.size()];
            bytes.extend(param.value_bytes());
            bytes
        }
        SetAction::AssociationSet(assoc) => vec![
            cc,
            command::ASSOCIATION_SET,
            assoc.group(),
            assoc.target().get(),
        ],
        SetAction::AssociationRemove(assoc) => vec![
            cc,
            command::ASSOCIATION_REMOVE,
            assoc.group(),
            assoc.target().get(),
        ],
        SetAction::ThermostatMode(mode) => vec![cc, command::SET, *mode as u8],
        SetAction::ThermostatFanMode(mode) => vec![cc, command::SET, *mode as u8],
        SetAction::ThermostatSetpoint {
            setpoint_type,
            scale,
            value,
        } => {
            let format = (value.precision() << 5) | ((*scale as u8) << 3) | value.size();
            let mut bytes = vec![cc, command::SET, *setpoint_type as u8, format];
            bytes.extend(value.value_bytes());
            bytes
        }
        SetAction::WakeUpInterval {
            interval,
            controller,
        } => {
            let seconds = interval.seconds();
            vec![
                cc,
                command::WAKE_UP_INTERVAL_SET,
                (seconds >> 16) as u8,
                (seconds >> 8) as u8,
                seconds as u8,
                controller.get(),
            ]
        }
    }
}

/// Decode `frame` as the answer to `origin` and complete it
pub fn decode(frame: &Frame, origin: &mut Transaction) -> Result<Decoded, DecodeError> {
    let payload = frame.payload();

    let outcome: TransactionOutcome = match frame.class() {
        MessageClass::GetVersion => {
            frame.require_len(VERSION_RESPONSE_LEN)?;
            let text = &payload[..VERSION_RESPONSE_LEN - 1];
            let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
            Ok(TransactionResult::ControllerVersion(ControllerInfo {
                version: String::from_utf8_lossy(&text[..end]).trim().to_string(),
                library: LibraryType::from_code(payload[VERSION_RESPONSE_LEN - 1]),
            }))
        }
        MessageClass::IsFailedNodeId => {
            frame.require_len(1)?;
            Ok(TransactionResult::NodeFailed(payload[0] != 0))
        }
        MessageClass::SendData => {
            frame.require_len(1)?;
            let is_query = matches!(origin.command(), Command::Query { .. });
            if is_query && payload[0] != 0 {
                return Ok(Decoded::Acknowledged);
            }
            if payload[0] != 0 {
                Ok(TransactionResult::Transmitted)
            } else {
                Err(TransactionFailure::Rejected)
            }
        }
        MessageClass::ApplicationCommandHandler => {
            let Command::Query { target, .. } = origin.command() else {
                return Ok(Decoded::NotAnAnswer);
            };
            let target = *target;

            frame.require_len(APPLICATION_COMMAND_HEADER)?;
            let len = payload[2] as usize;
            frame.require_len(3 + len)?;

            let (cc, cmd) = (payload[3], payload[4]);
            if cc != target.command_class().code() || cmd != query_commands(target).1 {
                return Ok(Decoded::NotAnAnswer);
            }

            let data = &payload[APPLICATION_COMMAND_HEADER..3 + len];
            Ok(decode_report(frame, target, data)?)
        }
        _ => return Ok(Decoded::NotAnAnswer),
    };

    origin.complete(outcome)?;
    Ok(Decoded::Answered)
}

fn decode_report(
    frame: &Frame,
    target: QueryTarget,
    data: &[u8],
) -> Result<TransactionResult, FrameError> {
    let needed = match target {
        QueryTarget::Version => 5,
        _ => 1,
    };
    if data.len() < needed {
        return Err(FrameError::TooShort {
            class: frame.class(),
            expected: APPLICATION_COMMAND_HEADER + needed,
            actual: APPLICATION_COMMAND_HEADER + data.len(),
        });
    }

    Ok(match target {
        QueryTarget::Version => TransactionResult::NodeVersion {
            library: LibraryType::from_code(data[0]),
            protocol: (data[1], data[2]),
            application: (data[3], data[4]),
        },
        _ => TransactionResult::Level(data[0]),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use zwave_shared::{codec, FrameType, SetpointType, ThermostatMode, TransactionState};

    use super::*;
    use crate::command::{
        Association, ConfigurationParameter, Setpoint, TemperatureScale, WakeUpInterval,
    };
    use crate::transaction::TransactionId;

    fn pending(command: Command) -> Transaction {
        Transaction::new(TransactionId(1), command, Instant::now())
    }

    fn set_payload(action: SetAction) -> Vec<u8> {
        encode(&Command::set(NodeId(5), action)).payload().to_vec()
    }

    #[test]
    fn test_encode_get_version_matches_wire() {
        let frame = encode(&Command::ControllerVersion);
        assert_eq!(frame.header().priority, Priority::High);
        assert_eq!(codec::encode(&frame).unwrap().as_ref(), &[0x01, 0x03, 0x00, 0x15, 0xE9]);
    }

    #[test]
    fn test_encode_multilevel_set() {
        let frame = encode(&Command::set(NodeId(5), SetAction::MultilevelSwitch(200)));
        assert_eq!(frame.class(), MessageClass::SendData);
        assert_eq!(frame.node(), Some(NodeId(5)));
        assert_eq!(frame.header().priority, Priority::Set);
        assert_eq!(frame.payload().as_ref(), &[5, 3, 0x26, 0x01, 200, TRANSMIT_OPTIONS]);
        assert_eq!(frame.command_bytes(), Some(&[0x26, 0x01, 200][..]));
    }

    #[test]
    fn test_encode_query_and_binary_switch() {
        let frame = encode(&Command::query(NodeId(9), QueryTarget::Basic));
        assert_eq!(frame.header().priority, Priority::Get);
        assert_eq!(frame.command_bytes(), Some(&[0x20, 0x02][..]));

        let frame = encode(&Command::query(NodeId(9), QueryTarget::Version));
        assert_eq!(frame.command_bytes(), Some(&[0x86, 0x11][..]));

        assert_eq!(set_payload(SetAction::BinarySwitch(true))[2..5], [0x25, 0x01, 0xFF]);
    }

    #[test]
    fn test_encode_configuration_and_association() {
        let param = ConfigurationParameter::new(12, 300, 2).unwrap();
        assert_eq!(
            set_payload(SetAction::Configuration(param))[1..8],
            [6, 0x70, 0x04, 12, 2, 0x01, 0x2C]
        );

        let assoc = Association::new(1, 1).unwrap();
        assert_eq!(set_payload(SetAction::AssociationRemove(assoc))[2..6], [0x85, 0x04, 1, 1]);
    }

    #[test]
    fn test_encode_thermostat_and_wake_up() {
        let value = Setpoint::parse("setpoint", "21.5").unwrap();
        let payload = set_payload(SetAction::ThermostatSetpoint {
            setpoint_type: SetpointType::Heating,
            scale: TemperatureScale::Celsius,
            value,
        });
        // precision 1, scale 0, size 2
        assert_eq!(payload[2..8], [0x43, 0x01, 0x01, 0x22, 0x00, 0xD7]);

        let payload = set_payload(SetAction::ThermostatMode(ThermostatMode::Heat));
        assert_eq!(payload[2..5], [0x40, 0x01, 0x01]);

        let payload = set_payload(SetAction::WakeUpInterval {
            interval: WakeUpInterval::new(3600).unwrap(),
            controller: NodeId(1),
        });
        assert_eq!(payload[2..8], [0x84, 0x04, 0x00, 0x0E, 0x10, 0x01]);
    }

    #[test]
    fn test_decode_controller_version() {
        let mut payload = b"Z-Wave 3.95\0".to_vec();
        payload.push(0x01);
        let frame = Frame::inbound(MessageClass::GetVersion, FrameType::Response, None, payload);

        let mut txn = pending(Command::ControllerVersion);
        assert_eq!(decode(&frame, &mut txn), Ok(Decoded::Answered));
        assert_eq!(txn.state(), TransactionState::Completed);
        assert_eq!(
            txn.outcome(),
            Some(&Ok(TransactionResult::ControllerVersion(ControllerInfo {
                version: "Z-Wave 3.95".to_string(),
                library: LibraryType::StaticController,
            })))
        );
    }

    #[test]
    fn test_short_frame_is_malformed_and_leaves_pending() {
        let frame = Frame::inbound(MessageClass::GetVersion, FrameType::Response, None, vec![0x5A; 4]);
        let mut txn = pending(Command::ControllerVersion);

        assert!(matches!(
            decode(&frame, &mut txn),
            Err(DecodeError::Malformed(FrameError::TooShort { expected: 13, actual: 4, .. }))
        ));
        assert_eq!(txn.state(), TransactionState::Pending);
    }

    #[test]
    fn test_decode_failed_node() {
        let frame = Frame::inbound(MessageClass::IsFailedNodeId, FrameType::Response, None, vec![0x01]);
        let mut txn = pending(Command::IsFailedNode(NodeId(4)));

        decode(&frame, &mut txn).unwrap();
        assert_eq!(txn.outcome(), Some(&Ok(TransactionResult::NodeFailed(true))));
    }

    #[test]
    fn test_decode_send_data_rejected() {
        let frame = Frame::inbound(MessageClass::SendData, FrameType::Response, None, vec![0x00]);
        let mut txn = pending(Command::set(NodeId(5), SetAction::Basic(0)));

        decode(&frame, &mut txn).unwrap();
        assert_eq!(txn.outcome(), Some(&Err(TransactionFailure::Rejected)));
    }

    #[test]
    fn test_query_ack_keeps_query_pending() {
        let ack = Frame::inbound(MessageClass::SendData, FrameType::Response, None, vec![0x01]);
        let mut txn = pending(Command::query(NodeId(6), QueryTarget::MultilevelSwitch));

        assert_eq!(decode(&ack, &mut txn), Ok(Decoded::Acknowledged));
        assert_eq!(txn.state(), TransactionState::Pending);

        let refused = Frame::inbound(MessageClass::SendData, FrameType::Response, None, vec![0x00]);
        assert_eq!(decode(&refused, &mut txn), Ok(Decoded::Answered));
        assert_eq!(txn.outcome(), Some(&Err(TransactionFailure::Rejected)));
    }

    #[test]
    fn test_decode_level_report() {
        let frame = Frame::from_serial(&[0x00, 0x04, 0x00, 0x09, 0x03, 0x20, 0x03, 0x63]).unwrap();
        let mut txn = pending(Command::query(NodeId(9), QueryTarget::Basic));

        assert_eq!(decode(&frame, &mut txn), Ok(Decoded::Answered));
        assert_eq!(txn.outcome(), Some(&Ok(TransactionResult::Level(0x63))));
    }

    #[test]
    fn test_decode_other_report_is_not_an_answer() {
        // Battery report from the node we are querying for a Basic level
        let frame = Frame::from_serial(&[0x00, 0x04, 0x00, 0x09, 0x03, 0x80, 0x03, 0x50]).unwrap();
        let mut txn = pending(Command::query(NodeId(9), QueryTarget::Basic));

        assert_eq!(decode(&frame, &mut txn), Ok(Decoded::NotAnAnswer));
        assert_eq!(txn.state(), TransactionState::Pending);
    }

    #[test]
    fn test_decode_node_version() {
        let frame = Frame::from_serial(&[
            0x00, 0x04, 0x00, 0x09, 0x07, 0x86, 0x12, 0x06, 0x03, 0x43, 0x01, 0x02,
        ])
        .unwrap();
        let mut txn = pending(Command::query(NodeId(9), QueryTarget::Version));

        decode(&frame, &mut txn).unwrap();
        assert_eq!(
            txn.outcome(),
            Some(&Ok(TransactionResult::NodeVersion {
                library: LibraryType::RoutingSlave,
                protocol: (3, 0x43),
                application: (1, 2),
            }))
        );
    }
}
