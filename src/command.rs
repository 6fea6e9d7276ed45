//! Typed, validated commands
//!
//! A [`Command`] is only ever built from values that already passed range
//! and enumeration checks; the constructors of the parameter types below
//! are the only way to obtain them.

use zwave_shared::{CommandClass, NodeId, SetpointType, ThermostatFanMode, ThermostatMode};

use crate::error::DispatchError;

/// Highest node id a Z-Wave network can assign
pub const MAX_NODE_ID: u8 = 232;

/// Largest wake-up interval, in seconds, that fits the 24-bit field
pub const MAX_WAKE_UP_INTERVAL: u32 = 0x00FF_FFFF;

const MAX_SETPOINT_PRECISION: i32 = 7;

/// One instruction for the controller or for a capability of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the controller for its protocol library version
    ControllerVersion,
    /// Ask the controller whether it lists a node as failed
    IsFailedNode(NodeId),
    /// Request the current value of a capability
    Query { node: NodeId, target: QueryTarget },
    /// Change the value of a capability
    Set { node: NodeId, action: SetAction },
}

impl Command {
    pub fn query(node: NodeId, target: QueryTarget) -> Self {
        Command::Query { node, target }
    }

    pub fn set(node: NodeId, action: SetAction) -> Self {
        Command::Set { node, action }
    }

    /// The node this command is addressed to, if any
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Command::ControllerVersion => None,
            Command::IsFailedNode(node) => Some(*node),
            Command::Query { node, .. } | Command::Set { node, .. } => Some(*node),
        }
    }

    pub fn command_class(&self) -> Option<CommandClass> {
        match self {
            Command::Query { target, .. } => Some(target.command_class()),
            Command::Set { action, .. } => Some(action.command_class()),
            _ => None,
        }
    }
}

/// Capabilities whose current value can be queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget {
    Basic,
    BinarySwitch,
    MultilevelSwitch,
    Version,
}

impl QueryTarget {
    pub fn command_class(self) -> CommandClass {
        match self {
            QueryTarget::Basic => CommandClass::Basic,
            QueryTarget::BinarySwitch => CommandClass::SwitchBinary,
            QueryTarget::MultilevelSwitch => CommandClass::SwitchMultilevel,
            QueryTarget::Version => CommandClass::Version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetAction {
    Basic(u8),
    BinarySwitch(bool),
    MultilevelSwitch(u8),
    Configuration(ConfigurationParameter),
    AssociationSet(Association),
    AssociationRemove(Association),
    ThermostatMode(ThermostatMode),
    ThermostatFanMode(ThermostatFanMode),
    ThermostatSetpoint {
        setpoint_type: SetpointType,
        scale: TemperatureScale,
        value: Setpoint,
    },
    WakeUpInterval {
        interval: WakeUpInterval,
        /// Node the device should notify when it wakes
        controller: NodeId,
    },
}

impl SetAction {
    pub fn command_class(&self) -> CommandClass {
        match self {
            SetAction::Basic(_) => CommandClass::Basic,
            SetAction::BinarySwitch(_) => CommandClass::SwitchBinary,
            SetAction::MultilevelSwitch(_) => CommandClass::SwitchMultilevel,
            SetAction::Configuration(_) => CommandClass::Configuration,
            SetAction::AssociationSet(_) | SetAction::AssociationRemove(_) => {
                CommandClass::Association
            }
            SetAction::ThermostatMode(_) => CommandClass::ThermostatMode,
            SetAction::ThermostatFanMode(_) => CommandClass::ThermostatFanMode,
            SetAction::ThermostatSetpoint { .. } => CommandClass::ThermostatSetpoint,
            SetAction::WakeUpInterval { .. } => CommandClass::WakeUp,
        }
    }
}

/// Check that `value` is a node id a network can hold
pub fn node_id(field: &'static str, value: i64) -> Result<NodeId, DispatchError> {
    if !(1..=MAX_NODE_ID as i64).contains(&value) {
        return Err(DispatchError::invalid(
            field,
            format!("must be between 1 and {}", MAX_NODE_ID),
        ));
    }
    Ok(NodeId(value as u8))
}

/// A device configuration parameter: index, byte width and signed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationParameter {
    index: u8,
    size: u8,
    value: i32,
}

impl ConfigurationParameter {
    pub fn new(index: i64, value: i64, size: i64) -> Result<Self, DispatchError> {
        if !matches!(size, 1 | 2 | 4) {
            return Err(DispatchError::invalid("size", "must be 1, 2, or 4"));
        }
        if !(0..=255).contains(&index) {
            return Err(DispatchError::invalid("index", "must be between 0 and 255"));
        }

        let bits = 8 * size as u32;
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        if !(min..=max).contains(&value) {
            return Err(DispatchError::invalid(
                "value",
                format!("must fit in {} byte(s) ({} to {})", size, min, max),
            ));
        }

        Ok(Self {
            index: index as u8,
            size: size as u8,
            value: value as i32,
        })
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Value as `size` big-endian bytes
    pub fn value_bytes(&self) -> Vec<u8> {
        self.value.to_be_bytes()[4 - self.size as usize..].to_vec()
    }
}

/// A (group, target node) association entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    group: u8,
    target: NodeId,
}

impl Association {
    pub fn new(group: i64, target: i64) -> Result<Self, DispatchError> {
        if !(1..=255).contains(&group) {
            return Err(DispatchError::invalid("group", "must be between 1 and 255"));
        }
        Ok(Self {
            group: group as u8,
            target: node_id("target", target)?,
        })
    }

    pub fn group(&self) -> u8 {
        self.group
    }

    pub fn target(&self) -> NodeId {
        self.target
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureScale {
    Celsius = 0,
    Fahrenheit = 1,
}

impl TemperatureScale {
    pub fn from_code(code: i64) -> Result<Self, DispatchError> {
        match code {
            0 => Ok(TemperatureScale::Celsius),
            1 => Ok(TemperatureScale::Fahrenheit),
            _ => Err(DispatchError::invalid("scale", "must be either 0 or 1")),
        }
    }
}

/// A fixed-point decimal as carried by the setpoint class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setpoint {
    value: i32,
    precision: u8,
}

impl Setpoint {
    /// Parse a decimal string, keeping as many fraction digits as it was written with
    pub fn parse(field: &'static str, text: &str) -> Result<Self, DispatchError> {
        let text = text.trim();
        let number: f64 = text
            .parse()
            .map_err(|_| DispatchError::invalid(field, "must be a number"))?;
        if !number.is_finite() {
            return Err(DispatchError::invalid(field, "must be a finite number"));
        }

        let mut parts = text.splitn(2, |c: char| c == 'e' || c == 'E');
        let mantissa = parts.next().unwrap_or(text);
        let exponent: i32 = parts.next().and_then(|e| e.parse().ok()).unwrap_or(0);
        let fraction_digits = mantissa
            .split_once('.')
            .map(|(_, fraction)| i32::try_from(fraction.len()).unwrap_or(i32::MAX))
            .unwrap_or(0);
        let precision = fraction_digits
            .saturating_sub(exponent)
            .clamp(0, MAX_SETPOINT_PRECISION);

        let scaled = (number * 10f64.powi(precision)).round();
        if scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return Err(DispatchError::invalid(field, "is out of range"));
        }

        Ok(Self {
            value: scaled as i32,
            precision: precision as u8,
        })
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Smallest byte width (1, 2 or 4) that holds the value
    pub fn size(&self) -> u8 {
        if i8::try_from(self.value).is_ok() {
            1
        } else if i16::try_from(self.value).is_ok() {
            2
        } else {
            4
        }
    }

    pub fn value_bytes(&self) -> Vec<u8> {
        self.value.to_be_bytes()[4 - self.size() as usize..].to_vec()
    }
}

/// Seconds between wake-ups of a battery device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeUpInterval(u32);

impl WakeUpInterval {
    pub fn new(seconds: i64) -> Result<Self, DispatchError> {
        if !(0..=MAX_WAKE_UP_INTERVAL as i64).contains(&seconds) {
            return Err(DispatchError::invalid(
                "interval",
                format!("must be between 0 and {}", MAX_WAKE_UP_INTERVAL),
            ));
        }
        Ok(Self(seconds as u32))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }
}
