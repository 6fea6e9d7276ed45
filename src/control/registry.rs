//! Capability registry
//!
//! The fixed catalogue of control types. Each control carries the command
//! class it manipulates as a plain tag, so matching a device capability to a
//! control is a comparison, not a type check.

use std::fmt;

use zwave_shared::CommandClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlType {
    Alarm,
    AlarmSensor,
    Association,
    Basic,
    Battery,
    BinarySensor,
    BinarySwitch,
    Configuration,
    Hail,
    ManufacturerSpecific,
    Meter,
    MultilevelSensor,
    MultilevelSwitch,
    NoOperation,
    SceneActivation,
    ThermostatFanMode,
    ThermostatFanState,
    ThermostatMode,
    ThermostatOperatingState,
    ThermostatSetpoint,
    Version,
    WakeUp,
    /// Sentinel for tokens and classes outside the catalogue
    Unknown,
}

impl ControlType {
    /// Every control, in catalogue order. `Unknown` comes last.
    pub const ALL: [ControlType; 23] = [
        ControlType::Alarm,
        ControlType::AlarmSensor,
        ControlType::Association,
        ControlType::Basic,
        ControlType::Battery,
        ControlType::BinarySensor,
        ControlType::BinarySwitch,
        ControlType::Configuration,
        ControlType::Hail,
        ControlType::ManufacturerSpecific,
        ControlType::Meter,
        ControlType::MultilevelSensor,
        ControlType::MultilevelSwitch,
        ControlType::NoOperation,
        ControlType::SceneActivation,
        ControlType::ThermostatFanMode,
        ControlType::ThermostatFanState,
        ControlType::ThermostatMode,
        ControlType::ThermostatOperatingState,
        ControlType::ThermostatSetpoint,
        ControlType::Version,
        ControlType::WakeUp,
        ControlType::Unknown,
    ];

    /// Canonical token, as sent by a form
    pub fn token(self) -> &'static str {
        use ControlType::*;

        match self {
            Alarm => "alarm",
            AlarmSensor => "alarmsensor",
            Association => "association",
            Basic => "basic",
            Battery => "battery",
            BinarySensor => "binarysensor",
            BinarySwitch => "binaryswitch",
            Configuration => "configuration",
            Hail => "hail",
            ManufacturerSpecific => "manufacturerspecific",
            Meter => "meter",
            MultilevelSensor => "multilevelsensor",
            MultilevelSwitch => "multilevelswitch",
            NoOperation => "nooperation",
            SceneActivation => "sceneactivation",
            ThermostatFanMode => "thermostatfanmode",
            ThermostatFanState => "thermostatfanstate",
            ThermostatMode => "thermostatmode",
            ThermostatOperatingState => "thermostatoperatingstate",
            ThermostatSetpoint => "thermostatsetpoint",
            Version => "version",
            WakeUp => "wakeup",
            Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        use ControlType::*;

        match self {
            Alarm => "Alarm",
            AlarmSensor => "Alarm Sensor",
            Association => "Association",
            Basic => "Basic",
            Battery => "Battery",
            BinarySensor => "Binary Sensor",
            BinarySwitch => "Binary Switch",
            Configuration => "Configuration",
            Hail => "Hail",
            ManufacturerSpecific => "Manufacturer-Specific",
            Meter => "Meter",
            MultilevelSensor => "Multi-Level Sensor",
            MultilevelSwitch => "Multi-Level Switch",
            NoOperation => "No Operation",
            SceneActivation => "Scene Activation",
            ThermostatFanMode => "Thermostat Fan Mode",
            ThermostatFanState => "Thermostat Fan State",
            ThermostatMode => "Thermostat Mode",
            ThermostatOperatingState => "Thermostat Operating State",
            ThermostatSetpoint => "Thermostat Setpoint",
            Version => "Version",
            WakeUp => "Wake Up",
            Unknown => "Unknown",
        }
    }

    /// The command class this control manipulates; `None` only for `Unknown`
    pub fn capability_kind(self) -> Option<CommandClass> {
        use ControlType::*;

        let class = match self {
            Alarm => CommandClass::Alarm,
            AlarmSensor => CommandClass::SensorAlarm,
            Association => CommandClass::Association,
            Basic => CommandClass::Basic,
            Battery => CommandClass::Battery,
            BinarySensor => CommandClass::SensorBinary,
            BinarySwitch => CommandClass::SwitchBinary,
            Configuration => CommandClass::Configuration,
            Hail => CommandClass::Hail,
            ManufacturerSpecific => CommandClass::ManufacturerSpecific,
            Meter => CommandClass::Meter,
            MultilevelSensor => CommandClass::SensorMultilevel,
            MultilevelSwitch => CommandClass::SwitchMultilevel,
            NoOperation => CommandClass::NoOperation,
            SceneActivation => CommandClass::SceneActivation,
            ThermostatFanMode => CommandClass::ThermostatFanMode,
            ThermostatFanState => CommandClass::ThermostatFanState,
            ThermostatMode => CommandClass::ThermostatMode,
            ThermostatOperatingState => CommandClass::ThermostatOperatingState,
            ThermostatSetpoint => CommandClass::ThermostatSetpoint,
            Version => CommandClass::Version,
            WakeUp => CommandClass::WakeUp,
            Unknown => return None,
        };
        Some(class)
    }

    pub fn is_unknown(self) -> bool {
        self == ControlType::Unknown
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive lookup of a control token. Never fails.
pub fn resolve(token: &str) -> ControlType {
    let token = token.trim();
    ControlType::ALL
        .iter()
        .copied()
        .find(|control| control.token().eq_ignore_ascii_case(token))
        .unwrap_or(ControlType::Unknown)
}

/// First control in catalogue order that targets `kind`
pub fn resolve_by_capability_kind(kind: CommandClass) -> ControlType {
    ControlType::ALL
        .iter()
        .copied()
        .find(|control| control.capability_kind() == Some(kind))
        .unwrap_or(ControlType::Unknown)
}
