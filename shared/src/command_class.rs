//! Command classes and their enumerated codes

use std::fmt;

/// Z-Wave command classes a node may advertise
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandClass {
    NoOperation = 0x00,
    Basic = 0x20,
    SwitchBinary = 0x25,
    SwitchMultilevel = 0x26,
    SceneActivation = 0x2B,
    SensorBinary = 0x30,
    SensorMultilevel = 0x31,
    Meter = 0x32,
    ThermostatMode = 0x40,
    ThermostatOperatingState = 0x42,
    ThermostatSetpoint = 0x43,
    ThermostatFanMode = 0x44,
    ThermostatFanState = 0x45,
    Configuration = 0x70,
    Alarm = 0x71,
    ManufacturerSpecific = 0x72,
    Battery = 0x80,
    Hail = 0x82,
    WakeUp = 0x84,
    Association = 0x85,
    Version = 0x86,
    SensorAlarm = 0x9C,
}

impl CommandClass {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        use CommandClass::*;

        let class = match code {
            0x00 => NoOperation,
            0x20 => Basic,
            0x25 => SwitchBinary,
            0x26 => SwitchMultilevel,
            0x2B => SceneActivation,
            0x30 => SensorBinary,
            0x31 => SensorMultilevel,
            0x32 => Meter,
            0x40 => ThermostatMode,
            0x42 => ThermostatOperatingState,
            0x43 => ThermostatSetpoint,
            0x44 => ThermostatFanMode,
            0x45 => ThermostatFanState,
            0x70 => Configuration,
            0x71 => Alarm,
            0x72 => ManufacturerSpecific,
            0x80 => Battery,
            0x82 => Hail,
            0x84 => WakeUp,
            0x85 => Association,
            0x86 => Version,
            0x9C => SensorAlarm,
            _ => return None,
        };
        Some(class)
    }

    /// The (get, report) command pair used to query this class's current value
    pub fn query_commands(self) -> Option<(u8, u8)> {
        match self {
            CommandClass::Basic | CommandClass::SwitchBinary | CommandClass::SwitchMultilevel => {
                Some((command::GET, command::REPORT))
            }
            CommandClass::Version => Some((command::VERSION_GET, command::VERSION_REPORT)),
            _ => None,
        }
    }
}

/// Command ids within a command class
pub mod command {
    pub const SET: u8 = 0x01;
    pub const GET: u8 = 0x02;
    pub const REPORT: u8 = 0x03;

    pub const ASSOCIATION_SET: u8 = 0x01;
    pub const ASSOCIATION_REMOVE: u8 = 0x04;

    pub const CONFIGURATION_SET: u8 = 0x04;

    pub const WAKE_UP_INTERVAL_SET: u8 = 0x04;

    pub const VERSION_GET: u8 = 0x11;
    pub const VERSION_REPORT: u8 = 0x12;
}

/// Operating modes accepted by the thermostat mode class
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermostatMode {
    Off = 0,
    Heat = 1,
    Cool = 2,
    Auto = 3,
    Auxiliary = 4,
    Resume = 5,
    FanOnly = 6,
    Furnace = 7,
    DryAir = 8,
    MoistAir = 9,
    AutoChangeover = 10,
    EnergySaveHeat = 11,
    EnergySaveCool = 12,
    Away = 13,
    FullPower = 15,
}

impl TryFrom<u8> for ThermostatMode {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        use ThermostatMode::*;

        Ok(match code {
            0 => Off,
            1 => Heat,
            2 => Cool,
            3 => Auto,
            4 => Auxiliary,
            5 => Resume,
            6 => FanOnly,
            7 => Furnace,
            8 => DryAir,
            9 => MoistAir,
            10 => AutoChangeover,
            11 => EnergySaveHeat,
            12 => EnergySaveCool,
            13 => Away,
            15 => FullPower,
            other => return Err(other),
        })
    }
}

/// Fan modes accepted by the thermostat fan mode class
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermostatFanMode {
    AutoLow = 0,
    OnLow = 1,
    AutoHigh = 2,
    OnHigh = 3,
    AutoMedium = 4,
    OnMedium = 5,
    Circulation = 6,
    Humidity = 7,
}

impl TryFrom<u8> for ThermostatFanMode {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        use ThermostatFanMode::*;

        Ok(match code {
            0 => AutoLow,
            1 => OnLow,
            2 => AutoHigh,
            3 => OnHigh,
            4 => AutoMedium,
            5 => OnMedium,
            6 => Circulation,
            7 => Humidity,
            other => return Err(other),
        })
    }
}

/// Setpoint types ("modes") of the thermostat setpoint class
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointType {
    Heating = 1,
    Cooling = 2,
    Furnace = 7,
    DryAir = 8,
    MoistAir = 9,
    AutoChangeover = 10,
    HeatingEcon = 11,
    CoolingEcon = 12,
    AwayHeating = 13,
}

impl TryFrom<u8> for SetpointType {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        use SetpointType::*;

        Ok(match code {
            1 => Heating,
            2 => Cooling,
            7 => Furnace,
            8 => DryAir,
            9 => MoistAir,
            10 => AutoChangeover,
            11 => HeatingEcon,
            12 => CoolingEcon,
            13 => AwayHeating,
            other => return Err(other),
        })
    }
}

/// Protocol library flavour reported by a controller or node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryType {
    StaticController,
    Controller,
    EnhancedSlave,
    Slave,
    Installer,
    RoutingSlave,
    BridgeController,
    DeviceUnderTest,
    Other(u8),
}

impl LibraryType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => LibraryType::StaticController,
            0x02 => LibraryType::Controller,
            0x03 => LibraryType::EnhancedSlave,
            0x04 => LibraryType::Slave,
            0x05 => LibraryType::Installer,
            0x06 => LibraryType::RoutingSlave,
            0x07 => LibraryType::BridgeController,
            0x08 => LibraryType::DeviceUnderTest,
            other => LibraryType::Other(other),
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryType::StaticController => write!(f, "Static Controller"),
            LibraryType::Controller => write!(f, "Controller"),
            LibraryType::EnhancedSlave => write!(f, "Enhanced Slave"),
            LibraryType::Slave => write!(f, "Slave"),
            LibraryType::Installer => write!(f, "Installer"),
            LibraryType::RoutingSlave => write!(f, "Routing Slave"),
            LibraryType::BridgeController => write!(f, "Bridge Controller"),
            LibraryType::DeviceUnderTest => write!(f, "Device Under Test"),
            LibraryType::Other(code) => write!(f, "Unknown (0x{:02X})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_class_lookup() {
        assert_eq!(CommandClass::from_code(0x26), Some(CommandClass::SwitchMultilevel));
        assert_eq!(CommandClass::SwitchMultilevel.code(), 0x26);
        assert_eq!(CommandClass::from_code(0xFE), None);
    }

    #[test]
    fn test_query_commands() {
        assert_eq!(CommandClass::Basic.query_commands(), Some((0x02, 0x03)));
        assert_eq!(CommandClass::Version.query_commands(), Some((0x11, 0x12)));
        assert_eq!(CommandClass::Association.query_commands(), None);
    }

    #[test]
    fn test_setpoint_types() {
        assert_eq!(SetpointType::try_from(1), Ok(SetpointType::Heating));
        assert_eq!(SetpointType::try_from(13), Ok(SetpointType::AwayHeating));
        // 3-6 are reserved
        assert_eq!(SetpointType::try_from(4), Err(4));
    }

    #[test]
    fn test_thermostat_modes() {
        assert_eq!(ThermostatMode::try_from(1), Ok(ThermostatMode::Heat));
        assert_eq!(ThermostatMode::try_from(14), Err(14));
        assert_eq!(ThermostatFanMode::try_from(3), Ok(ThermostatFanMode::OnHigh));
        assert_eq!(ThermostatFanMode::try_from(9), Err(9));
    }

    #[test]
    fn test_library_type_display() {
        assert_eq!(LibraryType::from_code(0x01).to_string(), "Static Controller");
        assert_eq!(LibraryType::from_code(0x42).to_string(), "Unknown (0x42)");
    }
}
