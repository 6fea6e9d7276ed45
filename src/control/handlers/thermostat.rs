//! Thermostat mode, fan mode and setpoint controls
//!
//! None of these has a cache update path.

use zwave_shared::{SetpointType, ThermostatFanMode, ThermostatMode};

use super::{set_only, ValidationContext};
use crate::command::{Command, SetAction, Setpoint, TemperatureScale};
use crate::control::validator::{ControlParams, ValidatedControl};
use crate::error::DispatchError;

fn mode_code(params: &ControlParams<'_>) -> Result<u8, DispatchError> {
    let mode = params.int("mode")?;
    u8::try_from(mode).map_err(|_| DispatchError::invalid("mode", "is not a supported mode"))
}

pub fn validate_thermostat_mode(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    set_only(params, || {
        let mode = ThermostatMode::try_from(mode_code(params)?)
            .map_err(|_| DispatchError::invalid("mode", "must be 0-13 or 15"))?;
        Ok(Command::set(ctx.node, SetAction::ThermostatMode(mode)))
    })
}

pub fn validate_thermostat_fan_mode(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    set_only(params, || {
        let mode = ThermostatFanMode::try_from(mode_code(params)?)
            .map_err(|_| DispatchError::invalid("mode", "must be between 0 and 7"))?;
        Ok(Command::set(ctx.node, SetAction::ThermostatFanMode(mode)))
    })
}

/// Keys `mode` (setpoint type), `scale` (0 Celsius, 1 Fahrenheit) and
/// `setpoint` (decimal). All three are parsed before any range check.
pub fn validate_thermostat_setpoint(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    set_only(params, || {
        let mode = params.int("mode")?;
        let scale = params.int("scale")?;
        let value = Setpoint::parse("setpoint", params.text("setpoint")?)?;

        let scale = TemperatureScale::from_code(scale)?;
        let setpoint_type = u8::try_from(mode)
            .ok()
            .and_then(|code| SetpointType::try_from(code).ok())
            .ok_or_else(|| DispatchError::invalid("mode", "must be 1, 2, or 7-13"))?;

        Ok(Command::set(
            ctx.node,
            SetAction::ThermostatSetpoint {
                setpoint_type,
                scale,
                value,
            },
        ))
    })
}
