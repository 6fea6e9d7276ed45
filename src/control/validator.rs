//! Command validator
//!
//! Turns the raw string parameters of one control into validated
//! [`Command`]s. Validators are looked up in a table keyed by control type;
//! adding a control means adding a row, not touching a central switch.

use std::collections::HashMap;

use zwave_shared::NodeId;

use super::handlers::{self, ValidationContext};
use super::registry::ControlType;
use crate::command::Command;
use crate::error::DispatchError;

/// Raw parameters as submitted by the presentation layer
pub type Params = HashMap<String, String>;

/// Parameter keys that address the request rather than configure it
const ADDRESSING_KEYS: [&str; 2] = ["node", "control"];

pub const UPDATE_KEY: &str = "update";

/// What one control validated into.
///
/// When both are present the query is submitted before the set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedControl {
    pub query: Option<Command>,
    pub set: Option<Command>,
    /// Non-fatal failures, e.g. an unsupported update next to a valid set
    pub notices: Vec<DispatchError>,
}

impl ValidatedControl {
    pub fn query(command: Command) -> Self {
        Self {
            query: Some(command),
            ..Self::default()
        }
    }

    pub fn set(command: Command) -> Self {
        Self {
            set: Some(command),
            ..Self::default()
        }
    }

    /// Commands in submission order
    pub fn into_commands(self) -> Vec<Command> {
        self.query.into_iter().chain(self.set).collect()
    }
}

/// Read-only accessors over [`Params`] that produce field-qualified errors
#[derive(Debug, Clone, Copy)]
pub struct ControlParams<'a> {
    params: &'a Params,
}

impl<'a> ControlParams<'a> {
    pub fn new(params: &'a Params) -> Self {
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.params.get(key).map(|value| value.trim())
    }

    /// First of `keys` that is present
    pub fn get_any(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn update_requested(&self) -> bool {
        self.params.contains_key(UPDATE_KEY)
    }

    /// Whether anything besides the update flag and addressing keys was given
    pub fn has_set_parameters(&self) -> bool {
        self.params
            .keys()
            .any(|key| key != UPDATE_KEY && !ADDRESSING_KEYS.contains(&key.as_str()))
    }

    pub fn int(&self, field: &'static str) -> Result<i64, DispatchError> {
        self.int_any(field, &[field])
    }

    /// Parse the first present key of `keys` as an integer, reporting `field`
    pub fn int_any(&self, field: &'static str, keys: &[&str]) -> Result<i64, DispatchError> {
        let raw = self
            .get_any(keys)
            .ok_or_else(|| DispatchError::invalid(field, "is required"))?;
        raw.parse()
            .map_err(|_| DispatchError::invalid(field, "must be an integer"))
    }

    /// An integer level in 0..=255
    pub fn level(&self, field: &'static str) -> Result<u8, DispatchError> {
        let value = self.int(field)?;
        u8::try_from(value)
            .map_err(|_| DispatchError::invalid(field, "must be between 0 and 255"))
    }

    pub fn text(&self, field: &'static str) -> Result<&'a str, DispatchError> {
        self.get(field)
            .ok_or_else(|| DispatchError::invalid(field, "is required"))
    }
}

pub type ValidatorFn =
    fn(&ControlParams<'_>, &ValidationContext) -> Result<ValidatedControl, DispatchError>;

const VALIDATORS: &[(ControlType, ValidatorFn)] = &[
    (ControlType::Association, handlers::validate_association),
    (ControlType::Basic, handlers::validate_basic),
    (ControlType::BinarySwitch, handlers::validate_binary_switch),
    (ControlType::Configuration, handlers::validate_configuration),
    (ControlType::MultilevelSwitch, handlers::validate_multilevel_switch),
    (ControlType::ThermostatFanMode, handlers::validate_thermostat_fan_mode),
    (ControlType::ThermostatMode, handlers::validate_thermostat_mode),
    (ControlType::ThermostatSetpoint, handlers::validate_thermostat_setpoint),
    (ControlType::Version, handlers::validate_version),
    (ControlType::WakeUp, handlers::validate_wake_up),
];

pub fn validator_for(control: ControlType) -> Option<ValidatorFn> {
    VALIDATORS
        .iter()
        .find(|(entry, _)| *entry == control)
        .map(|(_, validator)| *validator)
}

/// Validate `params` for `control` addressed to `node`
pub fn validate(
    control: ControlType,
    params: &Params,
    node: NodeId,
    controller: NodeId,
) -> Result<ValidatedControl, DispatchError> {
    let validator = validator_for(control).ok_or(DispatchError::UnsupportedControl)?;
    let ctx = ValidationContext { node, controller };
    validator(&ControlParams::new(params), &ctx)
}
