//! Per-control validators

mod association;
mod configuration;
mod level;
mod thermostat;
mod version;
mod wake_up;

pub use association::validate_association;
pub use configuration::validate_configuration;
pub use level::{validate_basic, validate_binary_switch, validate_multilevel_switch};
pub use thermostat::{
    validate_thermostat_fan_mode, validate_thermostat_mode, validate_thermostat_setpoint,
};
pub use version::validate_version;
pub use wake_up::validate_wake_up;

use zwave_shared::NodeId;

use super::validator::{ControlParams, ValidatedControl};
use crate::command::Command;
use crate::error::DispatchError;

/// Context passed to validators
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    /// Node the control is addressed to
    pub node: NodeId,
    /// Node id of the bridge's own controller
    pub controller: NodeId,
}

/// For controls whose value can be queried: `update` issues `query`, and
/// short-circuits unless set parameters were given too.
fn query_then_set(
    params: &ControlParams<'_>,
    query: Command,
    build_set: impl FnOnce() -> Result<Command, DispatchError>,
) -> Result<ValidatedControl, DispatchError> {
    if !params.update_requested() {
        return Ok(ValidatedControl::set(build_set()?));
    }
    if !params.has_set_parameters() {
        return Ok(ValidatedControl::query(query));
    }
    Ok(ValidatedControl {
        query: Some(query),
        set: Some(build_set()?),
        notices: Vec::new(),
    })
}

/// For controls without a cache update path: `update` alone fails, `update`
/// next to set parameters is noted and the set proceeds.
fn set_only(
    params: &ControlParams<'_>,
    build_set: impl FnOnce() -> Result<Command, DispatchError>,
) -> Result<ValidatedControl, DispatchError> {
    let mut notices = Vec::new();
    if params.update_requested() {
        let unsupported = DispatchError::NotImplemented("Cache updating");
        if !params.has_set_parameters() {
            return Err(unsupported);
        }
        notices.push(unsupported);
    }

    Ok(ValidatedControl {
        query: None,
        set: Some(build_set()?),
        notices,
    })
}
