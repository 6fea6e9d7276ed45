//! Basic, binary switch and multilevel switch controls

use super::{query_then_set, ValidationContext};
use crate::command::{Command, QueryTarget, SetAction};
use crate::control::validator::{ControlParams, ValidatedControl};
use crate::error::DispatchError;

pub fn validate_basic(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    query_then_set(params, Command::query(ctx.node, QueryTarget::Basic), || {
        let level = params.level("value")?;
        Ok(Command::set(ctx.node, SetAction::Basic(level)))
    })
}

/// Any non-zero value switches on
pub fn validate_binary_switch(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    query_then_set(params, Command::query(ctx.node, QueryTarget::BinarySwitch), || {
        let value = params.int("value")?;
        Ok(Command::set(ctx.node, SetAction::BinarySwitch(value != 0)))
    })
}

pub fn validate_multilevel_switch(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    query_then_set(
        params,
        Command::query(ctx.node, QueryTarget::MultilevelSwitch),
        || {
            let level = params.level("value")?;
            Ok(Command::set(ctx.node, SetAction::MultilevelSwitch(level)))
        },
    )
}
