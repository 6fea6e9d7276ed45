//! Association control

use super::{set_only, ValidationContext};
use crate::command::{Association, Command, SetAction};
use crate::control::validator::{ControlParams, ValidatedControl};
use crate::error::DispatchError;

/// Keys `action` ("set" | "remove"), `group` and `target`.
/// `assoc_group` and `assoc_node` are accepted for the last two.
pub fn validate_association(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    set_only(params, || {
        let add = match params.get("action") {
            Some("set") => true,
            Some("remove") => false,
            _ => {
                return Err(DispatchError::invalid(
                    "action",
                    "must be 'set' or 'remove'",
                ))
            }
        };
        let group = params.int_any("group", &["group", "assoc_group"])?;
        let target = params.int_any("target", &["target", "assoc_node"])?;
        let association = Association::new(group, target)?;

        let action = if add {
            SetAction::AssociationSet(association)
        } else {
            SetAction::AssociationRemove(association)
        };
        Ok(Command::set(ctx.node, action))
    })
}
