use super::{set_only, ValidationContext};
use crate::command::{Command, SetAction, WakeUpInterval};
use crate::control::validator::{ControlParams, ValidatedControl};
use crate::error::DispatchError;

/// Key `interval` in seconds. Wake-up notifications go to our controller.
pub fn validate_wake_up(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    set_only(params, || {
        let interval = WakeUpInterval::new(params.int("interval")?)?;
        Ok(Command::set(
            ctx.node,
            SetAction::WakeUpInterval {
                interval,
                controller: ctx.controller,
            },
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::handlers::test_support::{run, CTX};

    #[test]
    fn test_wake_up_targets_controller() {
        let validated = run(validate_wake_up, &[("interval", "3600")]).unwrap();
        assert_eq!(
            validated.set,
            Some(Command::set(
                CTX.node,
                SetAction::WakeUpInterval {
                    interval: WakeUpInterval::new(3600).unwrap(),
                    controller: CTX.controller,
                }
            ))
        );
    }

    #[test]
    fn test_wake_up_update_alone() {
        assert_eq!(
            run(validate_wake_up, &[("update", "1")]),
            Err(DispatchError::NotImplemented("Cache updating"))
        );
    }

    #[test]
    fn test_interval_must_be_integer() {
        assert_eq!(
            run(validate_wake_up, &[("interval", "hourly")]),
            Err(DispatchError::invalid("interval", "must be an integer"))
        );
    }
}
