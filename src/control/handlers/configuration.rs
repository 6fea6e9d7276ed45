use super::{set_only, ValidationContext};
use crate::command::{Command, ConfigurationParameter, SetAction};
use crate::control::validator::{ControlParams, ValidatedControl};
use crate::error::DispatchError;

/// Keys `index`, `value` and `size` (1, 2 or 4 bytes)
pub fn validate_configuration(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    set_only(params, || {
        let index = params.int("index")?;
        let value = params.int("value")?;
        let size = params.int("size")?;
        let parameter = ConfigurationParameter::new(index, value, size)?;
        Ok(Command::set(ctx.node, SetAction::Configuration(parameter)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::handlers::test_support::run;

    #[test]
    fn test_configuration() {
        let validated = run(
            validate_configuration,
            &[("index", "3"), ("value", "-5"), ("size", "1")],
        )
        .unwrap();
        let Some(Command::Set {
            action: SetAction::Configuration(param),
            ..
        }) = validated.set
        else {
            panic!("expected a configuration set");
        };
        assert_eq!((param.index(), param.value(), param.size()), (3, -5, 1));
    }

    #[test]
    fn test_configuration_size_checked() {
        assert_eq!(
            run(validate_configuration, &[("index", "3"), ("value", "1"), ("size", "8")]),
            Err(DispatchError::invalid("size", "must be 1, 2, or 4"))
        );
    }
}
