use super::ValidationContext;
use crate::command::{Command, QueryTarget};
use crate::control::validator::{ControlParams, ValidatedControl};
use crate::error::DispatchError;

/// Version is read-only: the only thing to do is request a fresh report
pub fn validate_version(
    params: &ControlParams<'_>,
    ctx: &ValidationContext,
) -> Result<ValidatedControl, DispatchError> {
    if !params.update_requested() {
        return Err(DispatchError::invalid(
            "update",
            "is required, version is read-only",
        ));
    }
    Ok(ValidatedControl::query(Command::query(
        ctx.node,
        QueryTarget::Version,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::handlers::test_support::{run, CTX};

    #[test]
    fn test_version_update_queries() {
        let validated = run(validate_version, &[("update", "1")]).unwrap();
        assert_eq!(validated.query, Some(Command::query(CTX.node, QueryTarget::Version)));
        assert_eq!(validated.set, None);
    }

    #[test]
    fn test_version_without_update() {
        assert!(matches!(
            run(validate_version, &[("value", "1")]),
            Err(DispatchError::InvalidParameter { field: "update", .. })
        ));
    }
}
