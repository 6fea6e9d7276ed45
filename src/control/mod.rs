//! Control types and their validation

pub mod handlers;
pub mod registry;
pub mod validator;

pub use registry::{resolve, resolve_by_capability_kind, ControlType};
pub use validator::{validate, ControlParams, Params, ValidatedControl};
