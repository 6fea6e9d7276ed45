//! Dispatch error taxonomy
//!
//! Every failure the core can produce is recovered at the dispatcher
//! boundary and handed back to the caller as a [`DispatchFailure`], which
//! names the control it concerns.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use zwave_shared::{FrameError, NodeId};

use crate::transaction::TransactionKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unrecognized control type '{0}'")]
    UnrecognizedControl(String),

    #[error("Processing for this control type is not yet supported")]
    UnsupportedControl,

    #[error("Node {0} not found")]
    DeviceNotFound(String),

    #[error("An appropriate command class was not found for node {0}")]
    CapabilityNotPresent(NodeId),

    #[error("Invalid input ({field} {reason})")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("{0} not yet supported")]
    NotImplemented(&'static str),

    #[error("A transaction for {0} is already in flight")]
    DuplicateInFlight(TransactionKey),

    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),

    #[error("No response within {0:?}")]
    TimedOut(Duration),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl DispatchError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        DispatchError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

/// A [`DispatchError`] qualified with the label of the control it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub control: &'static str,
    pub error: DispatchError,
}

impl DispatchFailure {
    pub fn new(control: &'static str, error: DispatchError) -> Self {
        Self { control, error }
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Control: {}", self.control, self.error)
    }
}

impl std::error::Error for DispatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
