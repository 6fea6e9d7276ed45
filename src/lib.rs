//! Z-Wave control bridge
//!
//! Turns control requests (a control token, a node and string parameters)
//! into validated commands, runs them as request/response transactions
//! against a serial controller, and routes what the controller reports back
//! to registered listeners.

pub mod command;
pub mod config;
pub mod control;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod transaction;
pub mod transport;

pub use command::Command;
pub use config::BridgeConfig;
pub use control::{ControlType, Params};
pub use device::{DeviceRegistry, NodeRegistry, TargetDevice};
pub use dispatcher::{Accepted, DispatchOutcome, Dispatcher};
pub use error::{DispatchError, DispatchFailure};
pub use events::{Event, EventListener, EventRouter};
pub use transaction::{TransactionHandle, TransactionTracker};
