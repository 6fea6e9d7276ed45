//! Dispatcher
//!
//! Entry point for control requests. Each step is a hard gate: the first
//! failure ends the request with one capability-qualified
//! [`DispatchFailure`]. Acceptance means the frames were handed to the
//! transport; how they finish is reported through the event router.

use std::sync::Arc;

use tracing::{debug, error, info};
use zwave_shared::NodeId;

use crate::command::Command;
use crate::control::{self, ControlType, Params};
use crate::device::DeviceRegistry;
use crate::error::{DispatchError, DispatchFailure};
use crate::transaction::{unit, ControllerInfo, TransactionHandle, TransactionTracker};

/// A request that made it onto the wire
#[derive(Debug)]
pub struct Accepted {
    pub control: ControlType,
    pub node: NodeId,
    /// One per submitted command, query first
    pub transactions: Vec<TransactionHandle>,
    /// Non-fatal failures reported alongside the accepted commands
    pub notices: Vec<DispatchFailure>,
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Accepted(Accepted),
    Failure(DispatchFailure),
}

impl DispatchOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DispatchOutcome::Accepted(_))
    }

    pub fn failure(&self) -> Option<&DispatchFailure> {
        match self {
            DispatchOutcome::Failure(failure) => Some(failure),
            DispatchOutcome::Accepted(_) => None,
        }
    }

    pub fn accepted(self) -> Option<Accepted> {
        match self {
            DispatchOutcome::Accepted(accepted) => Some(accepted),
            DispatchOutcome::Failure(_) => None,
        }
    }
}

pub struct Dispatcher {
    devices: Arc<dyn DeviceRegistry>,
    tracker: Arc<TransactionTracker>,
    /// Node id of our own controller
    controller: NodeId,
}

impl Dispatcher {
    pub fn new(
        devices: Arc<dyn DeviceRegistry>,
        tracker: Arc<TransactionTracker>,
        controller: NodeId,
    ) -> Self {
        Self {
            devices,
            tracker,
            controller,
        }
    }

    pub fn tracker(&self) -> &Arc<TransactionTracker> {
        &self.tracker
    }

    /// Resolve, validate and submit one control request
    pub async fn dispatch(
        &self,
        control_token: &str,
        device_token: &str,
        params: &Params,
    ) -> DispatchOutcome {
        let control = control::resolve(control_token);

        match self.try_dispatch(control, control_token, device_token, params).await {
            Ok(accepted) => {
                info!(
                    "{} Control: {} command(s) sent to node {}",
                    control.label(),
                    accepted.transactions.len(),
                    accepted.node
                );
                for notice in &accepted.notices {
                    error!("{}", notice);
                }
                DispatchOutcome::Accepted(accepted)
            }
            Err(e) => {
                let failure = DispatchFailure::new(control.label(), e);
                error!("{}", failure);
                DispatchOutcome::Failure(failure)
            }
        }
    }

    async fn try_dispatch(
        &self,
        control: ControlType,
        control_token: &str,
        device_token: &str,
        params: &Params,
    ) -> Result<Accepted, DispatchError> {
        if control.is_unknown() {
            return Err(DispatchError::UnrecognizedControl(control_token.to_string()));
        }

        let not_found = || DispatchError::DeviceNotFound(device_token.to_string());
        let node = device_token
            .trim()
            .parse::<u8>()
            .map(NodeId)
            .map_err(|_| not_found())?;
        let device = self.devices.lookup(node).await.ok_or_else(not_found)?;

        if device.capability_for(control).is_none() {
            return Err(DispatchError::CapabilityNotPresent(node));
        }

        let validated = control::validate(control, params, node, self.controller)?;
        let notices = validated
            .notices
            .iter()
            .cloned()
            .map(|notice| DispatchFailure::new(control.label(), notice))
            .collect();

        let mut transactions = Vec::with_capacity(2);
        for command in validated.into_commands() {
            debug!("{} Control: submitting {:?}", control.label(), command);
            transactions.push(self.tracker.submit(command).await?);
        }

        Ok(Accepted {
            control,
            node,
            transactions,
            notices,
        })
    }

    /// Ask the controller for its library version
    pub async fn request_controller_version(&self) -> Result<TransactionHandle, DispatchError> {
        self.tracker.submit(Command::ControllerVersion).await
    }

    /// Ask the controller for its init data. The answer arrives as a
    /// network-initialization-complete event.
    pub async fn request_network_init(&self) -> Result<(), DispatchError> {
        self.tracker.send_untracked(unit::network_init_request()).await
    }

    /// Ask the controller whether `node` is marked failed
    pub async fn check_failed_node(&self, node: NodeId) -> Result<TransactionHandle, DispatchError> {
        self.tracker.submit(Command::IsFailedNode(node)).await
    }

    /// Last version the controller reported
    pub async fn controller_info(&self) -> Option<ControllerInfo> {
        self.tracker.controller_info().await
    }

    pub fn is_network_ready(&self) -> bool {
        self.tracker.router().is_network_ready()
    }
}
