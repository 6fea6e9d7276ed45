//! Devices the bridge can address

mod registry;

pub use registry::NodeRegistry;

use std::sync::Arc;

use async_trait::async_trait;
use zwave_shared::{CommandClass, NodeId};

use crate::control::{resolve_by_capability_kind, ControlType};

/// One command class a node supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub command_class: CommandClass,
    pub version: u8,
}

impl Capability {
    pub fn new(command_class: CommandClass) -> Self {
        Self {
            command_class,
            version: 1,
        }
    }

    pub fn control(&self) -> ControlType {
        resolve_by_capability_kind(self.command_class)
    }
}

/// A node as known to the device registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDevice {
    id: NodeId,
    name: String,
    capabilities: Vec<Capability>,
}

impl TargetDevice {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            name: format!("Z-Wave Node {}", id),
            capabilities: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_capability(mut self, command_class: CommandClass) -> Self {
        if !self.supports(command_class) {
            self.capabilities.push(Capability::new(command_class));
        }
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supports(&self, command_class: CommandClass) -> bool {
        self.capabilities
            .iter()
            .any(|cap| cap.command_class == command_class)
    }

    /// Capabilities paired with the control that drives each
    pub fn capabilities(&self) -> impl Iterator<Item = (ControlType, &Capability)> + '_ {
        self.capabilities.iter().map(|cap| (cap.control(), cap))
    }

    /// The capability a control would manipulate on this node
    pub fn capability_for(&self, control: ControlType) -> Option<&Capability> {
        let kind = control.capability_kind()?;
        self.capabilities.iter().find(|cap| cap.command_class == kind)
    }
}

/// Source of devices for dispatch
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn lookup(&self, id: NodeId) -> Option<Arc<TargetDevice>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_for_control() {
        let device = TargetDevice::new(NodeId(5))
            .with_capability(CommandClass::Basic)
            .with_capability(CommandClass::SwitchMultilevel);

        assert_eq!(device.name(), "Z-Wave Node 5");
        assert!(device.capability_for(ControlType::MultilevelSwitch).is_some());
        assert!(device.capability_for(ControlType::ThermostatMode).is_none());
        assert!(device.capability_for(ControlType::Unknown).is_none());
    }

    #[test]
    fn test_capabilities_report_controls() {
        let device = TargetDevice::new(NodeId(3))
            .with_capability(CommandClass::ThermostatSetpoint)
            .with_capability(CommandClass::ThermostatSetpoint);

        let controls: Vec<ControlType> = device.capabilities().map(|(c, _)| c).collect();
        assert_eq!(controls, vec![ControlType::ThermostatSetpoint]);
    }
}
