//! In-memory node registry

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use zwave_shared::NodeId;

use super::{DeviceRegistry, TargetDevice};

/// Nodes known to the host, by id
#[derive(Default)]
pub struct NodeRegistry {
    nodes: RwLock<HashMap<NodeId, Arc<TargetDevice>>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a node
    pub async fn register(&self, device: TargetDevice) {
        self.nodes.write().await.insert(device.id(), Arc::new(device));
    }

    pub async fn unregister(&self, id: NodeId) -> Option<Arc<TargetDevice>> {
        self.nodes.write().await.remove(&id)
    }

    /// Known node ids, ascending
    pub async fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    pub async fn count(&self) -> usize {
        self.nodes.read().await.len()
    }
}

#[async_trait]
impl DeviceRegistry for NodeRegistry {
    async fn lookup(&self, id: NodeId) -> Option<Arc<TargetDevice>> {
        self.nodes.read().await.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use zwave_shared::CommandClass;

    use super::*;

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = NodeRegistry::new();
        registry
            .register(TargetDevice::new(NodeId(9)).with_capability(CommandClass::Basic))
            .await;
        registry.register(TargetDevice::new(NodeId(2))).await;

        assert_eq!(registry.count().await, 2);
        assert_eq!(registry.node_ids().await, vec![NodeId(2), NodeId(9)]);
        assert!(registry.lookup(NodeId(9)).await.unwrap().supports(CommandClass::Basic));
        assert!(registry.lookup(NodeId(4)).await.is_none());

        registry.unregister(NodeId(9)).await;
        assert!(registry.lookup(NodeId(9)).await.is_none());
    }
}
