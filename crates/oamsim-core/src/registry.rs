//! Shared node registry
//!
//! The single source of truth for node status. Every periodic task reads and writes
//! through the same instance, so a fault raised by one subsystem is immediately
//! visible to the others.

use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Node, NodeStatus, NodeType};

/// Node counts for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct NodeStats {
    pub total: usize,
    pub healthy: usize,
}

/// Registry of simulated network elements
pub struct NodeRegistry {
    nodes: RwLock<Vec<Node>>,
}

impl NodeRegistry {
    /// Create a registry, rejecting empty topologies and duplicate ids
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::validation("topology must contain at least one node"));
        }

        let mut seen = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(Error::validation(format!("duplicate node id '{}'", node.id)));
            }
        }

        info!(count = nodes.len(), "Node registry initialized");

        Ok(Self {
            nodes: RwLock::new(nodes),
        })
    }

    /// Snapshot of every node
    pub fn list_nodes(&self) -> Vec<Node> {
        self.nodes.read().clone()
    }

    /// Snapshot of one node
    pub fn get(&self, node_id: &str) -> Option<Node> {
        self.nodes.read().iter().find(|n| n.id == node_id).cloned()
    }

    /// Current status of a node
    pub fn get_status(&self, node_id: &str) -> Option<NodeStatus> {
        self.nodes
            .read()
            .iter()
            .find(|n| n.id == node_id)
            .map(|n| n.status)
    }

    /// Set a node's status, returning the previous one
    pub fn set_status(&self, node_id: &str, status: NodeStatus) -> Result<NodeStatus> {
        let mut nodes = self.nodes.write();
        let node = nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| Error::not_found("node", node_id))?;

        let previous = std::mem::replace(&mut node.status, status);
        if previous != status {
            debug!(node_id, from = %previous, to = %status, "Node status changed");
            let down = nodes.iter().filter(|n| !n.status.is_active()).count();
            metrics::gauge!("oamsim_nodes_down").set(down as f64);
        }

        Ok(previous)
    }

    /// Snapshot of the nodes with the given role
    pub fn nodes_of_type(&self, node_type: NodeType) -> Vec<Node> {
        self.nodes
            .read()
            .iter()
            .filter(|n| n.node_type == node_type)
            .cloned()
            .collect()
    }

    /// Total and healthy node counts, taken under one lock
    pub fn stats(&self) -> NodeStats {
        let nodes = self.nodes.read();
        NodeStats {
            total: nodes.len(),
            healthy: nodes.iter().filter(|n| n.status.is_active()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_topology;

    #[test]
    fn test_set_status_round_trip() {
        let registry = NodeRegistry::new(default_topology()).unwrap();

        let previous = registry.set_status("amf-001", NodeStatus::Down).unwrap();
        assert_eq!(previous, NodeStatus::Active);
        assert_eq!(registry.get_status("amf-001"), Some(NodeStatus::Down));
        assert_eq!(registry.stats(), NodeStats { total: 6, healthy: 5 });
    }

    #[test]
    fn test_unknown_node() {
        let registry = NodeRegistry::new(default_topology()).unwrap();

        assert!(registry.get_status("mme-001").is_none());
        assert!(matches!(
            registry.set_status("mme-001", NodeStatus::Down),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut nodes = default_topology();
        nodes.push(nodes[0].clone());
        assert!(NodeRegistry::new(nodes).is_err());
        assert!(NodeRegistry::new(Vec::new()).is_err());
    }

    #[test]
    fn test_nodes_of_type() {
        let registry = NodeRegistry::new(default_topology()).unwrap();
        let gnbs = registry.nodes_of_type(NodeType::Gnb);
        assert_eq!(gnbs.len(), 2);
        assert!(gnbs.iter().all(|n| n.node_type == NodeType::Gnb));
    }
}
