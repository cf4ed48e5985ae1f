//! Network node data models

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Role a simulated network function plays in the 5G core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    /// Radio access node
    #[serde(rename = "gNB")]
    Gnb,
    /// Access and Mobility Management Function
    #[serde(rename = "AMF")]
    Amf,
    /// Session Management Function
    #[serde(rename = "SMF")]
    Smf,
    /// User Plane Function
    #[serde(rename = "UPF")]
    Upf,
    /// Policy Control Function
    #[serde(rename = "PCF")]
    Pcf,
}

impl NodeType {
    /// Every node role, in catalog order
    pub const ALL: [NodeType; 5] = [
        NodeType::Gnb,
        NodeType::Amf,
        NodeType::Smf,
        NodeType::Upf,
        NodeType::Pcf,
    ];

    /// Canonical display label
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Gnb => "gNB",
            NodeType::Amf => "AMF",
            NodeType::Smf => "SMF",
            NodeType::Upf => "UPF",
            NodeType::Pcf => "PCF",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("unknown node type '{s}'")))
    }
}

/// Operational status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Node is serving traffic
    #[default]
    Active,
    /// Node is out of service
    Down,
}

impl NodeStatus {
    /// Whether the node is serving traffic
    pub fn is_active(self) -> bool {
        self == NodeStatus::Active
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Active => f.write_str("active"),
            NodeStatus::Down => f.write_str("down"),
        }
    }
}

/// A simulated network element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier (e.g. "amf-001")
    pub id: String,

    /// Network function role
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Management address
    #[serde(rename = "ip")]
    pub address: IpAddr,

    /// Current status
    #[serde(default)]
    pub status: NodeStatus,
}

impl Node {
    /// Create an active node
    pub fn new(id: impl Into<String>, node_type: NodeType, address: IpAddr) -> Self {
        Self {
            id: id.into(),
            node_type,
            address,
            status: NodeStatus::Active,
        }
    }
}

/// The six-node topology the platform boots with when no other is configured
pub fn default_topology() -> Vec<Node> {
    let node = |id: &str, node_type, ip: [u8; 4]| Node::new(id, node_type, IpAddr::from(ip));
    vec![
        node("gnb-001", NodeType::Gnb, [10, 0, 1, 1]),
        node("gnb-002", NodeType::Gnb, [10, 0, 1, 2]),
        node("amf-001", NodeType::Amf, [10, 0, 2, 1]),
        node("smf-001", NodeType::Smf, [10, 0, 2, 2]),
        node("upf-001", NodeType::Upf, [10, 0, 3, 1]),
        node("pcf-001", NodeType::Pcf, [10, 0, 3, 2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_parses_case_insensitively() {
        assert_eq!("gnb".parse::<NodeType>().unwrap(), NodeType::Gnb);
        assert_eq!("UPF".parse::<NodeType>().unwrap(), NodeType::Upf);
        assert_eq!(" amf ".parse::<NodeType>().unwrap(), NodeType::Amf);
        assert!("MME".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_node_serializes_with_wire_names() {
        let node = default_topology().remove(0);
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["id"], "gnb-001");
        assert_eq!(json["type"], "gNB");
        assert_eq!(json["ip"], "10.0.1.1");
        assert_eq!(json["status"], "active");
    }
}
