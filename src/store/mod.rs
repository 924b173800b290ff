//! Graph model backends.

pub mod memory;

use crate::types::{NodeId, Role};

/// Error type for graph construction and lookups.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Lookup of a node absent from the loaded set.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    /// Node declared both influencer and hater.
    #[error("Node {0} is declared both influencer and hater")]
    InconsistentRole(NodeId),
    /// Role declared twice for the same node.
    #[error("Node {0} is declared more than once")]
    DuplicateNode(NodeId),
    /// Cost requested for a node that is not an influencer.
    #[error("Node {0} is not an influencer")]
    NotAnInfluencer(NodeId),
    /// Edge from a node to itself.
    #[error("Self-loop on node {0}")]
    SelfLoop(NodeId),
    /// Edge declared twice.
    #[error("Duplicate edge {0} - {1}")]
    DuplicateEdge(NodeId, NodeId),
    /// Negative or non-finite influencer cost.
    #[error("Invalid cost {cost} for node {node}")]
    InvalidCost {
        /// Offending node.
        node: NodeId,
        /// Offending cost.
        cost: f64,
    },
    /// Hater weight outside [0, 1].
    #[error("Invalid hater weight {weight} for node {node}")]
    InvalidHaterWeight {
        /// Offending node.
        node: NodeId,
        /// Offending weight.
        weight: f64,
    },
}

/// Read-only view of the social graph.
///
/// Implementations must return neighbors and influencers sorted by
/// `NodeId` so that simulations and searches are deterministic.
/// The simulator and selector only ever read through this trait, so one
/// graph can be shared across threads without locking.
pub trait GraphModel: Send + Sync {
    /// Whether the node exists.
    fn contains(&self, id: NodeId) -> bool;

    /// Role of a node.
    fn role(&self, id: NodeId) -> Result<Role, GraphError>;

    /// Neighbors of a node (sorted by NodeId).
    fn neighbors(&self, id: NodeId) -> Result<&[NodeId], GraphError>;

    /// Activation cost of an influencer.
    fn cost(&self, id: NodeId) -> Result<f64, GraphError>;

    /// Dampening weight of a hater, 0 for every other role.
    fn hater_weight(&self, id: NodeId) -> Result<f64, GraphError>;

    /// All influencers (sorted by NodeId).
    fn influencers(&self) -> &[NodeId];

    /// All node ids (sorted).
    fn node_ids(&self) -> Vec<NodeId>;

    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Number of undirected edges.
    fn edge_count(&self) -> usize;

    /// Number of neighbors of a node.
    fn degree(&self, id: NodeId) -> Result<usize, GraphError> {
        Ok(self.neighbors(id)?.len())
    }
}

pub use memory::{GraphBuilder, SocialGraph};
