//! In-memory social graph.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Node, NodeId, Role};
use super::{GraphError, GraphModel};

/// Validating builder for [`SocialGraph`].
///
/// Roles and friendships may be declared in any order. Friendship
/// endpoints that never receive a role become plain nodes.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<NodeId, Node>,
    /// Unordered pairs stored as (low, high).
    edges: BTreeSet<(NodeId, NodeId)>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain node. No-op if the node already exists.
    pub fn add_node(&mut self, id: NodeId) {
        self.nodes.entry(id).or_insert_with(|| Node::plain(id));
    }

    /// Declare an influencer with its activation cost.
    pub fn add_influencer(&mut self, id: NodeId, cost: f64) -> Result<(), GraphError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(GraphError::InvalidCost { node: id, cost });
        }
        match self.nodes.get(&id).map(|n| n.role) {
            Some(Role::Hater) => Err(GraphError::InconsistentRole(id)),
            Some(Role::Influencer) => Err(GraphError::DuplicateNode(id)),
            Some(Role::Plain) | None => {
                self.nodes.insert(id, Node::influencer(id, cost));
                Ok(())
            }
        }
    }

    /// Declare a hater with its dampening weight.
    pub fn add_hater(&mut self, id: NodeId, weight: f64) -> Result<(), GraphError> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(GraphError::InvalidHaterWeight { node: id, weight });
        }
        match self.nodes.get(&id).map(|n| n.role) {
            Some(Role::Influencer) => Err(GraphError::InconsistentRole(id)),
            Some(Role::Hater) => Err(GraphError::DuplicateNode(id)),
            Some(Role::Plain) | None => {
                self.nodes.insert(id, Node::hater(id, weight));
                Ok(())
            }
        }
    }

    /// Add an undirected edge, registering unknown endpoints as plain nodes.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        let key = ordered_pair(a, b);
        if !self.edges.insert(key) {
            return Err(GraphError::DuplicateEdge(key.0, key.1));
        }
        self.add_node(a);
        self.add_node(b);
        Ok(())
    }

    /// Whether the (undirected) edge is already present.
    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains(&ordered_pair(a, b))
    }

    /// Number of nodes declared so far.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Freeze the builder into an immutable graph.
    pub fn build(self) -> SocialGraph {
        let mut adjacency: BTreeMap<NodeId, Vec<NodeId>> =
            self.nodes.keys().map(|id| (*id, Vec::new())).collect();

        for (a, b) in &self.edges {
            adjacency.entry(*a).or_default().push(*b);
            adjacency.entry(*b).or_default().push(*a);
        }
        for list in adjacency.values_mut() {
            list.sort_unstable();
        }

        let influencers = self.nodes.values()
            .filter(|n| n.role == Role::Influencer)
            .map(|n| n.id)
            .collect();
        let haters = self.nodes.values()
            .filter(|n| n.is_hater())
            .map(|n| n.id)
            .collect();

        SocialGraph {
            nodes: self.nodes,
            adjacency,
            influencers,
            haters,
            edges: self.edges.into_iter().collect(),
        }
    }
}

fn ordered_pair(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a < b { (a, b) } else { (b, a) }
}

/// Immutable social graph.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default)]
pub struct SocialGraph {
    nodes: BTreeMap<NodeId, Node>,
    adjacency: BTreeMap<NodeId, Vec<NodeId>>,
    influencers: Vec<NodeId>,
    haters: Vec<NodeId>,
    edges: Vec<(NodeId, NodeId)>,
}

impl SocialGraph {
    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// All nodes, sorted by id.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges as sorted (low, high) pairs.
    pub fn all_edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// All haters, sorted by id.
    pub fn haters(&self) -> &[NodeId] {
        &self.haters
    }

    fn lookup(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }
}

impl GraphModel for SocialGraph {
    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn role(&self, id: NodeId) -> Result<Role, GraphError> {
        Ok(self.lookup(id)?.role)
    }

    fn neighbors(&self, id: NodeId) -> Result<&[NodeId], GraphError> {
        self.adjacency
            .get(&id)
            .map(|list| list.as_slice())
            .ok_or(GraphError::UnknownNode(id))
    }

    fn cost(&self, id: NodeId) -> Result<f64, GraphError> {
        self.lookup(id)?.cost.ok_or(GraphError::NotAnInfluencer(id))
    }

    fn hater_weight(&self, id: NodeId) -> Result<f64, GraphError> {
        Ok(self.lookup(id)?.hater_weight)
    }

    fn influencers(&self) -> &[NodeId] {
        &self.influencers
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
