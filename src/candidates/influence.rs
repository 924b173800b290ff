//! Per-influencer structural statistics.

use serde::{Deserialize, Serialize};

use crate::policy::DiffusionPolicy;
use crate::simulator::DiffusionSimulator;
use crate::store::{GraphError, GraphModel};
use crate::types::NodeId;

/// Structural profile of one influencer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluenceProfile {
    /// The influencer.
    pub node: NodeId,
    /// Number of neighbors.
    pub degree: usize,
    /// Activation cost.
    pub cost: f64,
    /// Mean single-attempt activation probability over its neighbors,
    /// after hater dampening. 0 for isolated influencers.
    pub avg_influence: f64,
}

/// Profile every influencer in the graph, in `NodeId` order.
pub fn profile_influencers<G: GraphModel + ?Sized>(
    graph: &G,
    policy: &DiffusionPolicy,
) -> Result<Vec<InfluenceProfile>, GraphError> {
    let sim = DiffusionSimulator::new(graph, policy.clone());

    graph
        .influencers()
        .iter()
        .map(|&node| {
            let neighbors = graph.neighbors(node)?;
            let mut total = 0.0;
            for &neighbor in neighbors {
                total += sim.activation_probability(neighbor)?;
            }
            let avg_influence = if neighbors.is_empty() {
                0.0
            } else {
                total / neighbors.len() as f64
            };
            Ok(InfluenceProfile {
                node,
                degree: neighbors.len(),
                cost: graph.cost(node)?,
                avg_influence,
            })
        })
        .collect()
}
