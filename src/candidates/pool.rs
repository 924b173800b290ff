//! Candidate pool pre-filtering.

use std::collections::BTreeMap;

use crate::policy::{DiffusionPolicy, PoolPolicy};
use crate::store::{GraphError, GraphModel};
use crate::types::NodeId;
use super::influence::{profile_influencers, InfluenceProfile};

/// Influencers eligible for selection, with their profiles.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    members: Vec<NodeId>,
    profiles: BTreeMap<NodeId, InfluenceProfile>,
    average_degree: f64,
}

impl CandidatePool {
    /// Build the pool.
    ///
    /// ## Filtering
    ///
    /// 1. With `min_degree_ratio = Some(r)`, drop influencers whose degree
    ///    is below `r` times the average influencer degree
    /// 2. With `top_k = Some(k)`, keep the `k` remaining influencers with
    ///    the highest average influence (ties to lower NodeId)
    ///
    /// Members are returned sorted by NodeId.
    pub fn build<G: GraphModel + ?Sized>(
        graph: &G,
        policy: &PoolPolicy,
        diffusion: &DiffusionPolicy,
    ) -> Result<Self, GraphError> {
        let all = profile_influencers(graph, diffusion)?;
        let average_degree = if all.is_empty() {
            0.0
        } else {
            all.iter().map(|p| p.degree as f64).sum::<f64>() / all.len() as f64
        };

        let mut kept: Vec<InfluenceProfile> = match policy.min_degree_ratio {
            Some(ratio) => {
                let threshold = ratio * average_degree;
                all.into_iter().filter(|p| p.degree as f64 >= threshold).collect()
            }
            None => all,
        };

        if let Some(k) = policy.top_k {
            kept.sort_by(|a, b| {
                b.avg_influence
                    .partial_cmp(&a.avg_influence)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.node.cmp(&b.node))
            });
            kept.truncate(k);
        }

        let profiles: BTreeMap<NodeId, InfluenceProfile> = kept.into_iter().map(|p| (p.node, p)).collect();
        let members = profiles.keys().copied().collect();

        Ok(Self {
            members,
            profiles,
            average_degree,
        })
    }

    /// Pool members (sorted).
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Profile of a pool member.
    pub fn profile(&self, id: NodeId) -> Option<&InfluenceProfile> {
        self.profiles.get(&id)
    }

    /// Whether a node is in the pool.
    pub fn contains(&self, id: NodeId) -> bool {
        self.profiles.contains_key(&id)
    }

    /// Sum of average influence over a group; non-members count 0.
    pub fn summed_influence(&self, group: &[NodeId]) -> f64 {
        group
            .iter()
            .filter_map(|id| self.profiles.get(id))
            .map(|p| p.avg_influence)
            .sum()
    }

    /// Average degree over all influencers, before filtering.
    pub fn average_degree(&self) -> f64 {
        self.average_degree
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
