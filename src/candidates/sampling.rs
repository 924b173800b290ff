//! Random budget-filling groups and their structural ranking.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::store::{GraphError, GraphModel};
use crate::types::{CandidateError, CandidateSet, NodeId};
use super::pool::CandidatePool;
use super::spread::spreadness;

/// Attempts allowed per requested sample.
pub const ATTEMPTS_PER_SAMPLE: usize = 100;

/// Draw up to `num_samples` distinct maximal groups from the pool.
///
/// Each attempt shuffles the pool and adds members in that order while
/// they fit the budget. Since costs only accumulate, a member skipped once
/// never fits later, so every group is maximal: no remaining pool member
/// fits. Empty groups are discarded. At most
/// `num_samples * ATTEMPTS_PER_SAMPLE` attempts are made.
///
/// Groups are returned in ascending order of their sorted member lists.
pub fn sample_budget_groups<G, R>(
    graph: &G,
    pool: &CandidatePool,
    budget: f64,
    num_samples: usize,
    rng: &mut R,
) -> Result<Vec<CandidateSet>, CandidateError>
where
    G: GraphModel + ?Sized,
    R: Rng + ?Sized,
{
    let mut seen: BTreeSet<Vec<NodeId>> = BTreeSet::new();
    let mut groups = Vec::new();
    let mut order = pool.members().to_vec();
    let max_attempts = num_samples.saturating_mul(ATTEMPTS_PER_SAMPLE);

    let mut attempts = 0;
    while groups.len() < num_samples && attempts < max_attempts {
        attempts += 1;
        order.shuffle(rng);

        let mut set = CandidateSet::new(budget)?;
        for &id in &order {
            if set.fits(graph.cost(id)?) {
                set.try_add(graph, id)?;
            }
        }

        if !set.is_empty() && seen.insert(set.sorted_members()) {
            groups.push(set);
        }
    }

    groups.sort_by_key(|set| set.sorted_members());
    Ok(groups)
}

/// A sampled group with its structural scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedGroup {
    /// The group.
    pub set: CandidateSet,
    /// Average pairwise hop distance; `None` when no pair is connected.
    pub spreadness: Option<f64>,
    /// Sum of member average influence.
    pub summed_influence: f64,
}

/// Rank groups the way the sampled pass shortlists them.
///
/// 1. Score every group's spreadness and keep the `spread_top_k` most
///    spread out (a group with no connected pair counts as infinitely
///    spread)
/// 2. Of those, keep the `influence_top_t` with the highest summed
///    influence
///
/// Ties keep the incoming order, which is deterministic.
pub fn rank_groups<G: GraphModel + ?Sized>(
    graph: &G,
    pool: &CandidatePool,
    groups: Vec<CandidateSet>,
    spread_top_k: usize,
    influence_top_t: usize,
) -> Result<Vec<RankedGroup>, GraphError> {
    let mut ranked = groups
        .into_iter()
        .map(|set| {
            let members = set.sorted_members();
            Ok(RankedGroup {
                spreadness: spreadness(graph, &members)?,
                summed_influence: pool.summed_influence(&members),
                set,
            })
        })
        .collect::<Result<Vec<_>, GraphError>>()?;

    let spread_key = |g: &RankedGroup| g.spreadness.unwrap_or(f64::INFINITY);
    ranked.sort_by(|a, b| spread_key(b).partial_cmp(&spread_key(a)).unwrap_or(Ordering::Equal));
    ranked.truncate(spread_top_k);

    ranked.sort_by(|a, b| {
        b.summed_influence
            .partial_cmp(&a.summed_influence)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(influence_top_t);
    Ok(ranked)
}
