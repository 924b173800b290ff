//! Marginal-gain scoring for greedy selection.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{NodeId, TrialResult, COST_EPSILON};

/// How a greedy pass ranks candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GainMode {
    /// Gain per unit of cost.
    CostRatio,
    /// Raw gain, ignoring cost.
    UniformCost,
}

/// Compute the ranking priority of a candidate.
///
/// Formula:
/// ```text
/// CostRatio:   priority = gain / cost
/// UniformCost: priority = gain
/// ```
///
/// A free candidate (cost within `COST_EPSILON` of zero) ranks at
/// `+inf` when its gain is positive and `-inf` when negative, so free
/// improvements are always taken first.
pub fn gain_priority(gain: f64, cost: f64, mode: GainMode) -> f64 {
    match mode {
        GainMode::UniformCost => gain,
        GainMode::CostRatio if cost > COST_EPSILON => gain / cost,
        GainMode::CostRatio => {
            if gain > 0.0 {
                f64::INFINITY
            } else if gain < 0.0 {
                f64::NEG_INFINITY
            } else {
                0.0
            }
        }
    }
}

/// An evaluated candidate addition.
#[derive(Debug, Clone)]
pub struct GainCandidate {
    /// Influencer being considered.
    pub node: NodeId,
    /// Its cost.
    pub cost: f64,
    /// Score of the extended set minus score of the current set.
    pub gain: f64,
    /// Ranking priority from [`gain_priority`].
    pub priority: f64,
    /// Tie-break rank; lower wins. Deterministic passes use the node id.
    pub tie_rank: u64,
    /// Evaluation of the extended set.
    pub result: TrialResult,
}

impl GainCandidate {
    /// Create a candidate, computing its gain and priority.
    pub fn new(
        node: NodeId,
        cost: f64,
        base_score: f64,
        result: TrialResult,
        mode: GainMode,
        tie_rank: u64,
    ) -> Self {
        let gain = result.mean_score - base_score;
        Self {
            node,
            cost,
            gain,
            priority: gain_priority(gain, cost, mode),
            tie_rank,
            result,
        }
    }
}

// Ordering for max selection: the greatest candidate is picked.
impl PartialEq for GainCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GainCandidate {}

impl PartialOrd for GainCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GainCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Primary: higher priority
        // Secondary: higher raw gain (separates free candidates at +inf)
        // Tertiary: lower tie rank, then lower NodeId
        let by_float = |a: f64, b: f64| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        by_float(self.priority, other.priority)
            .then_with(|| by_float(self.gain, other.gain))
            .then_with(|| other.tie_rank.cmp(&self.tie_rank))
            .then_with(|| other.node.cmp(&self.node))
    }
}
