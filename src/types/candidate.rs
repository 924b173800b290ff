//! Budget-constrained influencer selections.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::store::{GraphError, GraphModel};
use super::node::{NodeId, Role};

/// Costs at or below this are treated as free when ranking candidates.
///
/// Budget checks never use it: a set's total cost is compared to its
/// budget exactly.
pub const COST_EPSILON: f64 = 1e-9;

/// Error type for candidate set construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CandidateError {
    /// Budget is negative or NaN.
    #[error("Invalid budget: {0}")]
    InvalidBudget(f64),
    /// Adding the node would exceed the budget.
    #[error("Node {node} (cost {cost}) exceeds remaining budget {remaining}")]
    OverBudget {
        /// Rejected node.
        node: NodeId,
        /// Its cost.
        cost: f64,
        /// Budget left before the addition.
        remaining: f64,
    },
    /// Node already selected.
    #[error("Node {0} is already selected")]
    Duplicate(NodeId),
    /// Only influencers can be selected.
    #[error("Node {0} is not an influencer")]
    NotInfluencer(NodeId),
    /// Graph lookup error.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// An ordered selection of influencers whose total cost fits a budget.
///
/// Members keep their insertion order (the order a search picked them);
/// use [`CandidateSet::sorted_members`] for a canonical view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    members: Vec<NodeId>,
    total_cost: f64,
    #[serde(with = "unlimited_as_null")]
    budget: f64,
}

/// An infinite budget is written as `null` and read back as infinity.
mod unlimited_as_null {
    use super::*;

    pub fn serialize<S: Serializer>(budget: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if budget.is_finite() {
            serializer.serialize_some(budget)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

impl CandidateSet {
    /// Create an empty set for a budget.
    ///
    /// `f64::INFINITY` is accepted as "no budget constraint".
    pub fn new(budget: f64) -> Result<Self, CandidateError> {
        if budget.is_nan() || budget < 0.0 {
            return Err(CandidateError::InvalidBudget(budget));
        }
        Ok(Self {
            members: Vec::new(),
            total_cost: 0.0,
            budget,
        })
    }

    /// Build a set from members, validating every invariant.
    pub fn from_members<G, I>(graph: &G, budget: f64, members: I) -> Result<Self, CandidateError>
    where
        G: GraphModel + ?Sized,
        I: IntoIterator<Item = NodeId>,
    {
        let mut set = Self::new(budget)?;
        for id in members {
            set.try_add(graph, id)?;
        }
        Ok(set)
    }

    /// Add an influencer if it keeps the set within budget.
    pub fn try_add<G: GraphModel + ?Sized>(&mut self, graph: &G, id: NodeId) -> Result<(), CandidateError> {
        if graph.role(id)? != Role::Influencer {
            return Err(CandidateError::NotInfluencer(id));
        }
        if self.contains(id) {
            return Err(CandidateError::Duplicate(id));
        }
        let cost = graph.cost(id)?;
        if !self.fits(cost) {
            return Err(CandidateError::OverBudget {
                node: id,
                cost,
                remaining: self.remaining(),
            });
        }
        self.members.push(id);
        self.total_cost += cost;
        Ok(())
    }

    /// Copy of this set with one more member.
    pub fn with_member<G: GraphModel + ?Sized>(&self, graph: &G, id: NodeId) -> Result<Self, CandidateError> {
        let mut next = self.clone();
        next.try_add(graph, id)?;
        Ok(next)
    }

    /// Whether an additional cost fits the remaining budget.
    ///
    /// The comparison is exact, so `total_cost() <= budget()` holds for
    /// every set.
    pub fn fits(&self, cost: f64) -> bool {
        self.total_cost + cost <= self.budget
    }

    /// Members in selection order.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Members sorted by id.
    pub fn sorted_members(&self) -> Vec<NodeId> {
        let mut sorted = self.members.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Whether a node is selected.
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sum of member costs.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Budget the set was created for.
    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Budget left.
    pub fn remaining(&self) -> f64 {
        (self.budget - self.total_cost).max(0.0)
    }
}
