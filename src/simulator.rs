//! Independent-cascade diffusion with hater dampening.
//!
//! The simulator propagates activation from a seed set over discrete
//! rounds until a fixed point and reports an exposure score that
//! penalizes activated haters.
//!
//! ## Diffusion Rule
//!
//! 1. Every seed starts Active (ActiveHater if it is a hater); the
//!    non-hater seeds form the first frontier
//! 2. Each frontier node attempts once on every Inactive neighbor
//! 3. A target `v` reached by `k` frontier nodes activates with
//!    probability `1 - (1 - p_v)^k`, where
//!    `p_v = p * Π (1 - w_h)` over the haters `h` adjacent to `v`
//! 4. Newly activated non-haters form the next frontier; newly activated
//!    haters become ActiveHater and never propagate
//! 5. Stop when a round activates nothing or `max_rounds` is reached
//!
//! Targets are resolved in ascending `NodeId` order and a uniform draw is
//! taken only when `0 < prob < 1`, so a trial is a pure function of the
//! seeds, the policy and the RNG stream.

use std::collections::BTreeMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;

use crate::policy::DiffusionPolicy;
use crate::store::{GraphError, GraphModel};
use crate::types::{CandidateSet, NodeId, Role, TrialOutcome, TrialResult};

/// Golden-ratio increment used to decorrelate per-trial seeds.
const TRIAL_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Activation status of a node within one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationStatus {
    /// Not (yet) activated.
    Inactive,
    /// Activated non-hater.
    Active,
    /// Activated hater.
    ActiveHater,
}

/// Per-trial activation state.
///
/// Only activated nodes are stored; every other node is Inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationState {
    activated: BTreeMap<NodeId, ActivationStatus>,
}

impl ActivationState {
    /// Status of a node.
    pub fn status(&self, id: NodeId) -> ActivationStatus {
        self.activated.get(&id).copied().unwrap_or(ActivationStatus::Inactive)
    }

    fn is_inactive(&self, id: NodeId) -> bool {
        !self.activated.contains_key(&id)
    }

    fn activate(&mut self, id: NodeId, role: Role) -> ActivationStatus {
        let status = if role == Role::Hater {
            ActivationStatus::ActiveHater
        } else {
            ActivationStatus::Active
        };
        self.activated.insert(id, status);
        status
    }

    /// All activated nodes (haters included), sorted.
    pub fn activated(&self) -> Vec<NodeId> {
        self.activated.keys().copied().collect()
    }

    /// Number of Active non-hater nodes.
    pub fn active_count(&self) -> usize {
        self.activated.values().filter(|s| **s == ActivationStatus::Active).count()
    }

    /// Number of ActiveHater nodes.
    pub fn hater_count(&self) -> usize {
        self.activated.values().filter(|s| **s == ActivationStatus::ActiveHater).count()
    }
}

/// Diffusion simulator over a read-only graph.
pub struct DiffusionSimulator<'g, G: GraphModel + ?Sized> {
    graph: &'g G,
    policy: DiffusionPolicy,
}

impl<'g, G: GraphModel + ?Sized> DiffusionSimulator<'g, G> {
    /// Create a simulator.
    pub fn new(graph: &'g G, policy: DiffusionPolicy) -> Self {
        Self { graph, policy }
    }

    /// The diffusion policy in use.
    pub fn policy(&self) -> &DiffusionPolicy {
        &self.policy
    }

    /// Probability that a single attempt activates `id`, after dampening
    /// by its hater neighbors.
    pub fn activation_probability(&self, id: NodeId) -> Result<f64, GraphError> {
        let mut p = self.policy.propagation_probability;
        for &neighbor in self.graph.neighbors(id)? {
            if self.graph.role(neighbor)? == Role::Hater {
                p *= 1.0 - self.graph.hater_weight(neighbor)?;
            }
        }
        Ok(p)
    }

    /// Run one trial to the fixed point and return the final state and
    /// the number of rounds that activated at least one node.
    ///
    /// Seeds may be given in any order and may repeat.
    pub fn propagate<R: Rng + ?Sized>(
        &self,
        seeds: &[NodeId],
        rng: &mut R,
    ) -> Result<(ActivationState, u32), GraphError> {
        let mut seeds = seeds.to_vec();
        seeds.sort_unstable();
        seeds.dedup();

        let mut state = ActivationState::default();
        let mut frontier = Vec::with_capacity(seeds.len());
        for &seed in &seeds {
            let role = self.graph.role(seed)?;
            if state.activate(seed, role) == ActivationStatus::Active {
                frontier.push(seed);
            }
        }

        let mut rounds = 0u32;
        // Memo of dampened probabilities, local to this trial.
        let mut probabilities: BTreeMap<NodeId, f64> = BTreeMap::new();

        while !frontier.is_empty() {
            if self.policy.max_rounds.is_some_and(|max| rounds >= max) {
                break;
            }

            let mut attempts: BTreeMap<NodeId, i32> = BTreeMap::new();
            for &node in &frontier {
                for &neighbor in self.graph.neighbors(node)? {
                    if state.is_inactive(neighbor) {
                        *attempts.entry(neighbor).or_insert(0) += 1;
                    }
                }
            }

            let mut next_frontier = Vec::new();
            let mut activated_any = false;
            for (target, k) in attempts {
                let p_v = match probabilities.get(&target) {
                    Some(p) => *p,
                    None => {
                        let p = self.activation_probability(target)?;
                        probabilities.insert(target, p);
                        p
                    }
                };
                let prob = 1.0 - (1.0 - p_v).powi(k);

                let activated = if prob >= 1.0 {
                    true
                } else if prob <= 0.0 {
                    false
                } else {
                    rng.gen::<f64>() < prob
                };

                if activated {
                    activated_any = true;
                    let role = self.graph.role(target)?;
                    if state.activate(target, role) == ActivationStatus::Active {
                        next_frontier.push(target);
                    }
                }
            }

            if !activated_any {
                break;
            }
            rounds += 1;
            frontier = next_frontier;
        }

        Ok((state, rounds))
    }

    /// Run one trial and score it.
    pub fn run_trial<R: Rng + ?Sized>(&self, seeds: &[NodeId], rng: &mut R) -> Result<TrialOutcome, GraphError> {
        let (state, rounds) = self.propagate(seeds, rng)?;
        Ok(TrialOutcome::new(
            state.active_count(),
            state.hater_count(),
            rounds,
            self.policy.penalty_weight,
        ))
    }

    /// Simulate a candidate set over repeated trials.
    ///
    /// One base seed is drawn from `rng`; trial `i` runs on its own
    /// `ChaCha20Rng` derived from the base seed and `i`. Outcomes are
    /// aggregated in trial order, so parallel and sequential execution
    /// produce identical results. Deterministic policies run one trial.
    pub fn simulate<R: RngCore + ?Sized>(
        &self,
        set: &CandidateSet,
        trials: usize,
        rng: &mut R,
    ) -> Result<TrialResult, GraphError> {
        let seeds = set.sorted_members();
        let base_seed = rng.next_u64();
        let trials = if self.policy.is_deterministic() { 1 } else { trials.max(1) };

        let run = |index: usize| {
            let mut trial_rng = ChaCha20Rng::seed_from_u64(trial_seed(base_seed, index as u64));
            self.run_trial(&seeds, &mut trial_rng)
        };

        let outcomes: Vec<TrialOutcome> = if self.policy.parallel_trials && trials > 1 {
            (0..trials).into_par_iter().map(run).collect::<Result<_, _>>()?
        } else {
            (0..trials).map(run).collect::<Result<_, _>>()?
        };

        Ok(TrialResult::aggregate(&outcomes))
    }
}

fn trial_seed(base_seed: u64, index: u64) -> u64 {
    base_seed.wrapping_add(index.wrapping_mul(TRIAL_SEED_STRIDE))
}
