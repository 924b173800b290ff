//! Search policy v1: budgeted greedy with restarts.

use serde::{Deserialize, Serialize};

use crate::cache::CacheConfig;
use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_SEARCH_POLICY_VERSION;
use super::diffusion::quantize_float;

/// Candidate pool pre-filter.
///
/// With both fields `None` every influencer is a candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolPolicy {
    /// Keep influencers whose degree is at least this multiple of the
    /// average influencer degree.
    pub min_degree_ratio: Option<f64>,
    /// Keep at most this many influencers, ranked by average neighbor
    /// influence.
    pub top_k: Option<usize>,
}

/// Sampled-group pass parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Distinct budget-filling groups to draw.
    pub num_samples: usize,
    /// Groups kept after ranking by spreadness.
    pub spread_top_k: usize,
    /// Groups kept after ranking by summed influence; these are simulated.
    pub influence_top_t: usize,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            num_samples: 200,
            spread_top_k: 40,
            influence_top_t: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct QuantizedSearchParams<'a> {
    version: &'a str,
    trials_per_evaluation: usize,
    max_iterations: usize,
    seed: u64,
    min_gain: i64,
    stop_on_no_gain: bool,
    uniform_cost_pass: bool,
    seeded_passes: bool,
    restarts: usize,
    sample_fraction: i64,
    min_degree_ratio: Option<i64>,
    top_k: Option<usize>,
    sampling: Option<&'a SamplingPolicy>,
}

/// Search policy version 1.
///
/// ## Parameters
///
/// - `trials_per_evaluation`: simulation trials averaged per set
/// - `max_iterations`: greedy additions per pass
/// - `seed`: seed for evaluations and randomized passes
/// - `min_gain` / `stop_on_no_gain`: stop a pass once the best marginal
///   gain is not above `min_gain`
/// - `uniform_cost_pass`: also run a pass ranking by raw gain
/// - `seeded_passes`: rerun the deterministic passes once per pooled
///   influencer, starting from that influencer alone
/// - `restarts`: randomized passes (shuffled tie-breaks, sampled candidates)
/// - `sample_fraction`: share of feasible candidates a randomized pass
///   evaluates per step
/// - `pool`: candidate pre-filter
/// - `sampling`: optional sampled-group pass
/// - `cache`: evaluation cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Trials averaged per evaluation.
    pub trials_per_evaluation: usize,
    /// Maximum greedy additions per pass.
    pub max_iterations: usize,
    /// Seed for all search randomness.
    pub seed: u64,
    /// Minimum marginal gain worth taking.
    pub min_gain: f64,
    /// Whether a pass stops when no candidate beats `min_gain`.
    pub stop_on_no_gain: bool,
    /// Whether to run the uniform-cost pass.
    pub uniform_cost_pass: bool,
    /// Whether to run the deterministic passes from every single-member
    /// start. Costs one pass per pooled influencer and mode.
    pub seeded_passes: bool,
    /// Number of randomized passes.
    pub restarts: usize,
    /// Fraction of feasible candidates sampled per randomized step.
    pub sample_fraction: f64,
    /// Candidate pool pre-filter.
    pub pool: PoolPolicy,
    /// Sampled-group pass.
    pub sampling: Option<SamplingPolicy>,
    /// Evaluation cache.
    pub cache: CacheConfig,
}

impl SearchPolicy {
    /// Create a policy with the given evaluation and iteration bounds.
    pub fn new(trials_per_evaluation: usize, max_iterations: usize) -> Self {
        Self {
            trials_per_evaluation: trials_per_evaluation.max(1),
            max_iterations,
            ..Self::default()
        }
    }

    /// Plain cost-ratio greedy: no companion or randomized passes.
    pub fn greedy_only(trials_per_evaluation: usize, max_iterations: usize) -> Self {
        Self {
            uniform_cost_pass: false,
            seeded_passes: false,
            restarts: 0,
            sampling: None,
            ..Self::new(trials_per_evaluation, max_iterations)
        }
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of randomized passes.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Enable or disable the seeded passes.
    pub fn with_seeded_passes(mut self, enabled: bool) -> Self {
        self.seeded_passes = enabled;
        self
    }

    /// Enable the sampled-group pass.
    pub fn with_sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = Some(sampling);
        self
    }

    /// Set the candidate pool pre-filter.
    pub fn with_pool(mut self, pool: PoolPolicy) -> Self {
        self.pool = pool;
        self
    }

    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Hash of the parameters that affect the search outcome.
    ///
    /// Cache settings only affect speed and are excluded.
    pub fn params_hash(&self) -> String {
        let quantized = QuantizedSearchParams {
            version: &self.version,
            trials_per_evaluation: self.trials_per_evaluation,
            max_iterations: self.max_iterations,
            seed: self.seed,
            min_gain: quantize_float(self.min_gain),
            stop_on_no_gain: self.stop_on_no_gain,
            uniform_cost_pass: self.uniform_cost_pass,
            seeded_passes: self.seeded_passes,
            restarts: self.restarts,
            sample_fraction: quantize_float(self.sample_fraction),
            min_degree_ratio: self.pool.min_degree_ratio.map(quantize_float),
            top_k: self.pool.top_k,
            sampling: self.sampling.as_ref(),
        };
        canonical_hash_hex(&quantized)
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_SEARCH_POLICY_VERSION.to_string(),
            trials_per_evaluation: 200,
            max_iterations: 1000,
            seed: 42,
            min_gain: 0.0,
            stop_on_no_gain: true,
            uniform_cost_pass: true,
            seeded_passes: true,
            restarts: 0,
            sample_fraction: 0.5,
            pool: PoolPolicy::default(),
            sampling: None,
            cache: CacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trials_at_least_one() {
        assert_eq!(SearchPolicy::new(0, 5).trials_per_evaluation, 1);
    }

    #[test]
    fn test_greedy_only_disables_extra_passes() {
        let policy = SearchPolicy::greedy_only(10, 5);
        assert!(!policy.uniform_cost_pass);
        assert!(!policy.seeded_passes);
        assert_eq!(policy.restarts, 0);
        assert!(policy.sampling.is_none());
    }

    #[test]
    fn test_params_hash_ignores_cache() {
        let base = SearchPolicy::default();
        let mut other = base.clone();
        other.cache.enabled = false;
        assert_eq!(base.params_hash(), other.params_hash());
        assert_ne!(base.params_hash(), base.clone().with_seed(7).params_hash());
        assert_ne!(base.params_hash(), base.clone().with_restarts(3).params_hash());
        assert_ne!(base.params_hash(), base.clone().with_seeded_passes(false).params_hash());
    }
}
