//! Diffusion policy v1: independent cascade with hater dampening.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing so that `params_hash`
//! does not depend on float formatting. The quantization factor is 1e6
//! (multiply by 1,000,000 and round to i64).

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_DIFFUSION_POLICY_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Quantize a float to an i64 for deterministic hashing.
pub(crate) fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Quantized policy parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuantizedDiffusionParams {
    version: String,
    propagation_probability: i64,
    penalty_weight: i64,
    max_rounds: Option<u32>,
}

/// Diffusion policy version 1.
///
/// ## Parameters
///
/// - `propagation_probability`: chance that one active neighbor activates
///   an inactive node in one attempt, before hater dampening
/// - `penalty_weight`: score cost of each activated hater
/// - `max_rounds`: optional round bound; `None` runs to the fixed point
/// - `parallel_trials`: run repeated trials on the rayon pool (results are
///   identical either way)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Per-attempt activation probability in [0, 1].
    pub propagation_probability: f64,
    /// Penalty per activated hater (>= 0).
    pub penalty_weight: f64,
    /// Maximum rounds per trial.
    pub max_rounds: Option<u32>,
    /// Whether trials may run in parallel.
    pub parallel_trials: bool,
}

impl DiffusionPolicy {
    /// Create a new policy. Out-of-range values are clamped.
    pub fn new(propagation_probability: f64, penalty_weight: f64, max_rounds: Option<u32>) -> Self {
        Self {
            version: DEFAULT_DIFFUSION_POLICY_VERSION.to_string(),
            propagation_probability: sanitize_probability(propagation_probability),
            penalty_weight: if penalty_weight.is_nan() { 0.0 } else { penalty_weight.max(0.0) },
            max_rounds,
            parallel_trials: true,
        }
    }

    /// Every attempt succeeds: any edge from an active node propagates.
    pub fn deterministic() -> Self {
        Self::new(1.0, 1.0, None)
    }

    /// Set the hater penalty weight.
    pub fn with_penalty_weight(mut self, penalty_weight: f64) -> Self {
        self.penalty_weight = if penalty_weight.is_nan() { 0.0 } else { penalty_weight.max(0.0) };
        self
    }

    /// Set the round bound.
    pub fn with_max_rounds(mut self, max_rounds: Option<u32>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Enable or disable parallel trials.
    pub fn with_parallel_trials(mut self, parallel: bool) -> Self {
        self.parallel_trials = parallel;
        self
    }

    /// Whether a single trial fully determines the outcome.
    pub fn is_deterministic(&self) -> bool {
        self.propagation_probability >= 1.0 || self.propagation_probability <= 0.0
    }

    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Compute a hash of the parameters that affect simulation results.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedDiffusionParams {
        QuantizedDiffusionParams {
            version: self.version.clone(),
            propagation_probability: quantize_float(self.propagation_probability),
            penalty_weight: quantize_float(self.penalty_weight),
            max_rounds: self.max_rounds,
        }
    }
}

impl Default for DiffusionPolicy {
    fn default() -> Self {
        Self::new(0.2, 1.0, None)
    }
}

fn sanitize_probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}
