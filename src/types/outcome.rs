//! Simulation outcomes and their aggregation.

use serde::{Deserialize, Serialize};

/// Result of a single diffusion trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Exposure score: active non-haters minus weighted active haters.
    pub score: f64,
    /// Active non-hater nodes at the fixed point (seeds included).
    pub active: usize,
    /// Activated haters at the fixed point.
    pub active_haters: usize,
    /// Rounds executed before the fixed point (or the round bound).
    pub rounds: u32,
}

impl TrialOutcome {
    /// Create an outcome, computing its score.
    pub fn new(active: usize, active_haters: usize, rounds: u32, penalty_weight: f64) -> Self {
        Self {
            score: active as f64 - penalty_weight * active_haters as f64,
            active,
            active_haters,
            rounds,
        }
    }
}

/// Distribution summary of hater activations across trials.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HaterStats {
    /// Fewest haters activated in any trial.
    pub min: usize,
    /// Most haters activated in any trial.
    pub max: usize,
    /// Mean haters activated per trial.
    pub mean: f64,
}

/// Aggregate of one or more trials for the same seed set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Number of trials aggregated.
    pub trials: usize,
    /// Mean exposure score.
    pub mean_score: f64,
    /// Population standard deviation of the score.
    pub score_std_dev: f64,
    /// Mean active non-hater count.
    pub mean_active: f64,
    /// Mean rounds to the fixed point.
    pub mean_rounds: f64,
    /// Hater activation statistics.
    pub haters: HaterStats,
}

impl TrialResult {
    /// Result with no trials and a zero score.
    pub fn zero() -> Self {
        Self {
            trials: 0,
            mean_score: 0.0,
            score_std_dev: 0.0,
            mean_active: 0.0,
            mean_rounds: 0.0,
            haters: HaterStats::default(),
        }
    }

    /// Aggregate trial outcomes.
    ///
    /// Sums run in slice order, so the same outcomes always produce the
    /// same floating-point result regardless of how they were computed.
    pub fn aggregate(outcomes: &[TrialOutcome]) -> Self {
        if outcomes.is_empty() {
            return Self::zero();
        }

        let n = outcomes.len() as f64;
        let mean_score = outcomes.iter().map(|o| o.score).sum::<f64>() / n;
        let variance = outcomes.iter()
            .map(|o| (o.score - mean_score).powi(2))
            .sum::<f64>() / n;
        let mean_active = outcomes.iter().map(|o| o.active as f64).sum::<f64>() / n;
        let mean_rounds = outcomes.iter().map(|o| o.rounds as f64).sum::<f64>() / n;

        let min = outcomes.iter().map(|o| o.active_haters).min().unwrap_or(0);
        let max = outcomes.iter().map(|o| o.active_haters).max().unwrap_or(0);
        let mean = outcomes.iter().map(|o| o.active_haters as f64).sum::<f64>() / n;

        Self {
            trials: outcomes.len(),
            mean_score,
            score_std_dev: variance.sqrt(),
            mean_active,
            mean_rounds,
            haters: HaterStats { min, max, mean },
        }
    }

    /// Mean exposure score.
    pub fn score(&self) -> f64 {
        self.mean_score
    }
}
