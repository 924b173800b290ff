//! Run configuration for the selection binary.
//!
//! ## Environment Variables
//!
//! | Variable | Default |
//! |---|---|
//! | `COSTS_PATH` | `costs.csv` |
//! | `HATERS_PATH` | `haters.csv` |
//! | `FRIENDSHIPS_PATH` | `friendships.csv` |
//! | `BUDGET` | `1500` (`inf` for no limit) |
//! | `PROPAGATION_PROBABILITY` | `0.2` |
//! | `PENALTY_WEIGHT` | `1.0` |
//! | `MAX_ROUNDS` | unset: run to the fixed point |
//! | `TRIALS` | `200` |
//! | `MAX_ITERATIONS` | `1000` |
//! | `RESTARTS` | `2` |
//! | `SEEDED_PASSES` | `true` |
//! | `SEED` | `42` |
//! | `OUTPUT_PATH` | unset: no table written |
//!
//! Unset and empty variables take the default; set values that do not
//! parse or are out of range are errors.

use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::loader::TablePaths;
use crate::policy::{DiffusionPolicy, SearchPolicy};

/// Error type for configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set to an unusable value.
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Value found.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Everything one selection run needs.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    /// Costs table.
    pub costs_path: PathBuf,
    /// Haters table.
    pub haters_path: PathBuf,
    /// Friendships table.
    pub friendships_path: PathBuf,
    /// Selection budget.
    pub budget: f64,
    /// Diffusion parameters.
    pub diffusion: DiffusionPolicy,
    /// Search parameters.
    pub search: SearchPolicy,
    /// Where to write the selected ids, if anywhere.
    pub output_path: Option<PathBuf>,
}

impl RunConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through a lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let path = |var: &str, default: &str| PathBuf::from(get(var).unwrap_or_else(|| default.to_string()));

        let budget: f64 = parse_or(&get, "BUDGET", 1500.0)?;
        if budget.is_nan() || budget < 0.0 {
            return Err(invalid("BUDGET", budget, "must be a non-negative number"));
        }

        let probability: f64 = parse_or(&get, "PROPAGATION_PROBABILITY", 0.2)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(invalid("PROPAGATION_PROBABILITY", probability, "must be within [0, 1]"));
        }

        let penalty: f64 = parse_or(&get, "PENALTY_WEIGHT", 1.0)?;
        if penalty.is_nan() || penalty < 0.0 {
            return Err(invalid("PENALTY_WEIGHT", penalty, "must be a non-negative number"));
        }

        let max_rounds: Option<u32> = get("MAX_ROUNDS")
            .map(|v| parse("MAX_ROUNDS", &v))
            .transpose()?;

        let trials: usize = parse_or(&get, "TRIALS", 200)?;
        if trials == 0 {
            return Err(invalid("TRIALS", trials, "must be at least 1"));
        }
        let max_iterations: usize = parse_or(&get, "MAX_ITERATIONS", 1000)?;
        let restarts: usize = parse_or(&get, "RESTARTS", 2)?;
        let seeded_passes: bool = parse_or(&get, "SEEDED_PASSES", true)?;
        let seed: u64 = parse_or(&get, "SEED", 42)?;

        Ok(Self {
            costs_path: path("COSTS_PATH", "costs.csv"),
            haters_path: path("HATERS_PATH", "haters.csv"),
            friendships_path: path("FRIENDSHIPS_PATH", "friendships.csv"),
            budget,
            diffusion: DiffusionPolicy::new(probability, penalty, max_rounds),
            search: SearchPolicy::new(trials, max_iterations)
                .with_restarts(restarts)
                .with_seeded_passes(seeded_passes)
                .with_seed(seed),
            output_path: get("OUTPUT_PATH").map(PathBuf::from),
        })
    }

    /// Paths of the input tables.
    pub fn table_paths(&self) -> TablePaths {
        TablePaths {
            costs: self.costs_path.clone(),
            haters: self.haters_path.clone(),
            friendships: self.friendships_path.clone(),
        }
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(value) => parse(var, &value),
        None => Ok(default),
    }
}

fn invalid<T: std::fmt::Display>(var: &'static str, value: T, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
