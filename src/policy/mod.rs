//! Diffusion and search policy definitions.

pub mod diffusion;
pub mod search;
pub mod scoring;

pub use diffusion::DiffusionPolicy;
pub use search::{SearchPolicy, PoolPolicy, SamplingPolicy};
pub use scoring::{gain_priority, GainCandidate, GainMode};
