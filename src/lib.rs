//! # exposure-kernel
//!
//! Budget-constrained influencer selection on a social graph.
//!
//! The kernel answers one question:
//!
//! > Given a budget, which influencers should be activated to maximize
//! > brand exposure, when some users are **haters** who hurt the outcome?
//!
//! ## Core Contract
//!
//! 1. Simulate independent-cascade diffusion from a seed set, with haters
//!    dampening their neighbors and counting against the score
//! 2. Search for a set of influencers whose total cost fits the budget and
//!    whose mean simulated score is as high as possible
//! 3. Report the chosen set with a fingerprint of the graph and policies
//!    it was computed from
//!
//! ## Architecture
//!
//! ```text
//! Tables → loader → SocialGraph → GreedySelector → Selection → SelectionReport
//!                        ↓              ↓
//!                  CandidatePool   DiffusionSimulator (rayon trials)
//!                                       ↓
//!                                 EvaluationCache (LRU)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same graph + same policies + same seed → identical selection
//! - Neighbor and influencer ordering is canonical (by NodeId)
//! - Parallel and sequential trial execution produce identical results

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod store;
pub mod canonical;
pub mod cache;
pub mod simulator;
pub mod candidates;
pub mod selector;
pub mod snapshot;
pub mod report;
pub mod loader;
pub mod config;

// Re-exports
pub use types::{NodeId, Node, Role, CandidateSet, CandidateError, TrialOutcome, TrialResult, HaterStats};
pub use store::{GraphModel, GraphError, GraphBuilder, SocialGraph};
pub use policy::{DiffusionPolicy, SearchPolicy, PoolPolicy, SamplingPolicy, GainMode};
pub use cache::{CacheConfig, CacheStats, EvaluationCache};
pub use simulator::{ActivationState, ActivationStatus, DiffusionSimulator};
pub use candidates::{CandidatePool, InfluenceProfile, RankedGroup, spreadness};
pub use selector::{select, GreedySelector, Selection, SelectorError, SearchStats, PassKind, PassSummary};
pub use snapshot::GraphSnapshot;
pub use report::{SelectionReport, write_selection_csv};
pub use loader::{load_tables, LoadError, Table, TablePaths};
pub use config::{RunConfig, ConfigError};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};

/// Schema version for all exposure kernel types.
/// Increment on breaking changes to any schema type.
pub const EXPOSURE_KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Default diffusion policy version identifier.
pub const DEFAULT_DIFFUSION_POLICY_VERSION: &str = "diffusion_policy_v1";

/// Default search policy version identifier.
pub const DEFAULT_SEARCH_POLICY_VERSION: &str = "search_policy_v1";
