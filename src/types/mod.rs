//! Core types for the exposure kernel.

pub mod node;
pub mod candidate;
pub mod outcome;

pub use node::{NodeId, Node, Role};
pub use candidate::{CandidateSet, CandidateError, COST_EPSILON};
pub use outcome::{TrialOutcome, TrialResult, HaterStats};
