//! Candidate analysis: influencer profiles, pool filtering and sampled
//! groups used to seed and narrow the search.

pub mod influence;
pub mod pool;
pub mod sampling;
pub mod spread;

pub use influence::{profile_influencers, InfluenceProfile};
pub use pool::CandidatePool;
pub use sampling::{rank_groups, sample_budget_groups, RankedGroup, ATTEMPTS_PER_SAMPLE};
pub use spread::spreadness;
