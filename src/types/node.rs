//! Node types for the social graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a user in the social graph.
///
/// Wraps the integer user id of the input tables and implements `Ord`
/// for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a new NodeId.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses the decimal id, ignoring surrounding whitespace.
impl FromStr for NodeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Role of a node in the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Can be activated at t=0 for a cost.
    Influencer,
    /// Detractor: counts against the score when activated.
    Hater,
    /// Ordinary user.
    Plain,
}

impl Default for Role {
    fn default() -> Self {
        Self::Plain
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Influencer => write!(f, "influencer"),
            Self::Hater => write!(f, "hater"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// A node with its role attributes.
///
/// `cost` is present exactly when the role is [`Role::Influencer`];
/// `hater_weight` is non-zero only for [`Role::Hater`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier.
    pub id: NodeId,
    /// Role, fixed once loaded.
    pub role: Role,
    /// Activation cost (influencers only).
    pub cost: Option<f64>,
    /// Dampening weight in [0, 1] applied to neighbors of a hater.
    pub hater_weight: f64,
}

impl Node {
    /// Create a plain node.
    pub fn plain(id: NodeId) -> Self {
        Self {
            id,
            role: Role::Plain,
            cost: None,
            hater_weight: 0.0,
        }
    }

    /// Create an influencer node.
    pub fn influencer(id: NodeId, cost: f64) -> Self {
        Self {
            id,
            role: Role::Influencer,
            cost: Some(cost),
            hater_weight: 0.0,
        }
    }

    /// Create a hater node.
    pub fn hater(id: NodeId, weight: f64) -> Self {
        Self {
            id,
            role: Role::Hater,
            cost: None,
            hater_weight: weight,
        }
    }

    /// Whether this node is a hater.
    pub fn is_hater(&self) -> bool {
        self.role == Role::Hater
    }
}
