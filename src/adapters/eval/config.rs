//! Evaluation settings.

use serde::{Deserialize, Serialize};

use crate::core::{Strategy, VotingMode};

/// How test points are classified during evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Neighbors consulted by the fallback
    pub k: usize,

    /// Containment voting mode tried first
    pub voting: VotingMode,

    /// Used when no circle contains the query
    pub fallback: Strategy,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            k: 5,
            voting: VotingMode::SimpleMajority,
            fallback: Strategy::RegularKnn,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_voting(mut self, voting: VotingMode) -> Self {
        self.voting = voting;
        self
    }

    pub fn with_fallback(mut self, fallback: Strategy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
