//! Round records: responses, votes and the per-round tally.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use arena_common_core::{PersonaId, Timestamp};

/// Reasoning recorded on a vote chosen at random after repeated invalid ballots.
pub const FALLBACK_REASONING: &str = "(random fallback after invalid votes)";

/// One contestant's answer for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub contestant_id: PersonaId,
    pub contestant_name: String,
    pub model: String,
    pub content: String,
    pub timestamp: Timestamp,
}

/// A ballot. The voter never equals the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter_id: PersonaId,
    pub voter_name: String,
    pub target_id: PersonaId,
    pub target_name: String,
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Set when the target was picked at random after retries ran out.
    #[serde(default)]
    pub fallback: bool,
}

/// Votes received per contestant in one round.
///
/// Sparse: only contestants with at least one vote have an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteTally(BTreeMap<PersonaId, u32>);

impl VoteTally {
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut counts = BTreeMap::new();
        for vote in votes {
            *counts.entry(vote.target_id.clone()).or_insert(0) += 1;
        }
        Self(counts)
    }

    /// Votes received by `id`, zero when absent.
    pub fn get(&self, id: &PersonaId) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PersonaId, u32)> {
        self.0.iter().map(|(id, count)| (id, *count))
    }
}

/// Immutable record of a completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round_number: u32,
    pub question: String,
    pub responses: Vec<Response>,
    pub votes: Vec<Vote>,
    pub tally: VoteTally,
    pub timestamp: Timestamp,
}

impl RoundResult {
    pub fn fallback_votes(&self) -> usize {
        self.votes.iter().filter(|v| v.fallback).count()
    }
}
