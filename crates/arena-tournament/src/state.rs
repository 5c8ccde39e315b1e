//! Tournament state: the single unit of persistence.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use arena_common_core::PersonaId;

use crate::error::{ArenaError, ArenaResult};
use crate::persona::Contestant;

/// Append-only record of a removed contestant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationRecord {
    pub contestant_id: PersonaId,
    pub contestant_name: String,
    pub model: String,
    #[serde(default)]
    pub generation: u32,
    /// Rounds participated at the time of removal.
    pub rounds_survived: u32,
    #[serde(default)]
    pub total_votes_received: u32,
    pub eliminated_round: u32,
}

impl EliminationRecord {
    pub fn for_contestant(contestant: &Contestant, round: u32) -> Self {
        Self {
            contestant_id: contestant.id.clone(),
            contestant_name: contestant.name.clone(),
            model: contestant.model.clone(),
            generation: contestant.generation,
            rounds_survived: contestant.rounds_participated,
            total_votes_received: contestant.total_votes_received,
            eliminated_round: round,
        }
    }
}

/// Mutable tournament snapshot, threaded explicitly through every phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentState {
    /// Last started round. Zero before the first round.
    pub current_round: u32,
    /// Active contestants in creation order.
    #[serde(alias = "agents")]
    pub contestants: Vec<Contestant>,
    /// Model pool new contestants are drawn from.
    pub models: Vec<String>,
    #[serde(default)]
    pub elimination_history: Vec<EliminationRecord>,
}

/// One line of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub contestant: Contestant,
}

/// End-of-run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentSummary {
    pub rounds_played: u32,
    pub survivors: Vec<Standing>,
    pub eliminations: Vec<EliminationRecord>,
}

impl TournamentState {
    pub fn fresh(models: Vec<String>) -> Self {
        Self {
            models,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contestants.is_empty()
    }

    pub fn contestant(&self, id: &PersonaId) -> Option<&Contestant> {
        self.contestants.iter().find(|c| &c.id == id)
    }

    pub fn is_active(&self, id: &PersonaId) -> bool {
        self.contestant(id).is_some()
    }

    /// Contestants whose drought reached `drought_limit`, in roster order.
    pub fn eligible_for_elimination(&self, drought_limit: u32) -> Vec<Contestant> {
        self.contestants
            .iter()
            .filter(|c| c.drought >= drought_limit)
            .cloned()
            .collect()
    }

    /// Active contestants ranked by votes, then rounds played, then creation order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut ranked: Vec<&Contestant> = self.contestants.iter().collect();
        // stable sort keeps creation order for ties
        ranked.sort_by(|a, b| {
            b.total_votes_received
                .cmp(&a.total_votes_received)
                .then(b.rounds_participated.cmp(&a.rounds_participated))
        });
        ranked
            .into_iter()
            .enumerate()
            .map(|(idx, c)| Standing {
                rank: idx + 1,
                contestant: c.clone(),
            })
            .collect()
    }

    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            rounds_played: self.current_round,
            survivors: self.standings(),
            eliminations: self.elimination_history.clone(),
        }
    }

    /// Check the invariants a loaded state must hold.
    pub fn check_consistency(&self) -> ArenaResult<()> {
        let mut seen = HashSet::new();
        for contestant in &self.contestants {
            if !seen.insert(&contestant.id) {
                return Err(ArenaError::InconsistentState(format!(
                    "contestant {} is active more than once",
                    contestant.id
                )));
            }
        }
        if self.models.iter().all(|m| m.trim().is_empty()) {
            return Err(ArenaError::EmptyModelPool);
        }
        Ok(())
    }
}
