//! Persistence seams consumed by the engines and the orchestrator.
//!
//! Every store is synchronous: the tournament is single-writer and saves
//! happen between phases, never concurrently with gateway calls.

mod file;
mod memory;

pub use file::{FileDigestStore, FilePersonaStore, FileRoundLog, FileStateStore};
pub use memory::MemoryStore;

use arena_common_core::{PersonaId, Result};

use crate::persona::Persona;
use crate::round::RoundResult;
use crate::state::TournamentState;

/// Durable persona records.
pub trait PersonaStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<Persona>>;

    fn get(&self, id: &PersonaId) -> Result<Option<Persona>>;

    fn save(&self, persona: &Persona) -> Result<()>;

    /// Set the death round. Returns `false` when no such persona exists.
    fn mark_dead(&self, id: &PersonaId, round: u32) -> Result<bool>;

    fn exists(&self, id: &PersonaId) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// The persisted tournament snapshot.
pub trait StateStore: Send + Sync {
    /// `None` when nothing was persisted yet.
    fn load(&self) -> Result<Option<TournamentState>>;

    fn save(&self, state: &TournamentState) -> Result<()>;
}

/// The rolling feedback digest.
pub trait DigestStore: Send + Sync {
    /// Current digest text, empty when nothing was written yet.
    fn load(&self) -> Result<String>;

    fn append_and_trim(&self, block: &str, max_blocks: usize) -> Result<()>;
}

/// One persisted artifact per round.
pub trait RoundLogSink: Send + Sync {
    fn write(&self, round_number: u32, result: &RoundResult) -> Result<()>;
}

/// The four stores an arena needs.
pub struct ArenaStores {
    pub personas: Box<dyn PersonaStore>,
    pub state: Box<dyn StateStore>,
    pub digest: Box<dyn DigestStore>,
    pub round_log: Box<dyn RoundLogSink>,
}

impl ArenaStores {
    /// File-backed stores under the configured data and log directories.
    pub fn files(paths: &arena_common_config::PathsConfig) -> Self {
        Self {
            personas: Box::new(FilePersonaStore::new(paths.personalities_dir())),
            state: Box::new(FileStateStore::new(paths.state_file())),
            digest: Box::new(FileDigestStore::new(paths.feedback_file())),
            round_log: Box::new(FileRoundLog::new(&paths.logs_dir)),
        }
    }

    /// All four roles backed by one shared in-memory store.
    pub fn memory(store: &MemoryStore) -> Self {
        Self {
            personas: Box::new(store.clone()),
            state: Box::new(store.clone()),
            digest: Box::new(store.clone()),
            round_log: Box::new(store.clone()),
        }
    }
}
