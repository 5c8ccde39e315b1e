use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use arena_common_core::{PersonaId, Result};

use super::{DigestStore, PersonaStore, RoundLogSink, StateStore};
use crate::digest::FeedbackDigest;
use crate::persona::Persona;
use crate::round::RoundResult;
use crate::state::TournamentState;

#[derive(Debug, Default)]
struct Inner {
    personas: BTreeMap<PersonaId, Persona>,
    state: Option<TournamentState>,
    digest: FeedbackDigest,
    rounds: BTreeMap<u32, RoundResult>,
}

/// In-memory implementation of every store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_personas(personas: impl IntoIterator<Item = Persona>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock();
            for persona in personas {
                inner.personas.insert(persona.id.clone(), persona);
            }
        }
        store
    }

    pub fn state(&self) -> Option<TournamentState> {
        self.inner.lock().state.clone()
    }

    pub fn digest(&self) -> FeedbackDigest {
        self.inner.lock().digest.clone()
    }

    pub fn round(&self, round_number: u32) -> Option<RoundResult> {
        self.inner.lock().rounds.get(&round_number).cloned()
    }

    pub fn rounds_logged(&self) -> Vec<u32> {
        self.inner.lock().rounds.keys().copied().collect()
    }
}

impl PersonaStore for MemoryStore {
    fn list_all(&self) -> Result<Vec<Persona>> {
        Ok(self.inner.lock().personas.values().cloned().collect())
    }

    fn get(&self, id: &PersonaId) -> Result<Option<Persona>> {
        Ok(self.inner.lock().personas.get(id).cloned())
    }

    fn save(&self, persona: &Persona) -> Result<()> {
        self.inner
            .lock()
            .personas
            .insert(persona.id.clone(), persona.clone());
        Ok(())
    }

    fn mark_dead(&self, id: &PersonaId, round: u32) -> Result<bool> {
        let mut inner = self.inner.lock();
        match inner.personas.get_mut(id) {
            Some(persona) => {
                persona.died_round = Some(round);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<TournamentState>> {
        Ok(self.inner.lock().state.clone())
    }

    fn save(&self, state: &TournamentState) -> Result<()> {
        self.inner.lock().state = Some(state.clone());
        Ok(())
    }
}

impl DigestStore for MemoryStore {
    fn load(&self) -> Result<String> {
        let inner = self.inner.lock();
        if inner.digest.is_empty() {
            return Ok(String::new());
        }
        Ok(inner.digest.render())
    }

    fn append_and_trim(&self, block: &str, max_blocks: usize) -> Result<()> {
        self.inner.lock().digest.append_and_trim(block, max_blocks);
        Ok(())
    }
}

impl RoundLogSink for MemoryStore {
    fn write(&self, round_number: u32, result: &RoundResult) -> Result<()> {
        self.inner.lock().rounds.insert(round_number, result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_data() {
        let store = MemoryStore::new();
        let other = store.clone();
        let persona = Persona::new(PersonaId::generated(1), "New", "t", "c");

        PersonaStore::save(&other, &persona).unwrap();
        assert_eq!(store.get(&PersonaId::generated(1)).unwrap(), Some(persona));
    }

    #[test]
    fn test_mark_dead_missing() {
        let store = MemoryStore::new();
        assert!(!store.mark_dead(&PersonaId::generated(1), 3).unwrap());
    }

    #[test]
    fn test_empty_digest_loads_as_empty_text() {
        let store = MemoryStore::new();
        assert_eq!(DigestStore::load(&store).unwrap(), "");
        store.append_and_trim("## Round 1\nQuestion: q\n", 5).unwrap();
        assert!(DigestStore::load(&store).unwrap().contains("## Round 1"));
    }

    #[test]
    fn test_state_missing_then_saved() {
        let store = MemoryStore::new();
        assert_eq!(StateStore::load(&store).unwrap(), None);
        StateStore::save(&store, &TournamentState::fresh(vec!["m".into()])).unwrap();
        assert!(store.state().is_some());
    }
}
