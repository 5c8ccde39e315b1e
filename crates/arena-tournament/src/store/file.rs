use std::path::{Path, PathBuf};

use arena_common_core::{Error, PersonaId, Result};
use arena_common_fs as fs;

use super::{DigestStore, PersonaStore, RoundLogSink, StateStore};
use crate::digest::FeedbackDigest;
use crate::persona::Persona;
use crate::round::RoundResult;
use crate::state::TournamentState;

const JSON_EXT: &str = "json";

/// One `<id>.json` file per persona.
#[derive(Debug, Clone)]
pub struct FilePersonaStore {
    dir: PathBuf,
}

impl FilePersonaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &PersonaId) -> PathBuf {
        self.dir.join(format!("{}.{JSON_EXT}", id.as_str()))
    }
}

impl PersonaStore for FilePersonaStore {
    fn list_all(&self) -> Result<Vec<Persona>> {
        let mut personas = Vec::new();
        for path in fs::list_files_with_extension(&self.dir, JSON_EXT)? {
            if let Some(persona) = fs::read_json_optional::<Persona>(&path)? {
                personas.push(persona);
            }
        }
        Ok(personas)
    }

    fn get(&self, id: &PersonaId) -> Result<Option<Persona>> {
        fs::read_json_optional(self.path_for(id))
    }

    fn save(&self, persona: &Persona) -> Result<()> {
        fs::write_json_atomic(self.path_for(&persona.id), persona)
    }

    fn mark_dead(&self, id: &PersonaId, round: u32) -> Result<bool> {
        let Some(mut persona) = self.get(id)? else {
            return Ok(false);
        };
        persona.died_round = Some(round);
        self.save(&persona)?;
        Ok(true)
    }

    fn exists(&self, id: &PersonaId) -> Result<bool> {
        Ok(self.path_for(id).exists())
    }
}

/// `arena_state.json`.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<Option<TournamentState>> {
        fs::read_json_optional(&self.path)
    }

    fn save(&self, state: &TournamentState) -> Result<()> {
        fs::write_json_atomic(&self.path, state)
    }
}

/// `feedback.md`.
#[derive(Debug, Clone)]
pub struct FileDigestStore {
    path: PathBuf,
}

impl FileDigestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DigestStore for FileDigestStore {
    fn load(&self) -> Result<String> {
        Ok(fs::read_optional(&self.path)?.unwrap_or_default())
    }

    fn append_and_trim(&self, block: &str, max_blocks: usize) -> Result<()> {
        let mut digest = FeedbackDigest::parse(&self.load()?);
        digest.append_and_trim(block, max_blocks);
        fs::write_string_atomic(&self.path, &digest.render())
    }
}

/// `round-NNN.json` files in the logs directory.
#[derive(Debug, Clone)]
pub struct FileRoundLog {
    dir: PathBuf,
}

impl FileRoundLog {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, round_number: u32) -> PathBuf {
        self.dir.join(format!("round-{round_number:03}.{JSON_EXT}"))
    }

    /// Read back a persisted round.
    pub fn read(&self, round_number: u32) -> Result<RoundResult> {
        let path = self.path_for(round_number);
        fs::read_json_optional(&path)?.ok_or_else(|| {
            Error::file_system(format!("no log for round {round_number}"), path, None)
        })
    }
}

impl RoundLogSink for FileRoundLog {
    fn write(&self, round_number: u32, result: &RoundResult) -> Result<()> {
        fs::write_json_atomic(self.path_for(round_number), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::DIGEST_HEADER;
    use crate::round::VoteTally;
    use arena_common_core::Timestamp;
    use tempfile::tempdir;

    fn persona(suffix: &str) -> Persona {
        Persona::new(PersonaId::starter(suffix), suffix.to_uppercase(), "traits", "criteria")
    }

    #[test]
    fn test_persona_store_save_list_get() {
        let dir = tempdir().unwrap();
        let store = FilePersonaStore::new(dir.path().join("personalities"));

        assert!(store.list_all().unwrap().is_empty());

        store.save(&persona("b")).unwrap();
        store.save(&persona("a")).unwrap();

        let ids: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, vec!["starter-a", "starter-b"]);
        assert!(store.exists(&PersonaId::starter("a")).unwrap());
        assert_eq!(store.get(&PersonaId::starter("b")).unwrap(), Some(persona("b")));
        assert!(dir.path().join("personalities/starter-a.json").exists());
    }

    #[test]
    fn test_mark_dead() {
        let dir = tempdir().unwrap();
        let store = FilePersonaStore::new(dir.path());
        store.save(&persona("a")).unwrap();

        assert!(store.mark_dead(&PersonaId::starter("a"), 6).unwrap());
        let dead = store.get(&PersonaId::starter("a")).unwrap().unwrap();
        assert_eq!(dead.died_round, Some(6));
        assert!(!dead.is_alive());

        assert!(!store.mark_dead(&PersonaId::generated(9), 6).unwrap());
    }

    #[test]
    fn test_corrupt_persona_file_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("starter-x.json"), "{ nope").unwrap();
        let store = FilePersonaStore::new(dir.path());
        assert!(matches!(store.list_all(), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_state_store_missing_then_saved() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("data/arena_state.json"));
        assert_eq!(store.load().unwrap(), None);

        let mut state = TournamentState::fresh(vec!["phi4:14b".to_string()]);
        state.current_round = 4;
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
    }

    #[test]
    fn test_digest_store_trims() {
        let dir = tempdir().unwrap();
        let store = FileDigestStore::new(dir.path().join("feedback.md"));
        assert_eq!(store.load().unwrap(), "");

        for n in 1..=7 {
            store
                .append_and_trim(
                    &format!("## Round {n}\nQuestion: q\nVotes: \nVoting record: \n"),
                    5,
                )
                .unwrap();
        }

        let text = store.load().unwrap();
        assert!(text.starts_with(DIGEST_HEADER));
        assert!(!text.contains("## Round 2\n"));
        assert!(text.contains("## Round 3\n"));
        assert_eq!(FeedbackDigest::parse(&text).len(), 5);
    }

    #[test]
    fn test_round_log_zero_padded() {
        let dir = tempdir().unwrap();
        let log = FileRoundLog::new(dir.path());
        let result = RoundResult {
            round_number: 7,
            question: "Why?".to_string(),
            responses: Vec::new(),
            votes: Vec::new(),
            tally: VoteTally::default(),
            timestamp: Timestamp::now(),
        };

        log.write(7, &result).unwrap();
        assert!(dir.path().join("round-007.json").exists());
        assert_eq!(log.read(7).unwrap(), result);
        assert!(log.read(8).is_err());
    }
}
