//! Persona identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

const STARTER_PREFIX: &str = "starter-";
const GENERATED_PREFIX: &str = "gen-";

/// Where a persona came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaKind {
    /// Hand-written persona eligible for tournament bootstrap.
    Starter,
    /// Persona synthesized to replace an eliminated contestant.
    Generated,
    /// Any other id found in the persona store.
    Other,
}

/// Opaque, globally unique persona identifier.
///
/// Ids double as persona file names, so they may not be empty and may not
/// contain path separators.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonaId(String);

impl PersonaId {
    /// Parse and validate an id.
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        if s.contains(['/', '\\']) || s == "." || s == ".." {
            return Err(IdParseError::InvalidCharacters(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Id for the `n`th generated persona (`gen-<n>`).
    pub fn generated(n: usize) -> Self {
        Self(format!("{GENERATED_PREFIX}{n}"))
    }

    /// Id for a starter persona (`starter-<suffix>`).
    pub fn starter(suffix: impl fmt::Display) -> Self {
        Self(format!("{STARTER_PREFIX}{suffix}"))
    }

    /// Classify the id by prefix.
    pub fn kind(&self) -> PersonaKind {
        if self.0.starts_with(STARTER_PREFIX) {
            PersonaKind::Starter
        } else if self.0.starts_with(GENERATED_PREFIX) {
            PersonaKind::Generated
        } else {
            PersonaKind::Other
        }
    }

    pub fn is_starter(&self) -> bool {
        self.kind() == PersonaKind::Starter
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonaId({})", self.0)
    }
}

impl std::str::FromStr for PersonaId {
    type Err = IdParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PersonaId {
    type Error = IdParseError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PersonaId> for String {
    fn from(id: PersonaId) -> Self {
        id.0
    }
}

impl AsRef<str> for PersonaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error parsing an ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    /// The ID is empty.
    #[error("persona id is empty")]
    Empty,
    /// The ID contains characters that cannot appear in a file name.
    #[error("persona id contains invalid characters: {0}")]
    InvalidCharacters(String),
}
