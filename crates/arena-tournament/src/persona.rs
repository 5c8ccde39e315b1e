//! Personas and the contestants built from them.

use serde::{Deserialize, Serialize};

use arena_common_core::PersonaId;

/// Durable character definition. Outlives elimination; only ever marked dead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub name: String,
    /// Free-text trait description.
    #[serde(rename = "persona")]
    pub traits: String,
    pub voting_criteria: String,
    #[serde(default = "first_generation")]
    pub generation: u32,
    #[serde(default)]
    pub parent_id: Option<PersonaId>,
    #[serde(default)]
    pub born_round: u32,
    #[serde(default)]
    pub died_round: Option<u32>,
    /// Model assigned when the persona last entered the arena.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn first_generation() -> u32 {
    1
}

impl Persona {
    pub fn new(
        id: PersonaId,
        name: impl Into<String>,
        traits: impl Into<String>,
        voting_criteria: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            traits: traits.into(),
            voting_criteria: voting_criteria.into(),
            generation: first_generation(),
            parent_id: None,
            born_round: 0,
            died_round: None,
            model: None,
        }
    }

    pub fn generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    pub fn born_in(mut self, round: u32) -> Self {
        self.born_round = round;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn is_alive(&self) -> bool {
        self.died_round.is_none()
    }
}

/// An active competitor: a persona plus live stats and its assigned model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: PersonaId,
    pub name: String,
    pub model: String,
    pub traits: String,
    pub voting_criteria: String,
    pub generation: u32,
    #[serde(default)]
    pub total_votes_received: u32,
    /// Consecutive rounds without a vote.
    #[serde(default)]
    pub drought: u32,
    #[serde(default)]
    pub rounds_participated: u32,
}

impl Contestant {
    /// New contestant with zeroed stats.
    pub fn from_persona(persona: &Persona, model: impl Into<String>) -> Self {
        Self {
            id: persona.id.clone(),
            name: persona.name.clone(),
            model: model.into(),
            traits: persona.traits.clone(),
            voting_criteria: persona.voting_criteria.clone(),
            generation: persona.generation,
            total_votes_received: 0,
            drought: 0,
            rounds_participated: 0,
        }
    }

    /// Apply one round's vote count.
    pub fn record_round(&mut self, votes: u32) {
        self.rounds_participated += 1;
        self.total_votes_received += votes;
        if votes > 0 {
            self.drought = 0;
        } else {
            self.drought += 1;
        }
    }

    /// How the contestant is shown to other contestants: `name (id)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skeptic() -> Persona {
        Persona::new(
            PersonaId::starter("skeptic"),
            "The Skeptic",
            "Doubts everything.",
            "Rewards evidence.",
        )
    }

    #[test]
    fn test_persona_file_format() {
        let value = json!({
            "id": "starter-skeptic",
            "name": "The Skeptic",
            "persona": "Doubts everything.",
            "voting_criteria": "Rewards evidence.",
            "generation": 1,
            "parent_id": null,
            "born_round": 0,
            "died_round": null
        });
        let persona: Persona = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(persona, skeptic());
        assert_eq!(serde_json::to_value(&persona).unwrap(), value);
    }

    #[test]
    fn test_persona_minimal_file_gets_defaults() {
        let persona: Persona = serde_json::from_value(json!({
            "id": "starter-poet",
            "name": "The Poet",
            "persona": "Speaks in verse.",
            "voting_criteria": "Beauty."
        }))
        .unwrap();
        assert_eq!(persona.generation, 1);
        assert!(persona.is_alive());
        assert!(persona.model.is_none());
    }

    #[test]
    fn test_contestant_from_persona_has_zero_stats() {
        let contestant = Contestant::from_persona(&skeptic().generation(3), "qwen3:8b");
        assert_eq!(contestant.id.as_str(), "starter-skeptic");
        assert_eq!(contestant.model, "qwen3:8b");
        assert_eq!(contestant.generation, 3);
        assert_eq!(contestant.total_votes_received, 0);
        assert_eq!(contestant.drought, 0);
        assert_eq!(contestant.rounds_participated, 0);
    }

    #[test]
    fn test_record_round_updates_stats() {
        let mut contestant = Contestant::from_persona(&skeptic(), "mistral:7b");

        contestant.record_round(0);
        contestant.record_round(0);
        assert_eq!(contestant.drought, 2);

        contestant.record_round(2);
        assert_eq!(contestant.drought, 0);
        assert_eq!(contestant.total_votes_received, 2);
        assert_eq!(contestant.rounds_participated, 3);
    }

    #[test]
    fn test_label() {
        let contestant = Contestant::from_persona(&skeptic(), "mistral:7b");
        assert_eq!(contestant.label(), "The Skeptic (starter-skeptic)");
    }
}
