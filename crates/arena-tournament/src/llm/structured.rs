//! Typed parsing of schema-constrained gateway replies.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

const EXCERPT_LEN: usize = 120;

/// Why a structured reply was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuredOutputError {
    #[error("reply is not valid JSON ({message}): {excerpt}")]
    InvalidJson { message: String, excerpt: String },

    #[error("reply is JSON but not an object")]
    NotAnObject,

    #[error("required field `{0}` is missing")]
    MissingField(&'static str),

    #[error("field `{field}` should be a string, found {found}")]
    WrongType { field: &'static str, found: &'static str },

    #[error("field `{0}` is blank")]
    BlankField(&'static str),
}

/// A reply shape requested from the gateway through a JSON schema.
///
/// Every required field is a string. Validation happens at the boundary so
/// engines only ever see fully populated values.
pub trait StructuredOutput: DeserializeOwned {
    const REQUIRED_FIELDS: &'static [&'static str];

    /// JSON schema passed to the gateway.
    fn schema() -> Value {
        let properties: Map<String, Value> = Self::REQUIRED_FIELDS
            .iter()
            .map(|field| (field.to_string(), json!({ "type": "string" })))
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": Self::REQUIRED_FIELDS,
        })
    }

    /// Checks beyond field presence.
    fn validate(&self) -> Result<(), StructuredOutputError> {
        Ok(())
    }

    fn parse(raw: &str) -> Result<Self, StructuredOutputError> {
        parse_structured(raw)
    }
}

/// Parse and validate a structured reply.
pub fn parse_structured<T: StructuredOutput>(raw: &str) -> Result<T, StructuredOutputError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| StructuredOutputError::InvalidJson {
        message: e.to_string(),
        excerpt: excerpt(raw),
    })?;

    let object = value.as_object().ok_or(StructuredOutputError::NotAnObject)?;
    for &field in T::REQUIRED_FIELDS {
        match object.get(field) {
            None | Some(Value::Null) => return Err(StructuredOutputError::MissingField(field)),
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(StructuredOutputError::WrongType {
                    field,
                    found: json_kind(other),
                })
            }
        }
    }

    let parsed: T = serde_json::from_value(value).map_err(|e| StructuredOutputError::InvalidJson {
        message: e.to_string(),
        excerpt: excerpt(raw),
    })?;
    parsed.validate()?;
    Ok(parsed)
}

// Models sometimes wrap JSON in a markdown fence even in format mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn excerpt(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A contestant's ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteChoice {
    /// Id or display name of the chosen response's author.
    pub vote: String,
    pub reasoning: String,
}

impl StructuredOutput for VoteChoice {
    const REQUIRED_FIELDS: &'static [&'static str] = &["vote", "reasoning"];
}

/// A synthesized replacement persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaDraft {
    pub name: String,
    /// Trait description.
    pub persona: String,
    pub voting_criteria: String,
    /// Why this persona should beat the survivors.
    pub strategy_notes: String,
}

impl StructuredOutput for PersonaDraft {
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["name", "persona", "voting_criteria", "strategy_notes"];

    fn validate(&self) -> Result<(), StructuredOutputError> {
        for (field, value) in [
            ("name", &self.name),
            ("persona", &self.persona),
            ("voting_criteria", &self.voting_criteria),
        ] {
            if value.trim().is_empty() {
                return Err(StructuredOutputError::BlankField(field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_choice_parses() {
        let vote =
            VoteChoice::parse(r#"{"vote": "starter-2", "reasoning": "Sharp and brief."}"#).unwrap();
        assert_eq!(vote.vote, "starter-2");
        assert_eq!(vote.reasoning, "Sharp and brief.");
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let raw = "```json\n{\"vote\": \"gen-4\", \"reasoning\": \"ok\"}\n```";
        assert_eq!(VoteChoice::parse(raw).unwrap().vote, "gen-4");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            VoteChoice::parse("I vote for The Skeptic"),
            Err(StructuredOutputError::InvalidJson { excerpt, .. })
                if excerpt == "I vote for The Skeptic"
        ));
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(
            VoteChoice::parse(r#"["starter-1"]"#),
            Err(StructuredOutputError::NotAnObject)
        );
    }

    #[test]
    fn test_missing_field() {
        assert_eq!(
            VoteChoice::parse(r#"{"vote": "starter-1"}"#),
            Err(StructuredOutputError::MissingField("reasoning"))
        );
        assert_eq!(
            VoteChoice::parse(r#"{"vote": null, "reasoning": "x"}"#),
            Err(StructuredOutputError::MissingField("vote"))
        );
    }

    #[test]
    fn test_wrong_type() {
        assert_eq!(
            VoteChoice::parse(r#"{"vote": 3, "reasoning": "x"}"#),
            Err(StructuredOutputError::WrongType {
                field: "vote",
                found: "number"
            })
        );
    }

    #[test]
    fn test_persona_draft_rejects_blank_name() {
        let raw = r#"{"name": " ", "persona": "p", "voting_criteria": "c", "strategy_notes": ""}"#;
        assert_eq!(
            PersonaDraft::parse(raw),
            Err(StructuredOutputError::BlankField("name"))
        );
    }

    #[test]
    fn test_persona_draft_allows_blank_strategy_notes() {
        let raw = r#"{
            "name": "The Cartographer",
            "persona": "Maps every argument.",
            "voting_criteria": "Structure.",
            "strategy_notes": ""
        }"#;
        let draft = PersonaDraft::parse(raw).unwrap();
        assert_eq!(draft.name, "The Cartographer");
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let schema = PersonaDraft::schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["required"],
            json!(["name", "persona", "voting_criteria", "strategy_notes"])
        );
        assert_eq!(schema["properties"]["voting_criteria"]["type"], "string");
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let long = "x".repeat(500);
        let err = VoteChoice::parse(&long).unwrap_err();
        match err {
            StructuredOutputError::InvalidJson { excerpt, .. } => {
                assert_eq!(excerpt.len(), EXCERPT_LEN + 3)
            }
            other => panic!("Expected InvalidJson, got {other:?}"),
        }
    }
}
