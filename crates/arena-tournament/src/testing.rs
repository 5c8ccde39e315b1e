//! Deterministic gateway and fixtures for exercising the engines offline.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use arena_common_core::PersonaId;

use crate::llm::{GenerationRequest, JudgeGateway, LlmError, RequestPurpose};
use crate::persona::{Contestant, Persona};
use crate::state::TournamentState;

type Responder = Box<dyn FnMut(&GenerationRequest) -> Result<String, LlmError> + Send>;

/// Judge Gateway driven by a closure over each request. Every request is recorded.
pub struct ScriptedGateway {
    responder: Mutex<Responder>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGateway {
    pub fn new<F>(responder: F) -> Self
    where
        F: FnMut(&GenerationRequest) -> Result<String, LlmError> + Send + 'static,
    {
        Self {
            responder: Mutex::new(Box::new(responder)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers with `answer from <id>`, votes for `ballot(voter)` and
    /// synthesizes personas named `Challenger <n>`.
    pub fn with_ballots<B>(mut ballot: B) -> Self
    where
        B: FnMut(&PersonaId) -> String + Send + 'static,
    {
        let mut personas = 0;
        Self::new(move |request| {
            let caller = request.contestant_id.clone();
            Ok(match request.purpose {
                RequestPurpose::Response => format!(
                    "answer from {}",
                    caller.as_ref().map_or("nobody", |id| id.as_str())
                ),
                RequestPurpose::Vote => match caller {
                    Some(voter) => vote_json(&ballot(&voter), "scripted"),
                    None => vote_json("", "no voter"),
                },
                RequestPurpose::Persona => {
                    personas += 1;
                    persona_json(&format!("Challenger {personas}"))
                }
            })
        })
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, purpose: RequestPurpose) -> Vec<GenerationRequest> {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.purpose == purpose)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JudgeGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        self.calls.lock().push(request.clone());
        let mut responder = self.responder.lock();
        (*responder)(&request)
    }
}

pub fn vote_json(target: &str, reasoning: &str) -> String {
    json!({ "vote": target, "reasoning": reasoning }).to_string()
}

pub fn persona_json(name: &str) -> String {
    json!({
        "name": name,
        "persona": format!("{name} argues from first principles."),
        "voting_criteria": "Rewards clarity.",
        "strategy_notes": "Counter the current meta.",
    })
    .to_string()
}

/// `count` starter personas with ids `starter-01`, `starter-02`, ...
pub fn starter_personas(count: usize) -> Vec<Persona> {
    (1..=count)
        .map(|n| {
            Persona::new(
                PersonaId::starter(format!("{n:02}")),
                format!("Starter {n}"),
                format!("Starter {n} has a distinctive voice."),
                "Votes for the most convincing answer.",
            )
        })
        .collect()
}

/// A state whose roster is built from `personas`, all on `model`.
pub fn state_with(personas: &[Persona], model: &str) -> TournamentState {
    let mut state = TournamentState::fresh(vec![model.to_string()]);
    state.contestants = personas
        .iter()
        .map(|p| Contestant::from_persona(p, model))
        .collect();
    state
}
