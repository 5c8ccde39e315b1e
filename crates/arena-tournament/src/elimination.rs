//! Elimination Engine: drought checks, removal and persona regeneration.

use tracing::{debug, info, warn, Instrument};

use arena_common_core::PersonaId;
use arena_common_log::spans::{elimination_span, gateway_span};

use crate::error::{ArenaError, ArenaResult};
use crate::events::{ArenaEvent, EventSink};
use crate::llm::{GenerationRequest, JudgeGateway, PersonaDraft, RequestPurpose, StructuredOutput};
use crate::persona::{Contestant, Persona};
use crate::prompts;
use crate::random::ArenaRng;
use crate::state::{EliminationRecord, TournamentState};
use crate::store::PersonaStore;

const DEFAULT_DROUGHT_LIMIT: u32 = 3;
const DEFAULT_MAX_GENERATION_RETRIES: u32 = 2;

/// Contestants whose drought reached `drought_limit`, in roster order.
pub fn check_eligible(state: &TournamentState, drought_limit: u32) -> Vec<Contestant> {
    state.eligible_for_elimination(drought_limit)
}

/// Generation number for a new persona: one past the freshest survivor.
pub fn next_generation(survivors: &[Contestant]) -> u32 {
    survivors
        .iter()
        .map(|c| c.generation)
        .max()
        .map_or(1, |g| g + 1)
}

/// A freshly synthesized contestant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub contestant: Contestant,
    pub strategy_notes: String,
}

/// A synthesized persona that has not been written to the store yet.
#[derive(Debug)]
struct PendingReplacement {
    persona: Persona,
    model: String,
    strategy_notes: String,
}

/// What one elimination phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EliminationOutcome {
    pub eliminated: Vec<EliminationRecord>,
    pub replacements: Vec<Replacement>,
}

impl EliminationOutcome {
    pub fn is_empty(&self) -> bool {
        self.eliminated.is_empty()
    }
}

/// Removes drought-stricken contestants and synthesizes their replacements.
pub struct EliminationEngine<'a> {
    gateway: &'a dyn JudgeGateway,
    personas: &'a dyn PersonaStore,
    meta_model: String,
    drought_limit: u32,
    max_generation_retries: u32,
    events: EventSink,
}

impl<'a> EliminationEngine<'a> {
    /// Engine that synthesizes personas with `meta_model` and records deaths
    /// and births in `personas`.
    pub fn new(
        gateway: &'a dyn JudgeGateway,
        personas: &'a dyn PersonaStore,
        meta_model: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            personas,
            meta_model: meta_model.into(),
            drought_limit: DEFAULT_DROUGHT_LIMIT,
            max_generation_retries: DEFAULT_MAX_GENERATION_RETRIES,
            events: EventSink::disabled(),
        }
    }

    /// Drought at which a contestant becomes eligible.
    pub fn drought_limit(mut self, limit: u32) -> Self {
        self.drought_limit = limit;
        self
    }

    /// Corrective attempts after malformed persona output.
    pub fn max_generation_retries(mut self, retries: u32) -> Self {
        self.max_generation_retries = retries;
        self
    }

    /// Publish eliminations and replacements to `events`.
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Remove `eligible` from the roster in input order, recording each
    /// removal and marking the persona dead at the current round.
    pub fn eliminate(
        &self,
        state: &mut TournamentState,
        eligible: &[Contestant],
    ) -> ArenaResult<Vec<EliminationRecord>> {
        let records = remove_from_roster(state, eligible);

        for record in &records {
            if !self.personas.mark_dead(&record.contestant_id, record.eliminated_round)? {
                warn!(id = %record.contestant_id, "no persona record to mark dead");
            }
            info!(
                id = %record.contestant_id,
                name = %record.contestant_name,
                rounds_survived = record.rounds_survived,
                "contestant eliminated"
            );
            self.events.emit(ArenaEvent::Eliminated {
                record: record.clone(),
            });
        }

        Ok(records)
    }

    /// Synthesize and persist the replacement for `batch[index]`.
    ///
    /// `state` must already reflect the whole batch's removals. Its roster is
    /// the survivor set the new persona is conditioned on and its generation
    /// is computed from.
    pub async fn generate_replacement(
        &self,
        state: &TournamentState,
        batch: &[EliminationRecord],
        index: usize,
        digest: &str,
        rng: &mut ArenaRng,
    ) -> ArenaResult<Replacement> {
        let pending = self.draft_replacement(state, batch, index, digest, rng, &[]).await?;
        self.commit_replacement(pending)
    }

    /// Eliminate every eligible contestant, then add one replacement per
    /// elimination. A phase with nobody eligible changes nothing.
    ///
    /// Every replacement is synthesized against the post-removal survivors
    /// before anything is written, so a failed gateway call leaves `state`
    /// and the persona store as they were and the phase can simply be run
    /// again.
    pub async fn run_elimination_phase(
        &self,
        state: &mut TournamentState,
        digest: &str,
        rng: &mut ArenaRng,
    ) -> ArenaResult<EliminationOutcome> {
        let eligible = check_eligible(state, self.drought_limit);
        if eligible.is_empty() {
            debug!(round = state.current_round, "no contestants eligible for elimination");
            return Ok(EliminationOutcome::default());
        }

        let span = elimination_span(state.current_round);
        let mut survivors = state.clone();
        let batch = remove_from_roster(&mut survivors, &eligible);

        let mut pending: Vec<PendingReplacement> = Vec::with_capacity(batch.len());
        for index in 0..batch.len() {
            let reserved: Vec<PersonaId> = pending.iter().map(|p| p.persona.id.clone()).collect();
            let draft = self
                .draft_replacement(&survivors, &batch, index, digest, rng, &reserved)
                .instrument(span.clone())
                .await?;
            pending.push(draft);
        }

        let eliminated = self.eliminate(state, &eligible)?;
        let mut replacements = Vec::with_capacity(pending.len());
        for draft in pending {
            let replacement = self.commit_replacement(draft)?;
            state.contestants.push(replacement.contestant.clone());
            replacements.push(replacement);
        }

        Ok(EliminationOutcome {
            eliminated,
            replacements,
        })
    }

    /// A new persona for `batch[index]`, not yet saved. Ids in `reserved`
    /// are treated as taken.
    async fn draft_replacement(
        &self,
        survivors: &TournamentState,
        batch: &[EliminationRecord],
        index: usize,
        digest: &str,
        rng: &mut ArenaRng,
        reserved: &[PersonaId],
    ) -> ArenaResult<PendingReplacement> {
        let model = rng
            .choose(&survivors.models)
            .cloned()
            .ok_or(ArenaError::EmptyModelPool)?;

        let draft = self.synthesize(&survivors.contestants, batch, digest).await?;
        let id = self.next_persona_id(survivors, batch.len(), index, reserved)?;

        let persona = Persona::new(id, draft.name.trim(), draft.persona, draft.voting_criteria)
            .generation(next_generation(&survivors.contestants))
            .born_in(survivors.current_round)
            .with_model(model.clone());
        Ok(PendingReplacement {
            persona,
            model,
            strategy_notes: draft.strategy_notes,
        })
    }

    fn commit_replacement(&self, pending: PendingReplacement) -> ArenaResult<Replacement> {
        let PendingReplacement {
            persona,
            model,
            strategy_notes,
        } = pending;
        self.personas.save(&persona)?;

        let contestant = Contestant::from_persona(&persona, model);
        info!(
            id = %contestant.id,
            name = %contestant.name,
            model = %contestant.model,
            generation = contestant.generation,
            "replacement created"
        );
        self.events.emit(ArenaEvent::ReplacementCreated {
            id: contestant.id.clone(),
            name: contestant.name.clone(),
            model: contestant.model.clone(),
            generation: contestant.generation,
            strategy_notes: strategy_notes.clone(),
        });

        Ok(Replacement {
            contestant,
            strategy_notes,
        })
    }

    async fn synthesize(
        &self,
        survivors: &[Contestant],
        batch: &[EliminationRecord],
        digest: &str,
    ) -> ArenaResult<PersonaDraft> {
        let base_prompt = prompts::persona_prompt(survivors, batch, digest);
        let mut prompt = base_prompt.clone();
        let attempts = self.max_generation_retries + 1;
        let mut attempt = 1;

        loop {
            let request =
                GenerationRequest::new(&self.meta_model, prompt.clone(), RequestPurpose::Persona)
                    .with_schema(PersonaDraft::schema());
            let raw = self
                .gateway
                .generate(request)
                .instrument(gateway_span(&self.meta_model, RequestPurpose::Persona.as_str()))
                .await?;

            match PersonaDraft::parse(&raw) {
                Ok(draft) => return Ok(draft),
                Err(e) if attempt >= attempts => return Err(e.into()),
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "malformed persona output");
                    prompt = prompts::persona_retry_prompt(&base_prompt, &e.to_string());
                    attempt += 1;
                }
            }
        }
    }

    fn next_persona_id(
        &self,
        state: &TournamentState,
        batch_len: usize,
        index: usize,
        reserved: &[PersonaId],
    ) -> ArenaResult<PersonaId> {
        let mut n = state.elimination_history.len().saturating_sub(batch_len) + index + 1;
        loop {
            let id = PersonaId::generated(n);
            if !reserved.contains(&id) && !state.is_active(&id) && !self.personas.exists(&id)? {
                return Ok(id);
            }
            n += 1;
        }
    }
}

/// Take `eligible` off the roster and append their records to the history.
/// Contestants no longer on the roster are skipped.
fn remove_from_roster(
    state: &mut TournamentState,
    eligible: &[Contestant],
) -> Vec<EliminationRecord> {
    let round = state.current_round;
    let mut records = Vec::with_capacity(eligible.len());

    for candidate in eligible {
        let Some(active) = state.contestant(&candidate.id) else {
            warn!(id = %candidate.id, "skipping elimination of inactive contestant");
            continue;
        };
        let record = EliminationRecord::for_contestant(active, round);
        state.contestants.retain(|c| c.id != record.contestant_id);
        state.elimination_history.push(record.clone());
        records.push(record);
    }

    records
}
