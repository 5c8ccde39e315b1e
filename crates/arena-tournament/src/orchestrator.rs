//! The `Arena`: bootstrap or resume, then rounds and periodic eliminations
//! with persistence after every phase.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{info, warn};

use arena_common_config::{ArenaConfig, ModelsConfig, TournamentConfig};
use arena_common_log::spans::Timer;

use crate::digest::format_round_block;
use crate::elimination::{check_eligible, EliminationEngine, EliminationOutcome};
use crate::error::{ArenaError, ArenaResult};
use crate::events::{ArenaEvent, EventSink, EVENT_CHANNEL_CAPACITY};
use crate::llm::JudgeGateway;
use crate::persona::{Contestant, Persona};
use crate::random::ArenaRng;
use crate::round::RoundResult;
use crate::round_engine::RoundEngine;
use crate::state::{TournamentState, TournamentSummary};
use crate::store::ArenaStores;

/// Supplies one question per round. `None` ends the run.
#[async_trait]
pub trait QuestionSource: Send {
    async fn next_question(&mut self, round: u32) -> ArenaResult<Option<String>>;
}

/// Questions from a fixed list, consumed in order.
#[derive(Debug, Clone, Default)]
pub struct QueuedQuestions {
    questions: VecDeque<String>,
}

impl QueuedQuestions {
    pub fn new(questions: impl IntoIterator<Item = String>) -> Self {
        Self {
            questions: questions
                .into_iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .collect(),
        }
    }

    /// One question per non-empty line.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string))
    }

    pub fn remaining(&self) -> usize {
        self.questions.len()
    }

    pub fn pop(&mut self) -> Option<String> {
        self.questions.pop_front()
    }
}

#[async_trait]
impl QuestionSource for QueuedQuestions {
    async fn next_question(&mut self, _round: u32) -> ArenaResult<Option<String>> {
        Ok(self.pop())
    }
}

/// Pair personas with models: shuffle the pool, then assign round-robin.
pub fn assign_models(personas: &[Persona], pool: &[String], rng: &mut ArenaRng) -> Vec<Contestant> {
    let mut models = pool.to_vec();
    rng.shuffle(&mut models);
    personas
        .iter()
        .zip(models.iter().cycle())
        .map(|(persona, model)| Contestant::from_persona(persona, model.clone()))
        .collect()
}

/// Everything one call to [`Arena::play_round`] produced.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub result: RoundResult,
    pub elimination: Option<EliminationOutcome>,
}

pub struct Arena {
    tournament: TournamentConfig,
    models: ModelsConfig,
    gateway: Box<dyn JudgeGateway>,
    stores: ArenaStores,
    rng: ArenaRng,
    event_tx: broadcast::Sender<ArenaEvent>,
}

impl Arena {
    pub fn new(config: &ArenaConfig, gateway: Box<dyn JudgeGateway>, stores: ArenaStores) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tournament: config.tournament.clone(),
            models: config.models.clone(),
            gateway,
            stores,
            rng: ArenaRng::from_seed(config.tournament.seed),
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ArenaEvent> {
        self.event_tx.subscribe()
    }

    pub fn tournament_config(&self) -> &TournamentConfig {
        &self.tournament
    }

    fn events(&self) -> EventSink {
        EventSink::new(self.event_tx.clone())
    }

    fn model_pool(&self) -> ArenaResult<Vec<String>> {
        let pool: Vec<String> = self
            .models
            .pool
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if pool.is_empty() {
            return Err(ArenaError::EmptyModelPool);
        }
        Ok(pool)
    }

    /// Persisted state, if any.
    pub fn load_state(&self) -> ArenaResult<Option<TournamentState>> {
        Ok(self.stores.state.load()?)
    }

    /// Resume from persisted state when it has contestants, otherwise start fresh.
    /// The flag is `true` on resume.
    pub fn load_or_bootstrap(&mut self) -> ArenaResult<(TournamentState, bool)> {
        match self.stores.state.load()? {
            Some(mut state) if !state.is_empty() => {
                if state.models.is_empty() {
                    state.models = self.model_pool()?;
                }
                state.check_consistency()?;
                info!(
                    round = state.current_round,
                    contestants = state.contestants.len(),
                    "resuming tournament"
                );
                Ok((state, true))
            }
            _ => Ok((self.bootstrap()?, false)),
        }
    }

    /// Start a new tournament from the starter personas.
    pub fn bootstrap(&mut self) -> ArenaResult<TournamentState> {
        let required = self.tournament.starter_count;
        let mut starters: Vec<Persona> = self
            .stores
            .personas
            .list_all()?
            .into_iter()
            .filter(|p| p.id.is_starter())
            .collect();
        if starters.len() < required {
            return Err(ArenaError::InsufficientStarters {
                required,
                found: starters.len(),
            });
        }
        starters.sort_by(|a, b| a.id.cmp(&b.id));
        starters.truncate(required);

        let pool = self.model_pool()?;
        let contestants = assign_models(&starters, &pool, &mut self.rng);

        for (persona, contestant) in starters.iter_mut().zip(&contestants) {
            persona.died_round = None;
            persona.model = Some(contestant.model.clone());
            self.stores.personas.save(persona)?;
            info!(
                id = %contestant.id,
                name = %contestant.name,
                model = %contestant.model,
                "starter assigned"
            );
        }

        let mut state = TournamentState::fresh(pool);
        state.contestants = contestants;
        self.stores.state.save(&state)?;
        Ok(state)
    }

    /// Play one round, persist it, and run the elimination phase when the
    /// round falls on the cadence.
    pub async fn play_round(
        &mut self,
        state: &mut TournamentState,
        question: &str,
    ) -> ArenaResult<RoundReport> {
        let timer = Timer::start("round");
        let events = self.events();
        let digest = self.stores.digest.load()?;

        let result = RoundEngine::new(&*self.gateway)
            .drought_limit(self.tournament.drought_limit)
            .max_vote_retries(self.tournament.max_vote_retries)
            .with_events(events.clone())
            .run_round(state, question, &digest, &mut self.rng)
            .await?;

        let block = format_round_block(&result, &state.contestants);
        self.stores
            .digest
            .append_and_trim(&block, self.tournament.digest_window)?;
        self.stores.round_log.write(result.round_number, &result)?;

        let limit = self.tournament.drought_limit;
        for contestant in &state.contestants {
            if contestant.drought > 0 && contestant.drought + 1 >= limit {
                warn!(id = %contestant.id, drought = contestant.drought, "contestant in drought");
                events.emit(ArenaEvent::DroughtWarning {
                    contestant_name: contestant.name.clone(),
                    drought: contestant.drought,
                    limit,
                });
            }
        }
        self.stores.state.save(state)?;

        let mut elimination = None;
        if self.on_cadence(state) {
            elimination = Some(self.eliminate_and_replace(state, &events).await?);
        }

        let elapsed_ms = timer.finish();
        info!(round = result.round_number, elapsed_ms, "round persisted");
        events.emit(ArenaEvent::RoundComplete {
            round: result.round_number,
        });
        Ok(RoundReport { result, elimination })
    }

    fn on_cadence(&self, state: &TournamentState) -> bool {
        state.current_round > 0 && state.current_round % self.tournament.elimination_interval == 0
    }

    /// Run the elimination phase against the current digest and save the result.
    async fn eliminate_and_replace(
        &mut self,
        state: &mut TournamentState,
        events: &EventSink,
    ) -> ArenaResult<EliminationOutcome> {
        let digest = self.stores.digest.load()?;
        let outcome = EliminationEngine::new(
            &*self.gateway,
            &*self.stores.personas,
            self.models.meta_model.clone(),
        )
        .drought_limit(self.tournament.drought_limit)
        .max_generation_retries(self.tournament.max_generation_retries)
        .with_events(events.clone())
        .run_elimination_phase(state, &digest, &mut self.rng)
        .await?;
        self.stores.state.save(state)?;
        Ok(outcome)
    }

    /// Finish an elimination phase that was cut short on the last persisted
    /// round. The round itself was saved before the phase started, so anyone
    /// still eligible on a cadence round is owed an elimination.
    pub async fn resume_pending_elimination(
        &mut self,
        state: &mut TournamentState,
    ) -> ArenaResult<Option<EliminationOutcome>> {
        if !self.on_cadence(state) {
            return Ok(None);
        }
        let pending = check_eligible(state, self.tournament.drought_limit);
        if pending.is_empty() {
            return Ok(None);
        }

        warn!(
            round = state.current_round,
            eligible = pending.len(),
            "completing interrupted elimination phase"
        );
        let events = self.events();
        self.eliminate_and_replace(state, &events).await.map(Some)
    }

    /// Run until the total-round target is reached or the questions run out.
    pub async fn run<Q>(&mut self, questions: &mut Q) -> ArenaResult<TournamentSummary>
    where
        Q: QuestionSource + ?Sized,
    {
        let (mut state, resumed) = self.load_or_bootstrap()?;
        let events = self.events();
        events.emit(ArenaEvent::TournamentStarted {
            resumed,
            round: state.current_round,
            contestants: state.contestants.len(),
        });
        if resumed {
            self.resume_pending_elimination(&mut state).await?;
        }

        while state.current_round < self.tournament.total_rounds {
            let Some(question) = questions.next_question(state.current_round + 1).await? else {
                info!(round = state.current_round, "no more questions");
                break;
            };
            let question = question.trim();
            if question.is_empty() {
                continue;
            }
            self.play_round(&mut state, question).await?;
        }

        events.emit(ArenaEvent::TournamentComplete {
            rounds_played: state.current_round,
        });
        Ok(state.summary())
    }
}
