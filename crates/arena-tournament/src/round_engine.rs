//! Round Engine: responses, votes with validation, tally and stat update.

use std::fmt;

use tracing::{debug, info, warn, Instrument};

use arena_common_log::spans::{contestant_span, gateway_span, round_span};

use crate::error::{ArenaError, ArenaResult};
use crate::events::{ArenaEvent, EventSink};
use crate::llm::{GenerationRequest, JudgeGateway, RequestPurpose, StructuredOutput, VoteChoice};
use crate::persona::Contestant;
use crate::prompts;
use crate::random::ArenaRng;
use crate::round::{Response, RoundResult, Vote, VoteTally, FALLBACK_REASONING};
use crate::state::TournamentState;
use arena_common_core::Timestamp;

const DEFAULT_DROUGHT_LIMIT: u32 = 3;
const DEFAULT_MAX_VOTE_RETRIES: u32 = 2;

/// Why a ballot's target was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetProblem {
    SelfVote,
    Unknown,
    /// The display name matches several candidates.
    Ambiguous(usize),
}

impl fmt::Display for TargetProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfVote => f.write_str("you cannot vote for yourself"),
            Self::Unknown => f.write_str("no such contestant among the valid choices"),
            Self::Ambiguous(n) => write!(f, "{n} contestants share that name, answer with the id"),
        }
    }
}

/// Match a reply against the candidates: by id, then by `name (id)` label,
/// then by display name when that name is unique among the candidates.
pub fn resolve_target<'r>(
    choice: &str,
    voter: &Contestant,
    candidates: &[&'r Response],
) -> Result<&'r Response, TargetProblem> {
    let choice = choice.trim().trim_matches(|c: char| c == '"' || c == '[' || c == ']').trim();

    if let Some(found) = candidates
        .iter()
        .copied()
        .find(|r| r.contestant_id.as_str() == choice)
    {
        return Ok(found);
    }
    if let Some(found) = candidates
        .iter()
        .copied()
        .find(|r| format!("{} ({})", r.contestant_name, r.contestant_id) == choice)
    {
        return Ok(found);
    }

    let by_name: Vec<&'r Response> = candidates
        .iter()
        .copied()
        .filter(|r| r.contestant_name.trim().eq_ignore_ascii_case(choice))
        .collect();
    match by_name.as_slice() {
        [only] => Ok(*only),
        [] if voter.id.as_str() == choice || voter.name.trim().eq_ignore_ascii_case(choice) => {
            Err(TargetProblem::SelfVote)
        }
        [] => Err(TargetProblem::Unknown),
        many => Err(TargetProblem::Ambiguous(many.len())),
    }
}

/// Executes one round against an explicit state value.
pub struct RoundEngine<'a> {
    gateway: &'a dyn JudgeGateway,
    drought_limit: u32,
    max_vote_retries: u32,
    events: EventSink,
}

impl<'a> RoundEngine<'a> {
    /// Engine with the default drought limit and vote retries, publishing no events.
    pub fn new(gateway: &'a dyn JudgeGateway) -> Self {
        Self {
            gateway,
            drought_limit: DEFAULT_DROUGHT_LIMIT,
            max_vote_retries: DEFAULT_MAX_VOTE_RETRIES,
            events: EventSink::disabled(),
        }
    }

    /// Drought limit quoted to contestants in the response prompt.
    pub fn drought_limit(mut self, limit: u32) -> Self {
        self.drought_limit = limit;
        self
    }

    /// Corrective attempts after the first invalid ballot.
    pub fn max_vote_retries(mut self, retries: u32) -> Self {
        self.max_vote_retries = retries;
        self
    }

    /// Publish round progress to `events`.
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Run one round, mutating `state` in place.
    ///
    /// The round counter is incremented before any gateway call. If the
    /// gateway fails the round is abandoned and the counter restored, so a
    /// failed call never leaves half-applied stats behind.
    pub async fn run_round(
        &self,
        state: &mut TournamentState,
        question: &str,
        digest: &str,
        rng: &mut ArenaRng,
    ) -> ArenaResult<RoundResult> {
        if state.contestants.len() < 2 {
            return Err(ArenaError::NotEnoughContestants {
                found: state.contestants.len(),
            });
        }

        state.current_round += 1;
        let round = state.current_round;

        let played = self
            .play(state, round, question, digest, rng)
            .instrument(round_span(round))
            .await;

        let result = match played {
            Ok(result) => result,
            Err(e) => {
                state.current_round -= 1;
                return Err(e);
            }
        };

        for contestant in state.contestants.iter_mut() {
            contestant.record_round(result.tally.get(&contestant.id));
        }

        info!(
            round,
            votes = result.votes.len(),
            fallbacks = result.fallback_votes(),
            "round complete"
        );
        self.events.emit(ArenaEvent::Tally {
            round,
            standings: state.standings(),
        });

        Ok(result)
    }

    async fn play(
        &self,
        state: &TournamentState,
        round: u32,
        question: &str,
        digest: &str,
        rng: &mut ArenaRng,
    ) -> ArenaResult<RoundResult> {
        info!(round, contestants = state.contestants.len(), "round started");
        self.events.emit(ArenaEvent::RoundStarted {
            round,
            question: question.to_string(),
        });

        // every response is in before the first ballot is requested
        let mut responses = Vec::with_capacity(state.contestants.len());
        for contestant in &state.contestants {
            let response = self
                .collect_response(contestant, question, digest)
                .instrument(contestant_span(contestant.id.as_str(), &contestant.name))
                .await?;
            self.events.emit(ArenaEvent::ResponseReceived {
                round,
                contestant_id: response.contestant_id.clone(),
                contestant_name: response.contestant_name.clone(),
                model: response.model.clone(),
                content: response.content.clone(),
            });
            responses.push(response);
        }

        let mut votes = Vec::with_capacity(state.contestants.len());
        for voter in &state.contestants {
            let (vote, attempts) = self
                .collect_vote(voter, question, &responses, digest, rng)
                .instrument(contestant_span(voter.id.as_str(), &voter.name))
                .await?;
            self.events.emit(ArenaEvent::VoteCast {
                round,
                voter_name: vote.voter_name.clone(),
                target_name: vote.target_name.clone(),
                reasoning: vote.reasoning.clone(),
                attempts,
                fallback: vote.fallback,
            });
            votes.push(vote);
        }

        let tally = VoteTally::from_votes(&votes);
        Ok(RoundResult {
            round_number: round,
            question: question.to_string(),
            responses,
            votes,
            tally,
            timestamp: Timestamp::now(),
        })
    }

    async fn collect_response(
        &self,
        contestant: &Contestant,
        question: &str,
        digest: &str,
    ) -> ArenaResult<Response> {
        let request = GenerationRequest::new(&contestant.model, question, RequestPurpose::Response)
            .with_system(prompts::response_system_prompt(contestant, digest, self.drought_limit))
            .on_behalf_of(&contestant.id);

        let content = self
            .gateway
            .generate(request)
            .instrument(gateway_span(&contestant.model, RequestPurpose::Response.as_str()))
            .await?;
        debug!(chars = content.len(), "response received");

        Ok(Response {
            contestant_id: contestant.id.clone(),
            contestant_name: contestant.name.clone(),
            model: contestant.model.clone(),
            content,
            timestamp: Timestamp::now(),
        })
    }

    /// Ballot for `voter` plus the number of gateway attempts it took.
    async fn collect_vote(
        &self,
        voter: &Contestant,
        question: &str,
        responses: &[Response],
        digest: &str,
        rng: &mut ArenaRng,
    ) -> ArenaResult<(Vote, u32)> {
        let candidates: Vec<&Response> = responses
            .iter()
            .filter(|r| r.contestant_id != voter.id)
            .collect();
        if candidates.is_empty() {
            return Err(ArenaError::InconsistentState(format!(
                "{} has nobody to vote for",
                voter.id
            )));
        }

        let system_prompt = prompts::vote_system_prompt(voter, digest, &candidates);
        let mut user_prompt = prompts::vote_user_prompt(question, &candidates);
        let attempts = self.max_vote_retries + 1;

        for attempt in 1..=attempts {
            let request =
                GenerationRequest::new(&voter.model, user_prompt.clone(), RequestPurpose::Vote)
                .with_system(system_prompt.clone())
                .with_schema(VoteChoice::schema())
                .on_behalf_of(&voter.id);

            let raw = self
                .gateway
                .generate(request)
                .instrument(gateway_span(&voter.model, RequestPurpose::Vote.as_str()))
                .await?;

            let (previous, problem) = match VoteChoice::parse(&raw) {
                Ok(choice) => match resolve_target(&choice.vote, voter, &candidates) {
                    Ok(target) => {
                        let vote = ballot(voter, target, Some(choice.reasoning), false);
                        return Ok((vote, attempt));
                    }
                    Err(problem) => (choice.vote, problem.to_string()),
                },
                Err(e) => (raw.trim().chars().take(60).collect::<String>(), e.to_string()),
            };

            warn!(attempt, attempts, vote = %previous, %problem, "invalid vote");
            user_prompt = prompts::vote_retry_prompt(question, &candidates, &previous, &problem);
        }

        let index = rng.index(candidates.len()).unwrap_or(0);
        let target = candidates[index];
        warn!(target = %target.contestant_id, "vote retries exhausted, using random fallback");
        Ok((
            ballot(voter, target, Some(FALLBACK_REASONING.to_string()), true),
            attempts,
        ))
    }
}

fn ballot(
    voter: &Contestant,
    target: &Response,
    reasoning: Option<String>,
    fallback: bool,
) -> Vote {
    Vote {
        voter_id: voter.id.clone(),
        voter_name: voter.name.clone(),
        target_id: target.contestant_id.clone(),
        target_name: target.contestant_name.clone(),
        reasoning,
        fallback,
    }
}
