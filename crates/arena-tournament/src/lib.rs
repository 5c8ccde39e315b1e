//! Arena Tournament - multi-round debate tournament among model-backed personas.
//!
//! Each round every active contestant answers a shared question and then votes
//! for another contestant's answer. Contestants without votes for several
//! consecutive rounds are eliminated and replaced by freshly synthesized
//! personas conditioned on the survivors and the recent feedback digest.

pub mod digest;
pub mod elimination;
pub mod error;
pub mod events;
pub mod llm;
pub mod orchestrator;
pub mod persona;
pub mod prompts;
pub mod random;
pub mod round;
pub mod round_engine;
pub mod state;
pub mod store;
pub mod testing;

// Re-export common types
pub use digest::{format_round_block, FeedbackDigest};
pub use elimination::{check_eligible, EliminationEngine, EliminationOutcome, Replacement};
pub use error::{ArenaError, ArenaResult};
pub use events::{ArenaEvent, EventSink};
pub use llm::{
    GatewayFactory, GenerationRequest, JudgeGateway, LlmError, OllamaGateway, RequestPurpose,
};
pub use orchestrator::{assign_models, Arena, QuestionSource, QueuedQuestions, RoundReport};
pub use persona::{Contestant, Persona};
pub use random::ArenaRng;
pub use round::{Response, RoundResult, Vote, VoteTally, FALLBACK_REASONING};
pub use round_engine::{resolve_target, RoundEngine, TargetProblem};
pub use state::{EliminationRecord, Standing, TournamentState, TournamentSummary};
pub use store::{ArenaStores, DigestStore, MemoryStore, PersonaStore, RoundLogSink, StateStore};

// Re-export from arena-common-core
pub use arena_common_core::PersonaId;
