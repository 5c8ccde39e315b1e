//! Progress events published while a tournament runs.

use arena_common_core::PersonaId;

use crate::state::{EliminationRecord, Standing};

/// Capacity used for the orchestrator's broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum ArenaEvent {
    TournamentStarted { resumed: bool, round: u32, contestants: usize },
    RoundStarted { round: u32, question: String },
    ResponseReceived {
        round: u32,
        contestant_id: PersonaId,
        contestant_name: String,
        model: String,
        content: String,
    },
    VoteCast {
        round: u32,
        voter_name: String,
        target_name: String,
        reasoning: Option<String>,
        attempts: u32,
        fallback: bool,
    },
    Tally { round: u32, standings: Vec<Standing> },
    DroughtWarning { contestant_name: String, drought: u32, limit: u32 },
    Eliminated { record: EliminationRecord },
    ReplacementCreated {
        id: PersonaId,
        name: String,
        model: String,
        generation: u32,
        strategy_notes: String,
    },
    RoundComplete { round: u32 },
    TournamentComplete { rounds_played: u32 },
}

/// Optional sender shared by the engines. Sends never fail the caller.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<tokio::sync::broadcast::Sender<ArenaEvent>>);

impl EventSink {
    pub fn new(tx: tokio::sync::broadcast::Sender<ArenaEvent>) -> Self {
        Self(Some(tx))
    }

    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn emit(&self, event: ArenaEvent) {
        if let Some(tx) = &self.0 {
            // no receivers is fine
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    #[test]
    fn test_disabled_sink_drops_events() {
        EventSink::disabled().emit(ArenaEvent::RoundComplete { round: 1 });
    }

    #[test]
    fn test_sink_without_receivers_does_not_panic() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        EventSink::new(tx).emit(ArenaEvent::RoundComplete { round: 1 });
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let (tx, mut rx) = broadcast::channel(4);
        let sink = EventSink::new(tx);
        sink.emit(ArenaEvent::RoundStarted {
            round: 2,
            question: "Why?".into(),
        });
        match rx.recv().await.unwrap() {
            ArenaEvent::RoundStarted { round, question } => {
                assert_eq!(round, 2);
                assert_eq!(question, "Why?");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
