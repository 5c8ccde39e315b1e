//! Tracing spans for tournament operations.

use tracing::{info_span, Span};

/// Span covering a single tournament round.
pub fn round_span(round: u32) -> Span {
    info_span!("round", number = round)
}

/// Span covering a contestant's work within a round.
pub fn contestant_span(id: &str, name: &str) -> Span {
    info_span!("contestant", id = %id, name = %name)
}

/// Span covering one Judge Gateway call.
pub fn gateway_span(model: &str, purpose: &str) -> Span {
    info_span!("gateway", model = %model, purpose = %purpose)
}

/// Span covering an elimination phase.
pub fn elimination_span(round: u32) -> Span {
    info_span!("elimination", round = round)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration. Returns the elapsed milliseconds.
    pub fn finish(self) -> u64 {
        let duration_ms = self.start.elapsed().as_millis() as u64;
        tracing::debug!(
            operation = %self.operation,
            duration_ms,
            "operation completed"
        );
        duration_ms
    }
}
