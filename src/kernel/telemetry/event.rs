use serde::{Deserialize, Serialize};

// Allowed: counts, outcome kinds
// Forbidden: frames, pixel data, positions

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    NavigationFinished {
        outcome: NavigationOutcome,
        polls: u32,
        /// Polls where the controlled entity was not visible.
        absent_polls: u32,
    },

    DecodeAttempt {
        symbols: usize,
        complete: bool,
    },

    RuneFinished {
        solved: bool,
        attempts: u32,
    },

    OthersSighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationOutcome {
    Arrived,
    NotConverged,
    Cancelled,
    Failed,
}
