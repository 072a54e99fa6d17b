use serde::Serialize;
use std::collections::VecDeque;

use super::event::{NavigationOutcome, TelemetryEvent};

#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetrySnapshot {
    pub navigation: NavigationStats,
    pub decode: DecodeStats,
    pub rune: RuneStats,
    pub others_sighted: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NavigationStats {
    pub arrivals: u64,
    pub not_converged: u64,
    pub cancelled: u64,
    pub failed: u64,
    pub total_polls: u64,
    pub absent_polls: u64,
    pub avg_polls_per_arrival: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DecodeStats {
    pub attempts: u64,
    pub complete: u64,
    pub incomplete: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RuneStats {
    pub solved: u64,
    pub unsolved: u64,
    pub total_attempts: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut arrival_polls = 0u64;

    for event in events {
        match event {
            TelemetryEvent::NavigationFinished { outcome, polls, absent_polls } => {
                snap.navigation.total_polls += *polls as u64;
                snap.navigation.absent_polls += *absent_polls as u64;
                match outcome {
                    NavigationOutcome::Arrived => {
                        snap.navigation.arrivals += 1;
                        arrival_polls += *polls as u64;
                    }
                    NavigationOutcome::NotConverged => snap.navigation.not_converged += 1,
                    NavigationOutcome::Cancelled => snap.navigation.cancelled += 1,
                    NavigationOutcome::Failed => snap.navigation.failed += 1,
                }
            }
            TelemetryEvent::DecodeAttempt { complete, .. } => {
                snap.decode.attempts += 1;
                if *complete {
                    snap.decode.complete += 1;
                } else {
                    snap.decode.incomplete += 1;
                }
            }
            TelemetryEvent::RuneFinished { solved, attempts } => {
                snap.rune.total_attempts += *attempts as u64;
                if *solved {
                    snap.rune.solved += 1;
                } else {
                    snap.rune.unsolved += 1;
                }
            }
            TelemetryEvent::OthersSighted => snap.others_sighted += 1,
        }
    }

    if snap.navigation.arrivals > 0 {
        snap.navigation.avg_polls_per_arrival = arrival_polls as f64 / snap.navigation.arrivals as f64;
    }

    snap
}
