use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// Down-to-up delay the game reliably registers as a discrete press.
pub const PRESS_MS: u64 = 50;

/// Physical timing of input actions. Every delay is awaited through
/// `kernel::cancel::pause`, so each one is a cancellation point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub press_ms: u64,
    /// Wait after a jump-down or climb before the next poll.
    pub settle_ms: u64,
    /// Wait between locator polls while moving or while the entity is not visible.
    pub poll_interval_ms: u64,
    pub step_off_min_ms: u64,
    pub step_off_max_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            press_ms: PRESS_MS,
            settle_ms: 1_000,
            poll_interval_ms: 0,
            step_off_min_ms: 500,
            step_off_max_ms: 1_250,
        }
    }
}

impl Pacing {
    /// No delays at all. Used by tests and offline replays.
    pub fn instant() -> Self {
        Self {
            press_ms: 0,
            settle_ms: 0,
            poll_interval_ms: 0,
            step_off_min_ms: 0,
            step_off_max_ms: 0,
        }
    }

    pub fn press(&self) -> Duration {
        Duration::from_millis(self.press_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Randomized hold used when stepping off a marker.
    pub fn step_off<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.step_off_min_ms >= self.step_off_max_ms {
            return Duration::from_millis(self.step_off_min_ms);
        }
        Duration::from_millis(rng.gen_range(self.step_off_min_ms..=self.step_off_max_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_off_stays_in_range() {
        let pacing = Pacing::default();
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let d = pacing.step_off(&mut rng);
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_millis(1_250));
        }
    }

    #[test]
    fn degenerate_range_uses_minimum() {
        let pacing = Pacing { step_off_min_ms: 300, step_off_max_ms: 100, ..Pacing::instant() };
        assert_eq!(pacing.step_off(&mut rand::thread_rng()), Duration::from_millis(300));
    }
}
