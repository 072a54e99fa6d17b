use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::input::{InputSink, Keyboard};
use super::keys::{Key, KeyMap};
use super::navigator::{NavigationController, NavigationError};
use crate::kernel::cancel;
use crate::kernel::telemetry::event::TelemetryEvent;
use crate::kernel::telemetry::recorder::TelemetryRecorder;
use crate::vision::{ArrowDecoder, Direction, EntityLocator, FrameSource, Position};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuneConfig {
    pub max_attempts: u32,
    /// Wait between arriving on the marker and pressing the interact key.
    pub activate_delay_ms: u64,
    /// Wait between the interact press and the captcha capture.
    pub capture_delay_ms: u64,
}

impl Default for RuneConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            activate_delay_ms: 1_000,
            capture_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuneOutcome {
    Solved { attempts: u32 },
    Unsolved { attempts: u32 },
}

/// Activates the special marker, reads the captcha it shows and types the
/// answer, retrying until the marker disappears.
#[derive(Debug, Clone)]
pub struct RuneSolver {
    config: RuneConfig,
    decoder: ArrowDecoder,
    keys: KeyMap,
}

impl RuneSolver {
    pub fn new(config: RuneConfig, decoder: ArrowDecoder, keys: KeyMap) -> Self {
        Self { config, decoder, keys }
    }

    fn direction_key(&self, direction: Direction) -> Key {
        match direction {
            Direction::Up => self.keys.up,
            Direction::Down => self.keys.down,
            Direction::Left => self.keys.left,
            Direction::Right => self.keys.right,
        }
    }

    /// Runs up to `max_attempts` activation rounds against the marker at
    /// `target`.
    ///
    /// A navigation that does not converge or a short decode only costs the
    /// attempt. Cancellation and input failures end the routine.
    pub async fn solve<F: FrameSource, S: InputSink>(
        &self,
        navigator: &NavigationController,
        locator: &mut EntityLocator<F>,
        keyboard: &mut Keyboard<S>,
        telemetry: &mut TelemetryRecorder,
        target: Position,
        cancel: &CancellationToken,
    ) -> Result<RuneOutcome, NavigationError> {
        info!("Solving rune at {}", target);
        let result = self.attempts(navigator, locator, keyboard, telemetry, target, cancel).await;

        match &result {
            Ok(RuneOutcome::Solved { attempts }) => {
                info!("Rune solved after {} attempts", attempts);
                telemetry.record(TelemetryEvent::RuneFinished { solved: true, attempts: *attempts });
            }
            Ok(RuneOutcome::Unsolved { attempts }) => {
                warn!("Rune still present after {} attempts", attempts);
                telemetry.record(TelemetryEvent::RuneFinished { solved: false, attempts: *attempts });
            }
            Err(e) => {
                if let Err(release_error) = keyboard.release_keys(&navigator.holdable()) {
                    warn!("Release-all after aborted rune routine also failed: {}", release_error);
                }
                warn!("Rune routine aborted: {}", e);
            }
        }
        result
    }

    async fn attempts<F: FrameSource, S: InputSink>(
        &self,
        navigator: &NavigationController,
        locator: &mut EntityLocator<F>,
        keyboard: &mut Keyboard<S>,
        telemetry: &mut TelemetryRecorder,
        target: Position,
        cancel: &CancellationToken,
    ) -> Result<RuneOutcome, NavigationError> {
        for attempt in 1..=self.config.max_attempts {
            match navigator.go_to(locator, keyboard, telemetry, target, cancel).await {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    warn!("Attempt {}: could not reach the rune: {}", attempt, e);
                    continue;
                }
                Err(e) => return Err(e),
            }

            cancel::pause(Duration::from_millis(self.config.activate_delay_ms), cancel).await?;
            keyboard.press(self.keys.interact, cancel).await?;
            cancel::pause(Duration::from_millis(self.config.capture_delay_ms), cancel).await?;

            let directions = locator
                .capture()
                .map(|frame| self.decoder.decode(&frame))
                .unwrap_or_default();
            let complete = self.decoder.is_complete(&directions);
            telemetry.record(TelemetryEvent::DecodeAttempt {
                symbols: directions.len(),
                complete,
            });
            if !complete {
                // A short answer is never typed; the marker is still active.
                warn!("Attempt {}: decoded {:?}, retrying", attempt, directions);
                continue;
            }

            debug!("Attempt {}: typing {:?}", attempt, directions);
            for direction in directions {
                keyboard.press(self.direction_key(direction), cancel).await?;
            }

            self.step_off(keyboard, cancel).await?;

            if locator.marker_position()?.is_none() {
                return Ok(RuneOutcome::Solved { attempts: attempt });
            }
            debug!("Attempt {}: marker still visible", attempt);
        }

        Ok(RuneOutcome::Unsolved { attempts: self.config.max_attempts })
    }

    /// Walks off the marker and back so the game registers the answer.
    async fn step_off<S: InputSink>(
        &self,
        keyboard: &mut Keyboard<S>,
        cancel: &CancellationToken,
    ) -> Result<(), NavigationError> {
        for key in [self.keys.left, self.keys.right] {
            let duration = keyboard.pacing().step_off(&mut rand::thread_rng());
            keyboard.hold_for(key, duration, cancel).await?;
        }
        Ok(())
    }
}
