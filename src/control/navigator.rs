//! Closed-loop movement toward a target on the overview panel.
//!
//! `NavigationController::decide` is the pure policy: given one observation it
//! returns the input commands for this poll. `go_to` is the driver that polls
//! the locator, executes commands through the keyboard and owns the timing,
//! the bounds and the held-key bookkeeping.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::input::{ControlError, InputError, InputSink, Keyboard};
use super::keys::{Key, KeyMap};
use crate::kernel::cancel::{self, Cancelled};
use crate::kernel::telemetry::event::{NavigationOutcome, TelemetryEvent};
use crate::kernel::telemetry::recorder::TelemetryRecorder;
use crate::kernel::time::Pacing;
use crate::vision::{EntityLocator, FrameSource, Position, VisionError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Horizontal gap, in overview pixels, that still counts as on target.
    pub x_tolerance: f64,
    pub y_tolerance: f64,
    /// Horizontal gap above which the controller jumps to cover ground.
    pub far_gap: f64,
    pub max_polls: u32,
    pub deadline_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            x_tolerance: 2.0,
            y_tolerance: 7.0,
            far_gap: 30.0,
            max_polls: 2_000,
            deadline_ms: 60_000,
        }
    }
}

impl NavigationConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hold(Key),
    Release(Key),
    Press(Key),
    /// Release every key the controller may have down.
    ReleaseAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Still closing the horizontal gap; poll again right away.
    Moving,
    /// A jump-down or climb was issued; wait for the entity to land.
    Settling,
    Arrived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub commands: Vec<Command>,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    pub position: Position,
    pub polls: u32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    #[error("did not reach {target} after {polls} polls (last seen at {last:?})")]
    NotConverged {
        target: Position,
        last: Option<Position>,
        polls: u32,
    },
    #[error("navigation cancelled")]
    Cancelled,
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Vision(#[from] VisionError),
}

impl NavigationError {
    /// Whether the caller may simply try again later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NavigationError::NotConverged { .. })
    }

    fn outcome(&self) -> NavigationOutcome {
        match self {
            NavigationError::NotConverged { .. } => NavigationOutcome::NotConverged,
            NavigationError::Cancelled => NavigationOutcome::Cancelled,
            _ => NavigationOutcome::Failed,
        }
    }
}

impl From<Cancelled> for NavigationError {
    fn from(_: Cancelled) -> Self {
        NavigationError::Cancelled
    }
}

impl From<ControlError> for NavigationError {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::Input(e) => NavigationError::Input(e),
            ControlError::Cancelled => NavigationError::Cancelled,
        }
    }
}

/// Per-invocation bookkeeping of `go_to`. Never outlives the call.
#[derive(Debug, Default)]
struct NavigationState {
    last: Option<Position>,
    polls: u32,
    absent_polls: u32,
    held: BTreeSet<Key>,
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    config: NavigationConfig,
    keys: KeyMap,
    pacing: Pacing,
}

impl NavigationController {
    pub fn new(config: NavigationConfig, keys: KeyMap, pacing: Pacing) -> Self {
        Self { config, keys, pacing }
    }

    /// Every key the controller can hold or press.
    pub fn holdable(&self) -> [Key; 6] {
        let k = &self.keys;
        [k.left, k.right, k.up, k.down, k.jump, k.climb]
    }

    /// Pure function: the commands for one poll at `current`.
    ///
    /// Horizontal alignment comes first. The vertical policy is only looked at
    /// once the horizontal gap is inside tolerance.
    pub fn decide(&self, current: Position, target: Position, held: &BTreeSet<Key>) -> Decision {
        let dx = target.x - current.x;
        let dy = target.y - current.y;
        let mut commands = Vec::new();

        if dx.abs() >= self.config.x_tolerance {
            let (toward, away) = if dx > 0.0 {
                (self.keys.right, self.keys.left)
            } else {
                (self.keys.left, self.keys.right)
            };
            if held.contains(&away) {
                commands.push(Command::Release(away));
            }
            commands.push(Command::Hold(toward));
            if dx.abs() > self.config.far_gap {
                commands.push(Command::Press(self.keys.jump));
                commands.push(Command::Press(self.keys.jump));
            }
            return Decision { commands, phase: Phase::Moving };
        }

        commands.push(Command::ReleaseAll);
        if dy.abs() < self.config.y_tolerance {
            commands.push(Command::ReleaseAll);
            return Decision { commands, phase: Phase::Arrived };
        }

        if dy > 0.0 {
            // Above the target: drop through the platform.
            commands.push(Command::Hold(self.keys.down));
            commands.push(Command::Press(self.keys.jump));
        } else {
            commands.push(Command::Press(self.keys.climb));
        }
        Decision { commands, phase: Phase::Settling }
    }

    /// Drives the controlled entity to `target`.
    ///
    /// Bounded by `max_polls` and the deadline. A release-all is attempted on
    /// every failing exit; a successful arrival has already released.
    pub async fn go_to<F: FrameSource, S: InputSink>(
        &self,
        locator: &mut EntityLocator<F>,
        keyboard: &mut Keyboard<S>,
        telemetry: &mut TelemetryRecorder,
        target: Position,
        cancel: &CancellationToken,
    ) -> Result<Arrival, NavigationError> {
        info!("Navigating to {}", target);
        let mut state = NavigationState::default();
        let result = self.drive(locator, keyboard, target, cancel, &mut state).await;

        let outcome = match &result {
            Ok(arrival) => {
                info!("Arrived at {} after {} polls", arrival.position, arrival.polls);
                NavigationOutcome::Arrived
            }
            Err(e) => {
                if let Err(release_error) = keyboard.release_keys(&self.holdable()) {
                    warn!("Release-all after failed navigation also failed: {}", release_error);
                }
                warn!("Navigation to {} ended: {}", target, e);
                e.outcome()
            }
        };

        telemetry.record(TelemetryEvent::NavigationFinished {
            outcome,
            polls: state.polls,
            absent_polls: state.absent_polls,
        });
        result
    }

    async fn drive<F: FrameSource, S: InputSink>(
        &self,
        locator: &mut EntityLocator<F>,
        keyboard: &mut Keyboard<S>,
        target: Position,
        cancel: &CancellationToken,
        state: &mut NavigationState,
    ) -> Result<Arrival, NavigationError> {
        let started = Instant::now();
        let deadline = self.config.deadline();

        loop {
            cancel::check(cancel)?;
            if state.polls >= self.config.max_polls || started.elapsed() >= deadline {
                return Err(NavigationError::NotConverged {
                    target,
                    last: state.last,
                    polls: state.polls,
                });
            }
            state.polls += 1;

            // === PERCEIVE ===
            let Some(current) = locator.controlled_position()? else {
                state.absent_polls += 1;
                debug!("Poll {}: controlled entity not visible", state.polls);
                cancel::pause(self.pacing.poll_interval(), cancel).await?;
                continue;
            };
            state.last = Some(current);

            // === DECIDE ===
            let decision = self.decide(current, target, &state.held);
            debug!("Poll {} at {}: {:?}", state.polls, current, decision);

            // === ACT ===
            for command in decision.commands {
                self.execute(command, keyboard, &mut state.held, cancel).await?;
            }

            match decision.phase {
                Phase::Arrived => {
                    return Ok(Arrival { position: current, polls: state.polls });
                }
                Phase::Settling => cancel::pause(self.pacing.settle(), cancel).await?,
                Phase::Moving => cancel::pause(self.pacing.poll_interval(), cancel).await?,
            }
        }
    }

    async fn execute<S: InputSink>(
        &self,
        command: Command,
        keyboard: &mut Keyboard<S>,
        held: &mut BTreeSet<Key>,
        cancel: &CancellationToken,
    ) -> Result<(), NavigationError> {
        match command {
            Command::Hold(key) => {
                keyboard.hold(key)?;
                held.insert(key);
            }
            Command::Release(key) => {
                keyboard.release(key)?;
                held.remove(&key);
            }
            Command::Press(key) => keyboard.press(key, cancel).await?,
            Command::ReleaseAll => {
                keyboard.release_keys(&self.holdable())?;
                held.clear();
            }
        }
        Ok(())
    }
}
