use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::cancel;
use super::telemetry::event::TelemetryEvent;
use super::telemetry::recorder::TelemetryRecorder;
use crate::config::Config;
use crate::control::{
    InputSink, Keyboard, NavigationController, NavigationError, RuneOutcome, RuneSolver,
};
use crate::vision::{ArrowDecoder, EntityLocator, FrameSource, Position};

/// What one patrol iteration observed and did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub others_present: bool,
    pub rune: Option<RuneOutcome>,
    pub arrived: bool,
}

/// Session driver. Owns every collaborator and runs the patrol loop:
/// watch for other participants, clear the rune when it shows up, return to
/// the anchor.
pub struct Pilot<F, S> {
    locator: EntityLocator<F>,
    keyboard: Keyboard<S>,
    navigator: NavigationController,
    runes: RuneSolver,
    telemetry: TelemetryRecorder,
    anchor: Position,
    patrol_interval: Duration,
}

impl<F: FrameSource, S: InputSink> Pilot<F, S> {
    pub fn new(config: &Config, source: F, sink: S) -> Self {
        let decoder = ArrowDecoder::new(config.regions.captcha, config.decoder.clone());
        Self {
            locator: EntityLocator::new(source, config.regions.overview, config.palette.clone()),
            keyboard: Keyboard::new(sink, config.pacing.clone()),
            navigator: NavigationController::new(
                config.navigation.clone(),
                config.keys,
                config.pacing.clone(),
            ),
            runes: RuneSolver::new(config.rune.clone(), decoder, config.keys),
            telemetry: TelemetryRecorder::new(),
            anchor: config.session.anchor,
            patrol_interval: Duration::from_millis(config.session.patrol_interval_ms),
        }
    }

    pub fn telemetry(&self) -> &TelemetryRecorder {
        &self.telemetry
    }

    pub fn keyboard(&self) -> &Keyboard<S> {
        &self.keyboard
    }

    /// One patrol iteration.
    pub async fn tick(&mut self, cancel: &CancellationToken) -> Result<TickReport, NavigationError> {
        // === 1. WATCH ===
        let others_present = self.locator.others_present()?;
        if others_present {
            warn!("Other participants are on the map");
            self.telemetry.record(TelemetryEvent::OthersSighted);
        }

        // === 2. RUNE ===
        let rune = match self.locator.marker_position()? {
            Some(marker) => Some(
                self.runes
                    .solve(
                        &self.navigator,
                        &mut self.locator,
                        &mut self.keyboard,
                        &mut self.telemetry,
                        marker,
                        cancel,
                    )
                    .await?,
            ),
            None => None,
        };

        // === 3. RETURN TO ANCHOR ===
        let arrived = match self
            .navigator
            .go_to(
                &mut self.locator,
                &mut self.keyboard,
                &mut self.telemetry,
                self.anchor,
                cancel,
            )
            .await
        {
            Ok(_) => true,
            Err(e) if e.is_recoverable() => false,
            Err(e) => return Err(e),
        };

        Ok(TickReport { others_present, rune, arrived })
    }

    /// Repeats `tick` until `cancel` fires. Cancellation is a clean exit;
    /// anything else that is not recoverable ends the session with an error.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<(), NavigationError> {
        info!("Pilot started. Anchor: {}", self.anchor);

        loop {
            match self.tick(cancel).await {
                Ok(report) => {
                    if !report.arrived {
                        warn!("Patrol did not reach the anchor this round");
                    }
                }
                Err(NavigationError::Cancelled) => break,
                Err(e) => {
                    if let Err(release_error) = self.keyboard.release_keys(&self.navigator.holdable()) {
                        warn!("Release-all after pilot failure also failed: {}", release_error);
                    }
                    error!("Pilot stopped: {}", e);
                    return Err(e);
                }
            }

            if cancel::pause(self.patrol_interval, cancel).await.is_err() {
                break;
            }
        }

        info!("Pilot stopped on request");
        Ok(())
    }
}
