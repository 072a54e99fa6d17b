use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::keys::{Key, KeyStroke, Transition};
use crate::kernel::cancel::{self, Cancelled};
use crate::kernel::time::Pacing;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("key {0} has no device encoding")]
    Unmapped(Key),
    #[error("input device failure: {0}")]
    Device(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("operation cancelled")]
    Cancelled,
}

impl From<Cancelled> for ControlError {
    fn from(_: Cancelled) -> Self {
        ControlError::Cancelled
    }
}

/// Where key transitions end up. Implementations deliver one transition per
/// call and never sleep.
pub trait InputSink {
    fn send(&mut self, key: Key, transition: Transition) -> Result<(), InputError>;
}

impl<S: InputSink + ?Sized> InputSink for Box<S> {
    fn send(&mut self, key: Key, transition: Transition) -> Result<(), InputError> {
        (**self).send(key, transition)
    }
}

/// Dry-run sink: encodes every transition and logs the stroke instead of
/// injecting it.
#[derive(Debug, Default)]
pub struct TracingSink {
    sent: u64,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl InputSink for TracingSink {
    fn send(&mut self, key: Key, transition: Transition) -> Result<(), InputError> {
        let stroke = KeyStroke::encode(key, transition).ok_or(InputError::Unmapped(key))?;
        self.sent += 1;
        debug!(
            "[INPUT] {} {:?} (code={}, state={})",
            key, transition, stroke.code, stroke.state
        );
        Ok(())
    }
}

/// Timed key actions on top of an `InputSink`.
pub struct Keyboard<S> {
    sink: S,
    pacing: Pacing,
}

impl<S: InputSink> Keyboard<S> {
    pub fn new(sink: S, pacing: Pacing) -> Self {
        Self { sink, pacing }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    pub fn hold(&mut self, key: Key) -> Result<(), InputError> {
        self.sink.send(key, Transition::Down)
    }

    pub fn release(&mut self, key: Key) -> Result<(), InputError> {
        self.sink.send(key, Transition::Up)
    }

    /// Down, wait the press delay, up. The key-up is sent even when the wait
    /// is cancelled.
    pub async fn press(&mut self, key: Key, cancel: &CancellationToken) -> Result<(), ControlError> {
        let duration = self.pacing.press();
        self.hold_for(key, duration, cancel).await
    }

    /// Holds `key` for `duration`, then releases it.
    pub async fn hold_for(
        &mut self,
        key: Key,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ControlError> {
        cancel::check(cancel)?;
        self.hold(key)?;
        let waited = cancel::pause(duration, cancel).await;
        self.release(key)?;
        waited?;
        Ok(())
    }

    /// Releases every key in `keys`. Keeps going after a failure and reports
    /// the first one.
    pub fn release_keys(&mut self, keys: &[Key]) -> Result<(), InputError> {
        let mut first_error = None;
        for &key in keys {
            if let Err(e) = self.release(key) {
                warn!("Release of {} failed: {}", key, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
