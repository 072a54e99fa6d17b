pub mod input;
pub mod keys;
pub mod navigator;
pub mod rune;

pub use input::{ControlError, InputError, InputSink, Keyboard, TracingSink};
pub use keys::{Key, KeyMap, KeyStroke, Transition};
pub use navigator::{Arrival, NavigationConfig, NavigationController, NavigationError};
pub use rune::{RuneConfig, RuneOutcome, RuneSolver};
