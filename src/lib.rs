pub mod config;
pub mod control;
pub mod kernel;
pub mod vision;

pub use config::Config;
pub use kernel::pilot::{Pilot, TickReport};
