pub mod cancel;
pub mod pilot;
pub mod telemetry;
pub mod time;
