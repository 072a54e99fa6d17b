//! Session telemetry.
//!
//! # INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside decision logic (navigator, decoder or rune routine).
//! It exists solely for observability and verification.
//!
//! Events carry counts and outcome kinds only, never frames or positions.

pub mod event;
pub mod metrics;
pub mod recorder;
