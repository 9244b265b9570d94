//! Core types and utilities for in-line inspection (ILI) run comparison.
//!
//! This crate is intentionally small and purely descriptive. It holds the
//! survey data model, the clock-position encoding, and a minimal logger; it
//! does *not* depend on any alignment or matching machinery.

mod clock;
mod logger;
mod survey;

pub use clock::{clock_gap, ClockReading};
pub use logger::init_with_level;
pub use survey::{Survey, SurveyRecord};
