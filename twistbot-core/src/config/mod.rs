//! Configuration types
//!
//! Servo calibration, motion timing and the interactive tuning session.

pub mod calibration;
pub mod tuning;
pub mod types;

pub use calibration::*;
pub use tuning::{TuningSession, TuningUpdate};
pub use types::*;
