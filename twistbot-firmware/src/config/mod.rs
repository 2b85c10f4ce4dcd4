//! Calibration loading and persistence

pub mod calibration;

pub use calibration::{load_calibration, save_calibration};
