//! Servo drivers
//!
//! Hobby servos driven from a PCA9685 PWM controller, with the pulse for
//! each discrete stop taken from the servo calibration.

pub mod calibrated;
pub mod pca9685;

pub use calibrated::CalibratedServos;
pub use pca9685::{Pca9685, Pca9685Error};
