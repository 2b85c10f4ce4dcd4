//! Board-agnostic core logic for the twin-gripper puzzle robot
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Puzzle model (faces, adjacency cycles, move strings)
//! - Actuator position model with redundant-command suppression
//! - Face-assignment tracking and reorientation planning
//! - Motion sequencing under travel-range and handoff constraints
//! - Solver pipeline tying the above together
//! - Servo calibration data and tuning
//! - Run state machine and menu

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod cube;
pub mod error;
pub mod motion;
pub mod solver;
pub mod state;
pub mod traits;

pub use error::PlanError;
pub use solver::{Solver, Status};
