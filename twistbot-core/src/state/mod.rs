//! State machine for a solve run
//!
//! Defines the authoritative runtime behavior of the robot.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;
pub mod menu;

pub use events::{Button, Event};
pub use machine::{ErrorKind, State};
pub use menu::{Menu, MenuEntry};
