//! Hardware abstraction traits
//!
//! These traits define the interface between the planning logic
//! and the servo controller / input implementations.

pub mod abort;
pub mod servo;

pub use abort::{AbortSource, NeverAbort};
pub use servo::{Motion, Servo, ServoOutput};
