//! Motion planning
//!
//! Position model, face tracking, reorientation planning and command
//! sequencing for the two grippers.

pub mod planner;
pub mod position;
pub mod sequencer;
pub mod tracker;

pub use planner::{MovePlan, Partition, Reorientation, Twist};
pub use position::{
    Actuator, ActuatorState, AxisPosition, Command, JawPosition, PositionModel, Primitive, Sweep,
};
pub use sequencer::{landing, staging, Step, Steps, MAX_STEPS};
pub use tracker::{FaceAssignment, Tracker};
