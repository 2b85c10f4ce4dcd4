//! Puzzle model
//!
//! Fixed face labels, their adjacency, and the move-string format
//! produced by the external search procedure.

pub mod face;
pub mod moves;

pub use face::{AdjacencyCycle, CanonicalFace};
pub use moves::{Move, MoveParseError, MoveSequence, MAX_MOVES};
