//! Face-assignment tracking

use crate::cube::CanonicalFace;

use super::position::Actuator;

/// Which canonical face each actuator currently grips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaceAssignment {
    pub left: CanonicalFace,
    pub right: CanonicalFace,
}

impl Default for FaceAssignment {
    fn default() -> Self {
        Self {
            left: CanonicalFace::Up,
            right: CanonicalFace::Front,
        }
    }
}

impl FaceAssignment {
    /// Face held by `actuator`
    pub fn get(&self, actuator: Actuator) -> CanonicalFace {
        match actuator {
            Actuator::Left => self.left,
            Actuator::Right => self.right,
        }
    }
}

/// Face-assignment tracker
///
/// Updated only by [`Tracker::rotate`], after the puzzle-carrying sweep of
/// a reorientation has been issued.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    faces: FaceAssignment,
}

impl Tracker {
    /// Tracker at the initial assignment (Left = Up, Right = Front)
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker at an arbitrary assignment
    ///
    /// Returns `None` unless the two faces are orthogonal, as they always
    /// are for a puzzle held between opposed grippers.
    pub fn with_assignment(faces: FaceAssignment) -> Option<Self> {
        faces
            .left
            .is_adjacent(faces.right)
            .then_some(Self { faces })
    }

    /// Face currently held by `actuator`
    pub fn current(&self, actuator: Actuator) -> CanonicalFace {
        self.faces.get(actuator)
    }

    /// Both assignments
    pub fn assignment(&self) -> FaceAssignment {
        self.faces
    }

    /// Advance `actuator`'s face by `steps` along the cycle of the face
    /// held by the other actuator
    ///
    /// Returns the new face.
    pub fn rotate(&mut self, actuator: Actuator, steps: u8) -> CanonicalFace {
        let held = self.current(actuator);
        let axis = self.current(actuator.other());

        // Only adjacent pairs are ever admitted
        let index = axis.cycle_index(held);
        debug_assert!(index.is_some(), "{:?} is not adjacent to {:?}", held, axis);
        let Some(index) = index else {
            return held;
        };

        let next = axis.cycle()[((index + steps % 4) % 4) as usize];
        match actuator {
            Actuator::Left => self.faces.left = next,
            Actuator::Right => self.faces.right = next,
        }
        next
    }

    /// Return to the initial assignment for a new run
    pub fn reset(&mut self) {
        self.faces = FaceAssignment::default();
    }
}
