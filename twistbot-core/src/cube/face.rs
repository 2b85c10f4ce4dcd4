//! Canonical faces and adjacency cycles

/// Fixed puzzle-relative face labels
///
/// These never change as the puzzle is reoriented in the grippers; the
/// face-assignment tracker maps them onto actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanonicalFace {
    Up,
    Down,
    Left,
    Right,
    Front,
    Back,
}

/// The four faces orthogonal to a held face, in sweep order
///
/// Index `i + 1` is the face the opposed gripper holds after the holding
/// gripper makes one counter-clockwise quarter sweep from index `i`.
pub type AdjacencyCycle = [CanonicalFace; 4];

impl CanonicalFace {
    /// All faces in declaration order
    pub const ALL: [CanonicalFace; 6] = [
        CanonicalFace::Up,
        CanonicalFace::Down,
        CanonicalFace::Left,
        CanonicalFace::Right,
        CanonicalFace::Front,
        CanonicalFace::Back,
    ];

    /// Parse a move-string face letter
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'U' => Some(CanonicalFace::Up),
            'D' => Some(CanonicalFace::Down),
            'L' => Some(CanonicalFace::Left),
            'R' => Some(CanonicalFace::Right),
            'F' => Some(CanonicalFace::Front),
            'B' => Some(CanonicalFace::Back),
            _ => None,
        }
    }

    /// Move-string letter for this face
    pub fn letter(self) -> char {
        match self {
            CanonicalFace::Up => 'U',
            CanonicalFace::Down => 'D',
            CanonicalFace::Left => 'L',
            CanonicalFace::Right => 'R',
            CanonicalFace::Front => 'F',
            CanonicalFace::Back => 'B',
        }
    }

    /// The face on the opposite side of the puzzle
    pub fn opposite(self) -> Self {
        match self {
            CanonicalFace::Up => CanonicalFace::Down,
            CanonicalFace::Down => CanonicalFace::Up,
            CanonicalFace::Left => CanonicalFace::Right,
            CanonicalFace::Right => CanonicalFace::Left,
            CanonicalFace::Front => CanonicalFace::Back,
            CanonicalFace::Back => CanonicalFace::Front,
        }
    }

    /// Adjacency cycle around this face when it is the held (axis) face
    pub fn cycle(self) -> AdjacencyCycle {
        use CanonicalFace::*;

        match self {
            Up => [Front, Right, Back, Left],
            Down => [Back, Right, Front, Left],
            Left => [Up, Back, Down, Front],
            Right => [Down, Back, Up, Front],
            Front => [Down, Right, Up, Left],
            Back => [Up, Right, Down, Left],
        }
    }

    /// Position of `face` in this face's adjacency cycle
    ///
    /// Returns `None` for this face and its opposite.
    pub fn cycle_index(self, face: CanonicalFace) -> Option<u8> {
        self.cycle()
            .iter()
            .position(|&f| f == face)
            .map(|i| i as u8)
    }

    /// Check if two faces are orthogonal (share an edge)
    pub fn is_adjacent(self, other: CanonicalFace) -> bool {
        self != other && self.opposite() != other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_round_trip() {
        for face in CanonicalFace::ALL {
            assert_eq!(CanonicalFace::from_letter(face.letter()), Some(face));
        }
        assert_eq!(CanonicalFace::from_letter('X'), None);
        assert_eq!(CanonicalFace::from_letter('u'), None);
    }

    #[test]
    fn test_opposite_is_involution() {
        for face in CanonicalFace::ALL {
            assert_ne!(face.opposite(), face);
            assert_eq!(face.opposite().opposite(), face);
        }
    }

    #[test]
    fn test_cycle_contains_exactly_adjacent_faces() {
        for held in CanonicalFace::ALL {
            let cycle = held.cycle();
            for face in CanonicalFace::ALL {
                let in_cycle = cycle.contains(&face);
                assert_eq!(in_cycle, held.is_adjacent(face), "{:?} / {:?}", held, face);
            }
        }
    }

    #[test]
    fn test_opposite_faces_walk_cycle_in_reverse() {
        // Sweeping the same way while holding the opposite face turns the
        // puzzle the other way around the shared axis.
        for held in CanonicalFace::ALL {
            let forward = held.cycle();
            let backward = held.opposite().cycle();
            for i in 0..4 {
                let face = forward[i];
                let next = forward[(i + 1) % 4];
                let j = backward.iter().position(|&f| f == next).unwrap();
                assert_eq!(backward[(j + 1) % 4], face);
            }
        }
    }

    #[test]
    fn test_cycle_index() {
        assert_eq!(CanonicalFace::Up.cycle_index(CanonicalFace::Front), Some(0));
        assert_eq!(CanonicalFace::Up.cycle_index(CanonicalFace::Right), Some(1));
        assert_eq!(CanonicalFace::Up.cycle_index(CanonicalFace::Up), None);
        assert_eq!(CanonicalFace::Up.cycle_index(CanonicalFace::Down), None);
    }
}
