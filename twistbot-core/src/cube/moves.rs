//! Move strings from the search procedure
//!
//! A solution arrives as space-separated tokens `<Face><Turns>`, e.g.
//! `"U2 R1 F3 3"`. The final token is a move count and is discarded.

use heapless::Vec;

use super::face::CanonicalFace;

/// Maximum moves accepted in one solution
pub const MAX_MOVES: usize = 64;

/// One requested layer twist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Move {
    /// Face whose layer is turned
    pub face: CanonicalFace,
    /// Quarter turns: 1 = counter-clockwise, 2 = half, 3 = clockwise
    pub turns: u8,
}

impl Move {
    /// Create a move, rejecting turn counts outside 1..=3
    pub fn new(face: CanonicalFace, turns: u8) -> Option<Self> {
        if (1..=3).contains(&turns) {
            Some(Self { face, turns })
        } else {
            None
        }
    }

    /// Parse a single `<Face><Turns>` token
    pub fn parse(token: &str) -> Result<Self, MoveParseError> {
        let mut chars = token.chars();
        let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(MoveParseError::MalformedToken);
        };

        let face = CanonicalFace::from_letter(letter).ok_or(MoveParseError::InvalidFace(letter))?;
        digit
            .to_digit(10)
            .and_then(|d| Move::new(face, d as u8))
            .ok_or(MoveParseError::InvalidTurn(digit))
    }
}

/// Errors from parsing a move string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveParseError {
    /// Token is not exactly two characters
    MalformedToken,
    /// Unknown face letter
    InvalidFace(char),
    /// Turn digit outside 1..=3
    InvalidTurn(char),
    /// More than [`MAX_MOVES`] moves
    TooManyMoves,
}

/// Parsed solution, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSequence {
    moves: Vec<Move, MAX_MOVES>,
}

impl MoveSequence {
    /// Parse a solution string
    ///
    /// The last token is the move count and is dropped without inspection,
    /// so a count-only string yields an empty sequence.
    pub fn parse(input: &str) -> Result<Self, MoveParseError> {
        let mut tokens = input.split_whitespace().peekable();
        let mut moves = Vec::new();

        while let Some(token) = tokens.next() {
            if tokens.peek().is_none() {
                break;
            }
            moves
                .push(Move::parse(token)?)
                .map_err(|_| MoveParseError::TooManyMoves)?;
        }

        Ok(Self { moves })
    }

    /// Moves in execution order
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
