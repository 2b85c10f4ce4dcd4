//! State machine definition
//!
//! All servo motion and UI behavior is a function of the current state
//! and an event.

use super::events::Event;

/// Robot states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Power-on initialization, calibration loading
    Boot,
    /// Menu visible, grippers idle
    Idle,
    /// Jaws at loading width, waiting for the user to insert the puzzle
    Loading,
    /// Puzzle gripped, waiting for the solution string
    AwaitingMoves,
    /// Executing moves
    Solving,
    /// Returning the puzzle to the loading position
    Releasing,
    /// Run finished (solved or aborted), puzzle can be removed
    Complete,
    /// Interactive servo tuning
    Calibrating,
    /// Fault detected; motion stopped
    Error(ErrorKind),
}

/// Types of errors that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// No usable servo calibration
    MissingCalibration,
    /// Servo controller rejected a command
    HardwareFault,
    /// Planner or sequencer invariant broken
    PlanFault,
    /// Malformed solution string
    InvalidMoves,
    /// Calibration could not be stored
    StorageError,
}

impl State {
    /// Check if this state allows servo motion
    pub fn motion_allowed(&self) -> bool {
        matches!(
            self,
            State::Loading
                | State::AwaitingMoves
                | State::Solving
                | State::Releasing
                | State::Calibrating
        )
    }

    /// Check if a button press in this state aborts the run
    pub fn abortable(&self) -> bool {
        matches!(self, State::Loading | State::AwaitingMoves | State::Solving)
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, State::Error(_))
    }

    /// Check if this is a terminal state requiring user action
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Idle | State::Complete | State::Error(_))
    }

    /// Process an event and return the next state
    ///
    /// Unknown state/event pairs keep the current state.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Boot transitions
            (Boot, BootComplete) => Idle,
            (Boot, ErrorDetected(kind)) => Error(kind),

            // Idle transitions
            (Idle, StartSolve) => Loading,
            (Idle, StartRelease) => Releasing,
            (Idle, StartCalibration) => Calibrating,
            (Idle, ErrorDetected(kind)) => Error(kind),

            // Loading transitions
            (Loading, PuzzleLoaded) => AwaitingMoves,
            (Loading, Abort) => Releasing,
            (Loading, ErrorDetected(kind)) => Error(kind),

            // AwaitingMoves transitions
            (AwaitingMoves, MovesReceived) => Solving,
            (AwaitingMoves, Abort) => Releasing,
            (AwaitingMoves, ErrorDetected(kind)) => Error(kind),

            // Solving transitions
            (Solving, SolveFinished) => Releasing,
            (Solving, Abort) => Releasing,
            (Solving, ErrorDetected(kind)) => Error(kind),

            // Releasing transitions
            (Releasing, Released) => Complete,
            (Releasing, ErrorDetected(kind)) => Error(kind),

            // Complete transitions
            (Complete, UserConfirm) => Idle,
            (Complete, StartSolve) => Loading,

            // Calibrating transitions
            (Calibrating, CalibrationSaved) => Idle,
            (Calibrating, Abort) => Idle,
            (Calibrating, ErrorDetected(kind)) => Error(kind),

            // Error transitions
            (Error(_), AcknowledgeError) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
