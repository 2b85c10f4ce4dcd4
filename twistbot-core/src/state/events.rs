//! Events that trigger state transitions

use super::machine::ErrorKind;

/// Front-panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Up,
    Down,
    Enter,
}

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle events
    /// Calibration loaded, servos initialized
    BootComplete,

    // Menu events
    /// User chose Solve
    StartSolve,
    /// User chose Release
    StartRelease,
    /// User chose Calibrate
    StartCalibration,

    // Run events
    /// Puzzle inserted and gripped
    PuzzleLoaded,
    /// Solution string received from the host
    MovesReceived,
    /// Every move executed
    SolveFinished,
    /// Puzzle released to the loading position
    Released,
    /// User pressed a button during motion
    Abort,
    /// User dismissed the result screen
    UserConfirm,

    // Calibration events
    /// Every stop accepted and stored
    CalibrationSaved,

    // Fault events
    /// Fatal error in the motion pipeline
    ErrorDetected(ErrorKind),
    /// User acknowledged error
    AcknowledgeError,
}

impl Event {
    /// Check if this event is user-initiated
    pub fn is_user_event(&self) -> bool {
        matches!(
            self,
            Event::StartSolve
                | Event::StartRelease
                | Event::StartCalibration
                | Event::Abort
                | Event::UserConfirm
                | Event::AcknowledgeError
        )
    }

    /// Check if this event is reported by the motion pipeline
    pub fn is_motion_event(&self) -> bool {
        matches!(
            self,
            Event::PuzzleLoaded | Event::SolveFinished | Event::Released
        )
    }

    /// Check if this event indicates an error
    pub fn is_error_event(&self) -> bool {
        matches!(self, Event::ErrorDetected(_))
    }
}
