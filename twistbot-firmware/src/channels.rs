//! Inter-task communication channels
//!
//! Static channels shared between the core 0 tasks and the motion task on
//! core 1. Every primitive uses the critical-section mutex so it is safe
//! across cores.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use twistbot_core::config::ServoCalibration;
use twistbot_core::state::{Button, State};

use crate::controller::{MotionRequest, MotionResult, MoveString};

/// Channel capacity for button presses
const BUTTON_CHANNEL_SIZE: usize = 8;

/// Channel capacity for motion requests
const MOTION_CHANNEL_SIZE: usize = 4;

/// Debounced button presses
pub static BUTTONS: Channel<CriticalSectionRawMutex, Button, BUTTON_CHANNEL_SIZE> =
    Channel::new();

/// Latest solve string received from the host
pub static HOST_MOVES: Signal<CriticalSectionRawMutex, MoveString> = Signal::new();

/// Requests for the motion core, in order
pub static MOTION_REQUESTS: Channel<CriticalSectionRawMutex, MotionRequest, MOTION_CHANNEL_SIZE> =
    Channel::new();

/// Results of Load/Grip/Solve/Release requests
pub static MOTION_RESULTS: Channel<CriticalSectionRawMutex, MotionResult, MOTION_CHANNEL_SIZE> =
    Channel::new();

/// Abort request, polled by the motion core between servo commands
pub static ABORT: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Calibration to persist (sent by the controller after tuning)
pub static CALIBRATION_SAVE: Signal<CriticalSectionRawMutex, ServoCalibration> = Signal::new();

/// Outcome of the last calibration save
pub static CALIBRATION_STORED: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Run state, reported to the host on change
pub static STATE_UPDATE: Signal<CriticalSectionRawMutex, State> = Signal::new();
