//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.
//! The motion task runs alone on core 1; everything else shares core 0.

pub mod buttons;
pub mod calibration;
pub mod controller;
pub mod host;
pub mod motion;

pub use buttons::buttons_task;
pub use calibration::calibration_task;
pub use controller::controller_task;
pub use host::{host_rx_task, host_tx_task};
pub use motion::{motion_task, Servos};
