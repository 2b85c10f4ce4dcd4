//! Calibration persistence task
//!
//! Owns the flash storage and saves tuned calibrations without blocking
//! the controller.

use defmt::*;

use twistbot_hal_rp2040::flash::FlashStorage;

use crate::channels::{CALIBRATION_SAVE, CALIBRATION_STORED};
use crate::config::save_calibration;

#[embassy_executor::task]
pub async fn calibration_task(mut storage: FlashStorage<'static>) {
    info!("Calibration task started");

    loop {
        let calibration = CALIBRATION_SAVE.wait().await;

        info!(
            "Saving calibration: {} Hz, pulses {}..{}",
            calibration.pwm_freq_hz, calibration.pulse_min, calibration.pulse_max
        );

        match save_calibration(&mut storage, &calibration).await {
            Ok(()) => CALIBRATION_STORED.signal(true),
            Err(e) => {
                error!("Failed to save calibration: {:?}", e);
                CALIBRATION_STORED.signal(false);
            }
        }
    }
}
