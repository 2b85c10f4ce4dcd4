//! Servo calibration persistence
//!
//! The calibration is stored twice: as postcard bytes for loading and as
//! tune-file text that survives a format version change. Load order is
//! flash (binary, then text) and finally the `servo_tune.txt` embedded at
//! build time.

use defmt::*;
use heapless::String;

use twistbot_core::config::{CalibrationError, ServoCalibration};
use twistbot_core::PlanError;
use twistbot_hal_rp2040::flash::{FlashError, FlashStorage, StorageKey};

/// Tune file compiled into the firmware
const EMBEDDED_TUNE_FILE: &str = include_str!("../../servo_tune.txt");

/// Maximum serialized calibration size
const MAX_CALIBRATION_SIZE: usize = 128;

/// Maximum tune-file text size
const MAX_TUNE_FILE_SIZE: usize = 512;

/// Calibration persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
    /// Stored tune file is not valid
    TuneFile(CalibrationError),
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

/// Load the servo calibration
///
/// Fails with `MissingCalibration` when neither flash nor the embedded tune
/// file yields a complete calibration.
pub async fn load_calibration(
    storage: &mut FlashStorage<'_>,
) -> Result<ServoCalibration, PlanError> {
    match load_binary(storage).await {
        Ok(cal) => {
            info!("Loaded servo calibration from flash");
            return Ok(cal);
        }
        Err(PersistError::Flash(FlashError::NotFound)) => {
            debug!("No servo calibration in flash");
        }
        Err(e) => {
            warn!("Stored servo calibration unusable: {:?}", e);
        }
    }

    match load_tune_file(storage).await {
        Ok(cal) => {
            info!("Loaded servo calibration from stored tune file");
            return Ok(cal);
        }
        Err(PersistError::Flash(FlashError::NotFound)) => {}
        Err(e) => {
            warn!("Stored tune file unusable: {:?}", e);
        }
    }

    match ServoCalibration::parse_tune_file(EMBEDDED_TUNE_FILE) {
        Ok(cal) => {
            info!("Using embedded servo_tune.txt");
            Ok(cal)
        }
        Err(e) => {
            error!("Embedded servo_tune.txt rejected: {:?}", e);
            Err(PlanError::from(e))
        }
    }
}

/// Save the calibration in both stored forms
pub async fn save_calibration(
    storage: &mut FlashStorage<'_>,
    calibration: &ServoCalibration,
) -> Result<(), PersistError> {
    let mut calibration = calibration.clone();
    calibration.update_crc();

    let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
    let bytes = calibration
        .to_bytes(&mut buffer)
        .map_err(|_| PersistError::Serialize)?;
    debug!("Saving {} bytes of servo calibration", bytes.len());
    storage.write(StorageKey::ServoCalibration, bytes).await?;

    let mut text: String<MAX_TUNE_FILE_SIZE> = String::new();
    calibration
        .write_tune_file(&mut text)
        .map_err(|_| PersistError::Serialize)?;
    storage.write(StorageKey::TuneFile, text.as_bytes()).await?;

    info!("Saved servo calibration to flash");
    Ok(())
}

async fn load_binary(storage: &mut FlashStorage<'_>) -> Result<ServoCalibration, PersistError> {
    let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
    let len = storage.read(StorageKey::ServoCalibration, &mut buffer).await?;

    let cal =
        ServoCalibration::from_bytes(&buffer[..len]).map_err(|_| PersistError::Deserialize)?;

    if !cal.is_valid() {
        return Err(PersistError::InvalidFormat);
    }
    if !cal.verify_crc() {
        return Err(PersistError::CrcMismatch);
    }

    Ok(cal)
}

async fn load_tune_file(storage: &mut FlashStorage<'_>) -> Result<ServoCalibration, PersistError> {
    let mut buffer = [0u8; MAX_TUNE_FILE_SIZE];
    let len = storage.read(StorageKey::TuneFile, &mut buffer).await?;

    let text = core::str::from_utf8(&buffer[..len]).map_err(|_| PersistError::Deserialize)?;
    ServoCalibration::parse_tune_file(text).map_err(PersistError::TuneFile)
}
