//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motion timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionConfig {
    /// Wait after every physical servo command (ms)
    pub settle_ms: u32,
    /// Pause at the intermediate pulse when easing a jaw open (ms)
    pub ease_ms: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::from_settle(1000)
    }
}

impl MotionConfig {
    /// Config with the ease pause at a quarter of the settle delay
    pub const fn from_settle(settle_ms: u32) -> Self {
        Self {
            settle_ms,
            ease_ms: settle_ms / 4,
        }
    }
}

/// Pulse change per button press while tuning
pub const TUNING_STEP: u16 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_defaults() {
        let config = MotionConfig::default();
        assert_eq!(config.settle_ms, 1000);
        assert_eq!(config.ease_ms, 250);
    }
}
