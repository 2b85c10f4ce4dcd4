//! RP2040-specific HAL for the gripper firmware
//!
//! Provides wear-leveled flash storage for the servo calibration.

#![no_std]

pub mod flash;
