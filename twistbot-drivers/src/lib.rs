//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in twistbot-core:
//!
//! - PCA9685 16-channel PWM controller (I2C)
//! - Calibrated gripper servos on top of the PWM controller

#![no_std]
#![deny(unsafe_code)]

pub mod servo;
