//! ESP32 firmware-specific modules for the pressure gauge
//!
//! This crate contains the code that only makes sense on the device: board
//! wiring and peripheral bring-up, and the embassy tasks that drive the
//! hardware-independent logic in `gauge_core`.

#![no_std]

pub mod board;
pub mod tasks;
