//! Hardware-independent core library for the pressure gauge
//!
//! This crate contains all platform-agnostic logic of the gauge: sensor
//! drivers written against `embedded-hal-async`, the shared reading cells,
//! the averaging filter, alarm evaluation, page navigation and the screen
//! layout.
//!
//! It is `#![no_std]` so it compiles on both the ESP32 target and desktop
//! hosts (for the simulator and tests).

#![no_std]

pub mod alarm;
pub mod averaging;
pub mod config;
pub mod dashboard;
pub mod navigation;
pub mod sampling;
pub mod screen;
pub mod sensors;
pub mod shared_bus;
pub mod units;

#[cfg(test)]
pub(crate) mod test_support;
