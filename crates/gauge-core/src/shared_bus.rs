//! Sensor bus sharing
//!
//! Both sensor drivers sit on the same I2C port. The port lives in one
//! [`SharedBus`] and each driver gets its own [`SensorDevice`] handle onto it
//! from `embassy-embedded-hal`. Every transfer, `write_read` included, runs
//! under the bus lock, so a register read is never split by the other
//! driver.

use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

/// The sensor bus, usually parked in a `StaticCell`.
pub type SharedBus<T> = Mutex<CriticalSectionRawMutex, T>;

/// One driver's handle onto a [`SharedBus`].
pub type SensorDevice<'a, T> = I2cDevice<'a, CriticalSectionRawMutex, T>;
