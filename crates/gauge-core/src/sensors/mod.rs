//! Pressure sensors and the readings they publish
//!
//! Each device implements [`PressureSensor`]. A [`SensorDriver`] polls one
//! device and publishes into a [`SharedReading`], which the render task reads
//! without touching the bus.

mod bmp280;
mod smp3011;

pub use bmp280::{BMP280_ADDRESS, BMP280_CHIP_ID, Bmp280};
pub use smp3011::{SMP3011_ADDRESS, Smp3011};

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use crate::units::{pa_to_bar, pa_to_psi};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor}: I2C transfer failed during {operation}")]
    Bus {
        sensor: &'static str,
        operation: &'static str,
    },
    #[error("{sensor}: unexpected device id {found:#04x}, expected {expected:#04x}")]
    DeviceIdMismatch {
        sensor: &'static str,
        expected: u8,
        found: u8,
    },
    #[error("{sensor}: device is not powered (status {status:#04x})")]
    NotPowered { sensor: &'static str, status: u8 },
    #[error("{sensor}: conversion still in progress")]
    Busy { sensor: &'static str },
    #[error("{sensor}: read before the driver was initialized")]
    NotInitialized { sensor: &'static str },
}

/// One converted measurement, as the device reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub pressure_pa: f32,
}

/// The latest values of one sensor in every unit the screen needs.
///
/// All four fields are derived from a single [`Measurement`], so a reading is
/// always internally consistent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    pub temperature_c: f32,
    pub pressure_pa: f32,
    pub pressure_bar: f32,
    pub pressure_psi: f32,
}

impl SensorReading {
    pub const ZERO: Self = Self {
        temperature_c: 0.0,
        pressure_pa: 0.0,
        pressure_bar: 0.0,
        pressure_psi: 0.0,
    };

    pub fn from_measurement(m: Measurement) -> Self {
        Self {
            temperature_c: m.temperature_c,
            pressure_pa: m.pressure_pa,
            pressure_bar: pa_to_bar(m.pressure_pa),
            pressure_psi: pa_to_psi(m.pressure_pa),
        }
    }
}

/// A pressure/temperature device on the sensor bus.
pub trait PressureSensor {
    /// Name used in logs and errors.
    const NAME: &'static str;

    /// Verify the device answers and prepare it for measuring.
    fn init(&mut self) -> impl Future<Output = Result<(), SensorError>>;

    /// Read and convert one measurement.
    fn measure(&mut self) -> impl Future<Output = Result<Measurement, SensorError>>;
}

/// Latest reading of one sensor, shared between the sampling task (writer)
/// and the render task (reader).
///
/// Writes and reads copy the whole [`SensorReading`] inside a critical
/// section, so a reader can never observe a half-updated reading. Until the
/// first publish there is no reading at all; [`latest`](Self::latest) says so
/// and [`snapshot`](Self::snapshot) reads as zero.
pub struct SharedReading {
    inner: Mutex<CriticalSectionRawMutex, Cell<Option<SensorReading>>>,
}

impl SharedReading {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(None)),
        }
    }

    pub fn publish(&self, reading: SensorReading) {
        self.inner.lock(|cell| cell.set(Some(reading)));
    }

    /// The last published reading, or `None` before the first publish.
    pub fn latest(&self) -> Option<SensorReading> {
        self.inner.lock(|cell| cell.get())
    }

    pub fn snapshot(&self) -> SensorReading {
        self.latest().unwrap_or(SensorReading::ZERO)
    }

    pub fn temperature(&self) -> f32 {
        self.snapshot().temperature_c
    }

    /// Pressure in pascals.
    pub fn pressure(&self) -> f32 {
        self.snapshot().pressure_pa
    }

    pub fn pressure_bar(&self) -> f32 {
        self.snapshot().pressure_bar
    }

    pub fn pressure_psi(&self) -> f32 {
        self.snapshot().pressure_psi
    }
}

impl Default for SharedReading {
    fn default() -> Self {
        Self::new()
    }
}

/// Binds a [`PressureSensor`] to the [`SharedReading`] it publishes into.
///
/// Polling is best-effort: a failed poll leaves the previous reading in place
/// and is only logged. The first failure of a streak is logged at `warn`, the
/// rest at `debug`, so a missing device does not flood the log at the sampling
/// rate.
pub struct SensorDriver<'a, S> {
    sensor: S,
    reading: &'a SharedReading,
    failing: bool,
}

impl<'a, S: PressureSensor> SensorDriver<'a, S> {
    pub const fn new(sensor: S, reading: &'a SharedReading) -> Self {
        Self {
            sensor,
            reading,
            failing: false,
        }
    }

    pub async fn init(&mut self) -> Result<(), SensorError> {
        match self.sensor.init().await {
            Ok(()) => {
                info!("{}: initialized", S::NAME);
                Ok(())
            }
            Err(e) => {
                error!("{}: init failed: {}", S::NAME, e);
                Err(e)
            }
        }
    }

    pub async fn poll(&mut self) {
        match self.sensor.measure().await {
            Ok(measurement) => {
                if self.failing {
                    info!("{}: readings resumed", S::NAME);
                    self.failing = false;
                }
                self.reading
                    .publish(SensorReading::from_measurement(measurement));
            }
            Err(e) if !self.failing => {
                warn!("{}: poll failed, keeping last reading: {}", S::NAME, e);
                self.failing = true;
            }
            Err(e) => debug!("{}: poll failed: {}", S::NAME, e),
        }
    }

    pub fn temperature(&self) -> f32 {
        self.reading.temperature()
    }

    pub fn pressure(&self) -> f32 {
        self.reading.pressure()
    }

    pub fn pressure_bar(&self) -> f32 {
        self.reading.pressure_bar()
    }

    pub fn pressure_psi(&self) -> f32 {
        self.reading.pressure_psi()
    }

    pub fn snapshot(&self) -> SensorReading {
        self.reading.snapshot()
    }

    pub fn latest(&self) -> Option<SensorReading> {
        self.reading.latest()
    }

    /// Whether the most recent poll failed.
    pub fn is_failing(&self) -> bool {
        self.failing
    }
}
