//! Startup configuration for the gauge
//!
//! Every number the firmware depends on (alarm thresholds, pin assignments,
//! bus clocks, task periods) lives in [`GaugeConfig`]. The firmware builds
//! one from [`GaugeConfig::DEFAULT`] and hands it to the tasks at startup.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Pressure thresholds in PSI that drive the alarm glyph.
///
/// The glyph is shown for `low_psi <= p < degraded_below_psi` and for
/// `p > high_psi`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AlarmThresholds {
    /// Readings below this are treated as "no pressure applied".
    pub low_psi: f32,
    /// Upper (exclusive) bound of the under-pressure band.
    pub degraded_below_psi: f32,
    /// Readings above this are over-pressure.
    pub high_psi: f32,
}

/// GPIO numbers of the board wiring.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    pub led: u8,
    /// Navigation button, active-low with the internal pull-up enabled.
    pub button: u8,
    pub display_sda: u8,
    pub display_scl: u8,
    pub sensor_sda: u8,
    pub sensor_scl: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    pub display_khz: u32,
    pub sensor_khz: u32,
    pub display_address: u8,
}

/// Fixed loop periods of the three tasks, in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPeriods {
    /// Half period of the LED square wave.
    pub blink_ms: u32,
    pub sample_ms: u32,
    pub render_ms: u32,
}

impl TaskPeriods {
    pub const fn blink(&self) -> Duration {
        Duration::from_millis(self.blink_ms as u64)
    }

    pub const fn sample(&self) -> Duration {
        Duration::from_millis(self.sample_ms as u64)
    }

    pub const fn render(&self) -> Duration {
        Duration::from_millis(self.render_ms as u64)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GaugeConfig {
    pub thresholds: AlarmThresholds,
    pub pins: PinMap,
    pub bus: BusConfig,
    pub periods: TaskPeriods,
    /// Number of render cycles folded into one average.
    pub average_window: u8,
    /// How long an average stays on screen once it is shown.
    pub average_hold_ms: u32,
    pub debounce_ms: u32,
}

impl GaugeConfig {
    pub const DEFAULT: Self = Self {
        thresholds: AlarmThresholds {
            low_psi: 1.0,
            degraded_below_psi: 28.0,
            high_psi: 34.0,
        },
        pins: PinMap {
            led: 16,
            button: 27,
            display_sda: 5,
            display_scl: 4,
            sensor_sda: 33,
            sensor_scl: 32,
        },
        bus: BusConfig {
            display_khz: 400,
            sensor_khz: 100,
            display_address: 0x3C,
        },
        periods: TaskPeriods {
            blink_ms: 500,
            sample_ms: 10,
            render_ms: 100,
        },
        average_window: 10,
        average_hold_ms: 5000,
        debounce_ms: 50,
    };

    pub const fn average_hold(&self) -> Duration {
        Duration::from_millis(self.average_hold_ms as u64)
    }

    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms as u64)
    }

    /// Check the invariants the tasks rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !(t.low_psi < t.degraded_below_psi && t.degraded_below_psi <= t.high_psi) {
            return Err(ConfigError::ThresholdOrder {
                low: t.low_psi,
                degraded: t.degraded_below_psi,
                high: t.high_psi,
            });
        }

        let periods = [
            ("blink", self.periods.blink_ms),
            ("sample", self.periods.sample_ms),
            ("render", self.periods.render_ms),
        ];
        if let Some((task, _)) = periods.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::ZeroPeriod { task: *task });
        }

        if self.average_window == 0 {
            return Err(ConfigError::EmptyAverageWindow);
        }

        if self.bus.sensor_khz == 0 || self.bus.display_khz == 0 {
            return Err(ConfigError::ZeroBusClock);
        }

        let p = &self.pins;
        let all = [
            p.led,
            p.button,
            p.display_sda,
            p.display_scl,
            p.sensor_sda,
            p.sensor_scl,
        ];
        for (i, pin) in all.iter().enumerate() {
            if all[i + 1..].contains(pin) {
                return Err(ConfigError::PinConflict { pin: *pin });
            }
        }

        Ok(())
    }
}

const _: () = assert!(
    GaugeConfig::DEFAULT.thresholds.low_psi < GaugeConfig::DEFAULT.thresholds.degraded_below_psi
);
const _: () = assert!(
    GaugeConfig::DEFAULT.thresholds.degraded_below_psi <= GaugeConfig::DEFAULT.thresholds.high_psi
);

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("alarm thresholds out of order: low {low}, degraded {degraded}, high {high}")]
    ThresholdOrder { low: f32, degraded: f32, high: f32 },
    #[error("{task} period must be non-zero")]
    ZeroPeriod { task: &'static str },
    #[error("averaging window must hold at least one sample")]
    EmptyAverageWindow,
    #[error("I2C bus clock must be non-zero")]
    ZeroBusClock,
    #[error("GPIO{pin} is assigned twice")]
    PinConflict { pin: u8 },
}
