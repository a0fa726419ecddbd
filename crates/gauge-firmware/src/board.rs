//! Board wiring and peripheral bring-up
//!
//! Each function takes the exact `esp_hal` peripherals it needs, so the GPIO
//! numbers in [`CONFIG`] are pinned to the peripheral types below by the
//! compile-time checks at the top of this module.

use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::peripherals::{GPIO4, GPIO5, GPIO16, GPIO27, GPIO32, GPIO33, I2C0, I2C1};
use esp_hal::time::Rate;
use esp_hal::{Async, Blocking};
use gauge_core::config::GaugeConfig;
use gauge_core::shared_bus::SharedBus;
use log::info;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use static_cell::StaticCell;

pub const CONFIG: GaugeConfig = GaugeConfig::DEFAULT;

const _: () = assert!(CONFIG.pins.led == 16);
const _: () = assert!(CONFIG.pins.button == 27);
const _: () = assert!(CONFIG.pins.display_sda == 5);
const _: () = assert!(CONFIG.pins.display_scl == 4);
const _: () = assert!(CONFIG.pins.sensor_sda == 33);
const _: () = assert!(CONFIG.pins.sensor_scl == 32);

pub type SensorBus = I2c<'static, Async>;

pub type GaugeDisplay = Ssd1306<
    I2CInterface<I2c<'static, Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

pub fn log_config(config: &GaugeConfig) {
    info!(
        "Alarm bands: {} <= p < {} psi, p > {} psi",
        config.thresholds.low_psi, config.thresholds.degraded_below_psi, config.thresholds.high_psi
    );
    info!(
        "Periods: blink {} ms, sample {} ms, render {} ms",
        config.periods.blink_ms, config.periods.sample_ms, config.periods.render_ms
    );
    info!(
        "Averaging {} cycles, hold {} ms, debounce {} ms",
        config.average_window, config.average_hold_ms, config.debounce_ms
    );
}

/// Status LED, starting off.
pub fn led(pin: GPIO16<'static>) -> Output<'static> {
    Output::new(pin, Level::Low, OutputConfig::default())
}

/// Page button. Active low, so the internal pull-up holds it high when open.
pub fn button(pin: GPIO27<'static>) -> Input<'static> {
    Input::new(pin, InputConfig::default().with_pull(Pull::Up))
}

/// Bring up the sensor I2C bus and park it in a static so both sensor
/// drivers can borrow it for the life of the program.
pub fn create_sensor_bus(
    i2c1: I2C1<'static>,
    sda: GPIO33<'static>,
    scl: GPIO32<'static>,
) -> &'static SharedBus<SensorBus> {
    static SENSOR_BUS: StaticCell<SharedBus<SensorBus>> = StaticCell::new();

    let i2c = I2c::new(
        i2c1,
        I2cConfig::default().with_frequency(Rate::from_khz(CONFIG.bus.sensor_khz)),
    )
    .expect("Failed to configure sensor I2C bus")
    .with_sda(sda)
    .with_scl(scl)
    .into_async();

    info!("Sensor bus ready at {} kHz", CONFIG.bus.sensor_khz);
    SENSOR_BUS.init(SharedBus::new(i2c))
}

/// Bring up the display bus and initialize the OLED in buffered mode.
pub fn init_display(i2c0: I2C0<'static>, sda: GPIO5<'static>, scl: GPIO4<'static>) -> GaugeDisplay {
    let i2c = I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(CONFIG.bus.display_khz)),
    )
    .expect("Failed to configure display I2C bus")
    .with_sda(sda)
    .with_scl(scl);

    let interface = I2CDisplayInterface::new_custom_address(i2c, CONFIG.bus.display_address);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display.init().expect("Failed to initialize display");

    info!(
        "Display ready at {:#04x}, {} kHz",
        CONFIG.bus.display_address, CONFIG.bus.display_khz
    );
    display
}
