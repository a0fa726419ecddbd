//! Embassy tasks of the gauge
//!
//! Three tasks run concurrently: the status LED blinker, the sensor sampler
//! and the display renderer. The sampler publishes into the static reading
//! cells below and the renderer reads them; that is the only state they
//! share.

use embassy_time::{Delay, Duration, Instant, Ticker};
use esp_hal::gpio::{Input, Output};
use gauge_core::config::GaugeConfig;
use gauge_core::dashboard::Dashboard;
use gauge_core::sampling::Sampler;
use gauge_core::screen::Screen;
use gauge_core::sensors::{Bmp280, SharedReading, Smp3011};
use gauge_core::shared_bus;
use log::{info, warn};

use crate::board::{GaugeDisplay, SensorBus};

/// Latest BMP280 (ambient) reading.
pub static BAROMETER_READING: SharedReading = SharedReading::new();
/// Latest SMP3011 (gauge) reading, the one on screen.
pub static GAUGE_READING: SharedReading = SharedReading::new();

pub type SensorDevice = shared_bus::SensorDevice<'static, SensorBus>;

pub type GaugeSampler =
    Sampler<'static, Bmp280<SensorDevice, Delay>, Smp3011<SensorDevice, Delay>>;

#[embassy_executor::task]
pub async fn blink_task(mut led: Output<'static>, half_period: Duration) {
    info!("Blinking every {} ms", half_period.as_millis());
    let mut ticker = Ticker::every(half_period);
    loop {
        ticker.next().await;
        led.toggle();
    }
}

#[embassy_executor::task]
pub async fn sampling_task(sampler: GaugeSampler, period: Duration) {
    sampler.run(period).await
}

#[embassy_executor::task]
pub async fn render_task(mut display: GaugeDisplay, button: Input<'static>, config: GaugeConfig) {
    let mut screen = Screen::new();
    let mut dashboard = Dashboard::new(&config);
    let mut display_failing = false;

    if let Err(e) = screen.draw_layout(&mut display) {
        warn!("Failed to draw screen layout: {:?}", e);
    }

    info!("Rendering every {} ms", config.periods.render_ms);
    let mut ticker = Ticker::every(config.periods.render());
    loop {
        let reading = GAUGE_READING.latest();
        let frame = dashboard.step(reading.as_ref(), button.is_low(), Instant::now());

        let drawn = screen
            .render(&mut display, &frame)
            .and_then(|()| display.flush());
        match drawn {
            Ok(()) if display_failing => {
                info!("Display writes resumed");
                display_failing = false;
            }
            Ok(()) => {}
            Err(e) if !display_failing => {
                warn!("Display update failed: {:?}", e);
                display_failing = true;
            }
            Err(_) => {}
        }

        ticker.next().await;
    }
}
