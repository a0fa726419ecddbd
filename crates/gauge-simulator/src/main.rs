//! Desktop simulator for the pressure-gauge display.
//!
//! Renders the gauge screen in an SDL2 window via `embedded-graphics-simulator`,
//! driving the same `Dashboard` and `Screen` the firmware uses. A synthetic
//! gauge pressure sweeps through the alarm bands so the warning glyph and the
//! averaging can be watched without hardware.
//!
//! # Key bindings
//!
//! | Key   | Action                              |
//! |-------|-------------------------------------|
//! | Space | Page button (hold to hold it down)  |
//! | Up    | Raise pressure offset by 1 psi      |
//! | Down  | Lower pressure offset by 1 psi      |
//! | F     | Toggle sensor dropout               |
//! | Q     | Quit                                |

use std::time::Duration;

use embassy_time::Instant;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    BinaryColorTheme, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
    sdl2::Keycode,
};
use log::{error, info, warn};

use gauge_core::config::GaugeConfig;
use gauge_core::dashboard::Dashboard;
use gauge_core::screen::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, Screen};
use gauge_core::sensors::{Measurement, SensorReading, SharedReading};
use gauge_core::units::PASCALS_PER_PSI;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 4;

/// Centre of the synthetic pressure sweep, inside the normal band.
const SWEEP_CENTRE_PSI: f64 = 31.0;
/// Wide enough to cross both alarm thresholds.
const SWEEP_AMPLITUDE_PSI: f64 = 6.0;
const SWEEP_PERIOD_SECS: f64 = 40.0;

/// Generates a slowly varying gauge pressure and ambient temperature.
struct MockGauge {
    offset_psi: f64,
    dropout: bool,
}

impl MockGauge {
    fn new() -> Self {
        Self {
            offset_psi: 0.0,
            dropout: false,
        }
    }

    fn sample(&self, t_secs: f64) -> Measurement {
        let phase = t_secs / SWEEP_PERIOD_SECS * core::f64::consts::TAU;
        let psi = SWEEP_CENTRE_PSI
            + SWEEP_AMPLITUDE_PSI * phase.sin()
            + 0.3 * (t_secs * 1.7).sin()
            + self.offset_psi;
        let temperature = 22.0 + 1.5 * (t_secs / 90.0).sin();

        Measurement {
            temperature_c: temperature as f32,
            pressure_pa: (psi * PASCALS_PER_PSI as f64) as f32,
        }
    }
}

fn main() {
    env_logger::init();

    let config = GaugeConfig::DEFAULT;
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return;
    }

    info!("Starting gauge simulator");
    info!(
        "Display: {}x{} (scale {}x)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: Space=Button  Up/Down=Offset  F=Dropout  Q=Quit");

    let mut display =
        SimulatorDisplay::<BinaryColor>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new()
        .theme(BinaryColorTheme::OledBlue)
        .scale(WINDOW_SCALE)
        .build();
    let mut window = Window::new("Gauge Simulator", &output_settings);

    let reading = SharedReading::new();
    let mut gauge = MockGauge::new();
    let mut dashboard = Dashboard::new(&config);
    let mut screen = Screen::new();
    let mut button_low = false;

    let frame_period = Duration::from_millis(config.periods.render_ms as u64);
    let start = Instant::now();

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    if let Err(e) = screen.draw_layout(&mut display) {
        warn!("Layout draw failed: {:?}", e);
    }
    window.update(&display);

    'running: loop {
        let frame_start = std::time::Instant::now();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::Space => button_low = true,
                    Keycode::Up => gauge.offset_psi += 1.0,
                    Keycode::Down => gauge.offset_psi -= 1.0,
                    Keycode::F => {
                        gauge.dropout = !gauge.dropout;
                        info!(
                            "Sensor dropout {}",
                            if gauge.dropout { "on" } else { "off" }
                        );
                    }
                    _ => {}
                },
                SimulatorEvent::KeyUp {
                    keycode: Keycode::Space,
                    ..
                } => button_low = false,
                _ => {}
            }
        }

        let now = Instant::now();
        if !gauge.dropout {
            let t_secs = now.duration_since(start).as_millis() as f64 / 1000.0;
            reading.publish(SensorReading::from_measurement(gauge.sample(t_secs)));
        }

        let frame = dashboard.step(reading.latest().as_ref(), button_low, now);
        if let Err(e) = screen.render(&mut display, &frame) {
            warn!("Render error: {:?}", e);
        }
        window.update(&display);

        let elapsed = frame_start.elapsed();
        if elapsed < frame_period {
            std::thread::sleep(frame_period - elapsed);
        }
    }

    info!("Simulator exiting");
}
