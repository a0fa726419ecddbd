//! Render-cycle state of the gauge
//!
//! [`Dashboard::step`] runs once per render cycle. It owns everything the
//! render task keeps between cycles (averaging, navigation, button and glyph
//! state) and turns the latest [`SensorReading`] into a [`Frame`] for the
//! screen. It has no I/O of its own, so the firmware and the simulator drive
//! the same logic.

use embassy_time::{Duration, Instant};
use log::{debug, info};

use crate::alarm::{AlarmGlyph, AlarmLevel, GlyphChange};
use crate::averaging::AveragingState;
use crate::config::{AlarmThresholds, GaugeConfig};
use crate::navigation::{Debouncer, NavigationState, Page};
use crate::sensors::SensorReading;
use crate::units::psi_to_bar;

/// Everything the screen needs for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub page: Page,
    /// Pressure in the unit of `page`.
    pub pressure: f32,
    /// `pressure` is an average rather than the instantaneous reading.
    pub showing_average: bool,
    pub temperature_c: f32,
    pub alarm: AlarmLevel,
    pub glyph: GlyphChange,
    pub page_changed: bool,
}

/// An average being kept on screen.
#[derive(Debug, Clone, Copy)]
struct AverageHold {
    psi: f32,
    until: Instant,
}

pub struct Dashboard {
    thresholds: AlarmThresholds,
    hold_time: Duration,
    averaging: AveragingState,
    navigation: NavigationState,
    button: Debouncer,
    glyph: AlarmGlyph,
    hold: Option<AverageHold>,
}

impl Dashboard {
    pub fn new(config: &GaugeConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            hold_time: config.average_hold(),
            averaging: AveragingState::new(config.average_window),
            navigation: NavigationState::new(),
            button: Debouncer::new(config.debounce()),
            glyph: AlarmGlyph::new(),
            hold: None,
        }
    }

    /// Run one render cycle.
    ///
    /// `reading` is `None` until the sensor has published once. Such a cycle
    /// draws zeros and is left out of the average. `button_low` is the raw
    /// level of the active-low page button.
    pub fn step(
        &mut self,
        reading: Option<&SensorReading>,
        button_low: bool,
        now: Instant,
    ) -> Frame {
        let page_changed = self.button.update(button_low, now);
        if page_changed {
            let page = self.navigation.advance();
            info!("Page changed to {}", page.unit_label());
        }
        let page = self.navigation.page();

        let sampled = reading.is_some();
        let reading = reading.copied().unwrap_or(SensorReading::ZERO);
        let psi = reading.pressure_psi;
        let alarm = AlarmLevel::evaluate(psi, &self.thresholds);
        let glyph = self.glyph.set(alarm.is_active());
        match glyph {
            GlyphChange::Shown => info!("Pressure alarm: {:?} at {} psi", alarm, psi),
            GlyphChange::Hidden => info!("Pressure back in range at {} psi", psi),
            GlyphChange::Unchanged => {}
        }

        let held = self.current_average(now);
        let pressure = match (held, page) {
            (Some(avg), Page::Psi) => avg,
            (Some(avg), Page::Bar) => psi_to_bar(avg),
            (None, Page::Psi) => psi,
            (None, Page::Bar) => reading.pressure_bar,
        };

        // The window restarts after the average has been shown.
        if sampled && held.is_none() {
            self.averaging.push(psi);
        }

        debug!(
            "Render: page={} pressure={} average={} temp={} alarm={:?}",
            page.unit_label(),
            pressure,
            held.is_some(),
            reading.temperature_c,
            alarm
        );

        Frame {
            page,
            pressure,
            showing_average: held.is_some(),
            temperature_c: reading.temperature_c,
            alarm,
            glyph,
            page_changed,
        }
    }

    /// The average to show this cycle, if one is pending or still held.
    fn current_average(&mut self, now: Instant) -> Option<f32> {
        if let Some(hold) = self.hold {
            if now < hold.until {
                return Some(hold.psi);
            }
            self.hold = None;
        }

        let psi = self.averaging.take_average()?;
        info!("Showing {} cycle average: {} psi", self.averaging.window(), psi);
        self.hold = Some(AverageHold {
            psi,
            until: now + self.hold_time,
        });
        Some(psi)
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn averaging(&self) -> &AveragingState {
        &self.averaging
    }

    pub fn glyph(&self) -> &AlarmGlyph {
        &self.glyph
    }
}
