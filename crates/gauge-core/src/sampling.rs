//! Periodic sampling of both pressure sensors
//!
//! [`Sampler`] owns the two sensor drivers and polls them in a fixed order:
//! the barometer first, then the gauge sensor. Each poll publishes into its
//! driver's [`SharedReading`](crate::sensors::SharedReading); the render task
//! only ever reads those cells.

use embassy_time::{Duration, Timer};
use log::{debug, info, warn};

use crate::sensors::{PressureSensor, SensorDriver};

pub struct Sampler<'a, A, B> {
    barometer: SensorDriver<'a, A>,
    gauge: SensorDriver<'a, B>,
}

impl<'a, A: PressureSensor, B: PressureSensor> Sampler<'a, A, B> {
    pub const fn new(barometer: SensorDriver<'a, A>, gauge: SensorDriver<'a, B>) -> Self {
        Self { barometer, gauge }
    }

    /// Initialize both sensors.
    ///
    /// A sensor that fails to come up is logged and then polled anyway; its
    /// reading stays at zero until it answers.
    pub async fn init(&mut self) {
        let barometer = self.barometer.init().await.is_ok();
        let gauge = self.gauge.init().await.is_ok();

        match (barometer, gauge) {
            (true, true) => info!("Both sensors ready"),
            _ => warn!(
                "Sampling with missing sensors ({}: {}, {}: {})",
                A::NAME,
                if barometer { "ok" } else { "down" },
                B::NAME,
                if gauge { "ok" } else { "down" },
            ),
        }
    }

    /// Poll the barometer, then the gauge sensor.
    pub async fn sample_once(&mut self) {
        self.barometer.poll().await;
        self.gauge.poll().await;
        debug!(
            "Sampled {}: {} Pa, {}: {} Pa",
            A::NAME,
            self.barometer.pressure(),
            B::NAME,
            self.gauge.pressure()
        );
    }

    /// Sample forever, sleeping `period` after every round.
    pub async fn run(mut self, period: Duration) -> ! {
        info!("Sampling every {} ms", period.as_millis());
        loop {
            self.sample_once().await;
            Timer::after(period).await;
        }
    }

    pub fn barometer(&self) -> &SensorDriver<'a, A> {
        &self.barometer
    }

    pub fn gauge(&self) -> &SensorDriver<'a, B> {
        &self.gauge
    }
}
