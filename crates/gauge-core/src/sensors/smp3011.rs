//! TDK SMP3011 gauge pressure sensor
//!
//! The part has no register map. A measurement is started with a one-byte
//! command, and a plain 6-byte read returns the status byte, 24 bits of
//! pressure and 16 bits of temperature.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::error;

use super::{Measurement, PressureSensor, SensorError};

pub const SMP3011_ADDRESS: u8 = 0x78;

const CMD_MEASURE: u8 = 0xAC;
const CONVERSION_TIME_MS: u32 = 3;

const STATUS_POWERED: u8 = 0x40;
const STATUS_BUSY: u8 = 0x20;

/// Full-scale pressure span in pascals.
const SPAN_PA: f32 = 500_000.0;
/// Fraction of the output range that maps to zero pressure.
const OUTPUT_OFFSET: f32 = 0.15;
/// Fraction of the output range covering the full span.
const OUTPUT_SPAN: f32 = 0.70;

const TEMPERATURE_SPAN_C: f32 = 190.0;
const TEMPERATURE_MIN_C: f32 = -40.0;

fn convert(frame: &[u8; 6]) -> Measurement {
    let raw_p = ((frame[1] as u32) << 16) | ((frame[2] as u32) << 8) | frame[3] as u32;
    let raw_t = u16::from_be_bytes([frame[4], frame[5]]);

    let p_fraction = raw_p as f32 / (1u32 << 24) as f32;
    let t_fraction = raw_t as f32 / 65536.0;

    Measurement {
        pressure_pa: (p_fraction - OUTPUT_OFFSET) / OUTPUT_SPAN * SPAN_PA,
        temperature_c: t_fraction * TEMPERATURE_SPAN_C + TEMPERATURE_MIN_C,
    }
}

pub struct Smp3011<I, D> {
    i2c: I,
    delay: D,
}

impl<I: I2c, D: DelayNs> Smp3011<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }
}

impl<I: I2c, D: DelayNs> PressureSensor for Smp3011<I, D> {
    const NAME: &'static str = "SMP3011";

    async fn init(&mut self) -> Result<(), SensorError> {
        let mut status = [0u8; 1];
        self.i2c
            .read(SMP3011_ADDRESS, &mut status)
            .await
            .map_err(|e| {
                error!("SMP3011 status read failed: {:?}", e);
                SensorError::Bus {
                    sensor: Self::NAME,
                    operation: "read status",
                }
            })?;

        if status[0] & STATUS_POWERED == 0 {
            return Err(SensorError::NotPowered {
                sensor: Self::NAME,
                status: status[0],
            });
        }
        Ok(())
    }

    async fn measure(&mut self) -> Result<Measurement, SensorError> {
        self.i2c
            .write(SMP3011_ADDRESS, &[CMD_MEASURE])
            .await
            .map_err(|_| SensorError::Bus {
                sensor: Self::NAME,
                operation: "start conversion",
            })?;

        self.delay.delay_ms(CONVERSION_TIME_MS).await;

        let mut frame = [0u8; 6];
        self.i2c
            .read(SMP3011_ADDRESS, &mut frame)
            .await
            .map_err(|_| SensorError::Bus {
                sensor: Self::NAME,
                operation: "read measurement",
            })?;

        if frame[0] & STATUS_BUSY != 0 {
            return Err(SensorError::Busy { sensor: Self::NAME });
        }

        Ok(convert(&frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeI2c, NoDelay};
    use embassy_futures::block_on;

    fn fake_with(frame: [u8; 6]) -> FakeI2c {
        let mut fake = FakeI2c::new(SMP3011_ADDRESS);
        fake.response[..6].copy_from_slice(&frame);
        fake
    }

    #[test]
    fn mid_scale_conversion() {
        let m = convert(&[0x40, 0x80, 0x00, 0x00, 0x80, 0x00]);
        assert!((m.pressure_pa - 250_000.0).abs() < 1.0);
        assert!((m.temperature_c - 55.0).abs() < 1e-3);
    }

    #[test]
    fn output_below_offset_is_negative() {
        let m = convert(&[0x40, 0x10, 0x00, 0x00, 0x40, 0x00]);
        assert!(m.pressure_pa < 0.0);
        assert!((m.temperature_c - 7.5).abs() < 1e-3);
    }

    #[test]
    fn measure_sends_command_then_reads() {
        let mut sensor = Smp3011::new(fake_with([0x40, 0x80, 0x00, 0x00, 0x80, 0x00]), NoDelay);
        block_on(sensor.init()).unwrap();

        let m = block_on(sensor.measure()).unwrap();
        assert_eq!(sensor.i2c.last_command, Some(CMD_MEASURE));
        assert!((m.pressure_pa - 250_000.0).abs() < 1.0);
    }

    #[test]
    fn busy_status_is_reported() {
        let mut sensor = Smp3011::new(fake_with([0x60, 0x80, 0, 0, 0x80, 0]), NoDelay);
        assert_eq!(
            block_on(sensor.measure()),
            Err(SensorError::Busy { sensor: "SMP3011" })
        );
    }

    #[test]
    fn unpowered_part_fails_init() {
        let mut sensor = Smp3011::new(fake_with([0x00; 6]), NoDelay);
        assert_eq!(
            block_on(sensor.init()),
            Err(SensorError::NotPowered {
                sensor: "SMP3011",
                status: 0x00,
            })
        );
    }

    #[test]
    fn bus_failure() {
        let mut fake = fake_with([0x40; 6]);
        fake.fail = true;
        let mut sensor = Smp3011::new(fake, NoDelay);
        assert!(matches!(
            block_on(sensor.measure()),
            Err(SensorError::Bus {
                operation: "start conversion",
                ..
            })
        ));
    }
}
