//! Bosch BMP280 barometric pressure/temperature sensor

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::debug;

use super::{Measurement, PressureSensor, SensorError};

/// Address with SDO tied to ground.
pub const BMP280_ADDRESS: u8 = 0x76;
pub const BMP280_CHIP_ID: u8 = 0x58;

const REG_CALIBRATION: u8 = 0x88;
const REG_CHIP_ID: u8 = 0xD0;
const REG_RESET: u8 = 0xE0;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;
const REG_DATA: u8 = 0xF7;

const RESET_COMMAND: u8 = 0xB6;
const RESET_DELAY_MS: u32 = 10;

/// Temperature x1, pressure x4, normal mode.
const CTRL_MEAS_NORMAL: u8 = (0b001 << 5) | (0b011 << 2) | 0b11;
/// 0.5 ms standby, IIR filter off.
const CONFIG_STANDBY_FAST: u8 = 0x00;

const CALIBRATION_LEN: usize = 24;

/// Factory trimming parameters (datasheet section 3.11.2).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Calibration {
    t1: u16,
    t2: i16,
    t3: i16,
    p1: u16,
    p2: i16,
    p3: i16,
    p4: i16,
    p5: i16,
    p6: i16,
    p7: i16,
    p8: i16,
    p9: i16,
}

impl Calibration {
    fn from_bytes(b: &[u8; CALIBRATION_LEN]) -> Self {
        let u = |i: usize| u16::from_le_bytes([b[i], b[i + 1]]);
        let s = |i: usize| i16::from_le_bytes([b[i], b[i + 1]]);
        Self {
            t1: u(0),
            t2: s(2),
            t3: s(4),
            p1: u(6),
            p2: s(8),
            p3: s(10),
            p4: s(12),
            p5: s(14),
            p6: s(16),
            p7: s(18),
            p8: s(20),
            p9: s(22),
        }
    }

    /// Floating-point compensation from the datasheet (section 8.1).
    fn compensate(&self, adc_t: i32, adc_p: i32) -> Measurement {
        let adc_t = adc_t as f64;
        let adc_p = adc_p as f64;
        let t1 = self.t1 as f64;

        let var1 = (adc_t / 16384.0 - t1 / 1024.0) * self.t2 as f64;
        let d = adc_t / 131072.0 - t1 / 8192.0;
        let var2 = d * d * self.t3 as f64;
        let t_fine = var1 + var2;
        let temperature_c = t_fine / 5120.0;

        let mut var1 = t_fine / 2.0 - 64000.0;
        let mut var2 = var1 * var1 * self.p6 as f64 / 32768.0;
        var2 += var1 * self.p5 as f64 * 2.0;
        var2 = var2 / 4.0 + self.p4 as f64 * 65536.0;
        var1 = (self.p3 as f64 * var1 * var1 / 524288.0 + self.p2 as f64 * var1) / 524288.0;
        var1 = (1.0 + var1 / 32768.0) * self.p1 as f64;

        // A zero p1 means an unprogrammed part; avoid the division.
        let pressure_pa = if var1 == 0.0 {
            0.0
        } else {
            let mut p = 1048576.0 - adc_p;
            p = (p - var2 / 4096.0) * 6250.0 / var1;
            let var1 = self.p9 as f64 * p * p / 2147483648.0;
            let var2 = p * self.p8 as f64 / 32768.0;
            p + (var1 + var2 + self.p7 as f64) / 16.0
        };

        Measurement {
            temperature_c: temperature_c as f32,
            pressure_pa: pressure_pa as f32,
        }
    }
}

/// 20-bit raw value from a msb/lsb/xlsb register triple.
fn raw20(b: &[u8]) -> i32 {
    ((b[0] as i32) << 12) | ((b[1] as i32) << 4) | ((b[2] as i32) >> 4)
}

pub struct Bmp280<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    calibration: Option<Calibration>,
}

impl<I: I2c, D: DelayNs> Bmp280<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self::with_address(i2c, delay, BMP280_ADDRESS)
    }

    pub fn with_address(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            calibration: None,
        }
    }

    async fn write_reg(
        &mut self,
        reg: u8,
        value: u8,
        operation: &'static str,
    ) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .await
            .map_err(|e| {
                debug!("BMP280 {} failed: {:?}", operation, e);
                bus_error(operation)
            })
    }

    async fn read_regs(
        &mut self,
        reg: u8,
        buf: &mut [u8],
        operation: &'static str,
    ) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .await
            .map_err(|e| {
                debug!("BMP280 {} failed: {:?}", operation, e);
                bus_error(operation)
            })
    }
}

fn bus_error(operation: &'static str) -> SensorError {
    SensorError::Bus {
        sensor: "BMP280",
        operation,
    }
}

impl<I: I2c, D: DelayNs> PressureSensor for Bmp280<I, D> {
    const NAME: &'static str = "BMP280";

    async fn init(&mut self) -> Result<(), SensorError> {
        self.write_reg(REG_RESET, RESET_COMMAND, "soft reset").await?;
        self.delay.delay_ms(RESET_DELAY_MS).await;

        let mut id = [0u8; 1];
        self.read_regs(REG_CHIP_ID, &mut id, "read chip id").await?;
        if id[0] != BMP280_CHIP_ID {
            return Err(SensorError::DeviceIdMismatch {
                sensor: Self::NAME,
                expected: BMP280_CHIP_ID,
                found: id[0],
            });
        }

        let mut raw = [0u8; CALIBRATION_LEN];
        self.read_regs(REG_CALIBRATION, &mut raw, "read calibration").await?;
        let calibration = Calibration::from_bytes(&raw);
        debug!("BMP280 calibration: {:?}", calibration);

        // Config must be written before leaving sleep mode.
        self.write_reg(REG_CONFIG, CONFIG_STANDBY_FAST, "write config")
            .await?;
        self.write_reg(REG_CTRL_MEAS, CTRL_MEAS_NORMAL, "start normal mode")
            .await?;

        self.calibration = Some(calibration);
        Ok(())
    }

    /// Reads the data registers. An uninitialized driver runs `init` first,
    /// so a device that was absent at boot is picked up once it answers.
    async fn measure(&mut self) -> Result<Measurement, SensorError> {
        if self.calibration.is_none() {
            self.init().await?;
        }
        let calibration = self
            .calibration
            .ok_or(SensorError::NotInitialized { sensor: Self::NAME })?;

        let mut data = [0u8; 6];
        self.read_regs(REG_DATA, &mut data, "read measurement").await?;

        let adc_p = raw20(&data[0..3]);
        let adc_t = raw20(&data[3..6]);
        Ok(calibration.compensate(adc_t, adc_p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeI2c, NoDelay, bmp280_datasheet_device};
    use embassy_futures::block_on;

    fn fake_device() -> FakeI2c {
        bmp280_datasheet_device()
    }

    #[test]
    fn datasheet_example() {
        let mut sensor = Bmp280::new(fake_device(), NoDelay);
        block_on(sensor.init()).unwrap();

        let m = block_on(sensor.measure()).unwrap();
        assert!((m.temperature_c - 25.08).abs() < 0.01);
        assert!((m.pressure_pa - 100_653.27).abs() < 1.0);
    }

    #[test]
    fn init_starts_normal_mode() {
        let mut sensor = Bmp280::new(fake_device(), NoDelay);
        block_on(sensor.init()).unwrap();

        assert_eq!(sensor.i2c.registers[REG_RESET as usize], RESET_COMMAND);
        assert_eq!(sensor.i2c.registers[REG_CTRL_MEAS as usize], 0x2F);
        assert_eq!(sensor.i2c.registers[REG_CONFIG as usize], 0x00);
    }

    #[test]
    fn rejects_wrong_chip_id() {
        let mut fake = fake_device();
        fake.registers[REG_CHIP_ID as usize] = 0x60;
        let mut sensor = Bmp280::new(fake, NoDelay);

        assert_eq!(
            block_on(sensor.init()),
            Err(SensorError::DeviceIdMismatch {
                sensor: "BMP280",
                expected: 0x58,
                found: 0x60,
            })
        );
        assert!(matches!(
            block_on(sensor.measure()),
            Err(SensorError::DeviceIdMismatch { found: 0x60, .. })
        ));
    }

    #[test]
    fn measure_retries_init_until_device_answers() {
        let mut fake = fake_device();
        fake.registers[REG_CHIP_ID as usize] = 0x00;
        let mut sensor = Bmp280::new(fake, NoDelay);
        assert!(block_on(sensor.init()).is_err());

        sensor.i2c.registers[REG_CHIP_ID as usize] = BMP280_CHIP_ID;
        let m = block_on(sensor.measure()).unwrap();
        assert!((m.temperature_c - 25.08).abs() < 0.01);
        assert_eq!(sensor.i2c.registers[REG_CTRL_MEAS as usize], 0x2F);

        // Initialized now, so a later measure only reads data.
        let transfers = sensor.i2c.transfers;
        block_on(sensor.measure()).unwrap();
        assert_eq!(sensor.i2c.transfers, transfers + 1);
    }

    #[test]
    fn missing_device_is_a_bus_error() {
        let mut sensor = Bmp280::with_address(fake_device(), NoDelay, 0x77);
        assert!(matches!(
            block_on(sensor.init()),
            Err(SensorError::Bus {
                operation: "soft reset",
                ..
            })
        ));
    }

    #[test]
    fn raw_values_are_twenty_bits() {
        assert_eq!(raw20(&[0x65, 0x5A, 0xC0]), 415148);
        assert_eq!(raw20(&[0xFF, 0xFF, 0xF0]), 0xFFFFF);
    }
}
