//! Fakes for driving the sensor code without hardware.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{Error, ErrorKind, ErrorType, I2c, Operation};

use crate::screen::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};
use crate::sensors::{BMP280_ADDRESS, BMP280_CHIP_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeError;

impl Error for FakeError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A single I2C device on a fake bus.
///
/// Register-addressed transfers (a write followed by a read in the same
/// transaction) read from `registers`. A plain read returns `response`, which
/// is how command/response devices answer. Writes of two or more bytes store
/// the payload at the register named by the first byte.
pub struct FakeI2c {
    pub address: u8,
    pub registers: [u8; 256],
    pub response: [u8; 8],
    pub fail: bool,
    pub transfers: usize,
    pub last_command: Option<u8>,
}

impl FakeI2c {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            response: [0; 8],
            fail: false,
            transfers: 0,
            last_command: None,
        }
    }
}

impl ErrorType for FakeI2c {
    type Error = FakeError;
}

impl I2c for FakeI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail || address != self.address {
            return Err(FakeError);
        }
        self.transfers += 1;

        let mut pointer: Option<u8> = None;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => match bytes {
                    [] => {}
                    [reg] => {
                        pointer = Some(*reg);
                        self.last_command = Some(*reg);
                    }
                    [reg, payload @ ..] => {
                        let start = *reg as usize;
                        for (offset, value) in payload.iter().enumerate() {
                            self.registers[(start + offset) % 256] = *value;
                        }
                    }
                },
                Operation::Read(buf) => match pointer {
                    Some(reg) => {
                        for (offset, slot) in buf.iter_mut().enumerate() {
                            *slot = self.registers[(reg as usize + offset) % 256];
                        }
                    }
                    None => {
                        let len = buf.len().min(self.response.len());
                        buf[..len].copy_from_slice(&self.response[..len]);
                    }
                },
            }
        }
        Ok(())
    }
}

/// Delay that returns immediately.
pub struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// Trimming values from the BMP280 datasheet worked example.
const BMP280_DATASHEET_TRIM: [i32; 12] = [
    27504, 26435, -1000, 36477, -10685, 3024, 2855, 140, -7, 15500, -14600, 6000,
];

/// A BMP280 holding the datasheet trimming values and the matching raw
/// sample (adc_P = 415148, adc_T = 519888), i.e. 25.08 C and 100653.27 Pa.
pub fn bmp280_datasheet_device() -> FakeI2c {
    let mut fake = FakeI2c::new(BMP280_ADDRESS);
    fake.registers[0xD0] = BMP280_CHIP_ID;
    for (i, value) in BMP280_DATASHEET_TRIM.iter().enumerate() {
        let at = 0x88 + i * 2;
        fake.registers[at..at + 2].copy_from_slice(&(*value as u16).to_le_bytes());
    }
    fake.registers[0xF7..0xFD].copy_from_slice(&[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00]);
    fake
}

const WIDTH: usize = DISPLAY_WIDTH_PX as usize;
const HEIGHT: usize = DISPLAY_HEIGHT_PX as usize;

/// In-memory stand-in for the OLED.
pub struct TestDisplay {
    pixels: [[bool; WIDTH]; HEIGHT],
}

impl TestDisplay {
    pub fn new() -> Self {
        Self {
            pixels: [[false; WIDTH]; HEIGHT],
        }
    }

    pub fn is_on(&self, x: i32, y: i32) -> bool {
        self.pixels[y as usize][x as usize]
    }

    pub fn any_on_in(&self, area: &Rectangle) -> bool {
        area.points().any(|p| self.is_on(p.x, p.y))
    }

    /// Pixels of `area` in row-major order.
    pub fn snapshot(&self, area: &Rectangle) -> heapless::Vec<bool, { WIDTH * HEIGHT }> {
        area.points().map(|p| self.is_on(p.x, p.y)).collect()
    }
}

impl OriginDimensions for TestDisplay {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)
    }
}

impl DrawTarget for TestDisplay {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..WIDTH as i32).contains(&point.x) && (0..HEIGHT as i32).contains(&point.y) {
                self.pixels[point.y as usize][point.x as usize] = color.is_on();
            }
        }
        Ok(())
    }
}
