//! Layout and drawing for the 128x64 monochrome display
//!
//! The static parts of the screen (border, header, value boxes, labels) are
//! drawn once by [`Screen::draw_layout`]. Each render cycle then only clears
//! and rewrites the value regions, redraws the unit label when the page
//! changed and draws or erases the warning glyph on a transition.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle, Triangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::alarm::GlyphChange;
use crate::dashboard::Frame;

pub const DISPLAY_WIDTH_PX: u32 = 128;
pub const DISPLAY_HEIGHT_PX: u32 = 64;

const HEADER: &str = "PRESSURE";
const TEMPERATURE_LABEL: &str = "TEMP";
/// Shown when a value does not fit its box.
const OVERFLOW: &str = "------";

const HEADER_AT: Point = Point::new(2, 1);
const RULE_Y: i32 = 15;

const PRESSURE_BOX: Rectangle = Rectangle::new(Point::new(35, 20), Size::new(65, 18));
const TEMPERATURE_BOX: Rectangle = Rectangle::new(Point::new(45, 40), Size::new(55, 18));
const UNIT_LABEL: Rectangle = Rectangle::new(Point::new(2, 24), Size::new(30, 10));
const TEMPERATURE_LABEL_AT: Point = Point::new(2, 44);

/// Offset of the value text from the top-left corner of its box.
const VALUE_INSET: Point = Point::new(3, 4);

const GLYPH_APEX: Point = Point::new(115, 20);
const GLYPH_LEFT: Point = Point::new(105, 40);
const GLYPH_RIGHT: Point = Point::new(125, 40);
const GLYPH_AREA: Rectangle = Rectangle::new(Point::new(105, 20), Size::new(21, 21));

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_6X10, BinaryColor::On)
}

fn stroke() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, 1)
}

/// Area inside a box's 1 px outline.
fn interior(boxed: &Rectangle) -> Rectangle {
    boxed.offset(-1)
}

#[derive(Debug, Default)]
pub struct Screen {
    /// Unit label currently on screen, `None` until the first render.
    shown_unit: Option<&'static str>,
}

impl Screen {
    pub const fn new() -> Self {
        Self { shown_unit: None }
    }

    /// Clear the display and draw everything that never changes.
    pub fn draw_layout<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        target.clear(BinaryColor::Off)?;
        self.shown_unit = None;

        Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX))
            .into_styled(stroke())
            .draw(target)?;
        Line::new(
            Point::new(0, RULE_Y),
            Point::new(DISPLAY_WIDTH_PX as i32 - 1, RULE_Y),
        )
        .into_styled(stroke())
        .draw(target)?;

        Text::with_baseline(HEADER, HEADER_AT, text_style(), Baseline::Top).draw(target)?;

        PRESSURE_BOX.into_styled(stroke()).draw(target)?;
        TEMPERATURE_BOX.into_styled(stroke()).draw(target)?;
        Text::with_baseline(
            TEMPERATURE_LABEL,
            TEMPERATURE_LABEL_AT,
            text_style(),
            Baseline::Top,
        )
        .draw(target)?;

        Ok(())
    }

    /// Draw the dynamic parts of one frame.
    pub fn render<D>(&mut self, target: &mut D, frame: &Frame) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let unit = frame.page.unit_label();
        if self.shown_unit != Some(unit) {
            target.fill_solid(&UNIT_LABEL, BinaryColor::Off)?;
            Text::with_baseline(unit, UNIT_LABEL.top_left, text_style(), Baseline::Top)
                .draw(target)?;
            self.shown_unit = Some(unit);
        }

        let mut value: String<16> = String::new();
        draw_value(target, &PRESSURE_BOX, format_value(&mut value, frame.pressure, ""))?;
        value.clear();
        draw_value(
            target,
            &TEMPERATURE_BOX,
            format_value(&mut value, frame.temperature_c, "C"),
        )?;

        match frame.glyph {
            GlyphChange::Shown => draw_glyph(target)?,
            GlyphChange::Hidden => target.fill_solid(&GLYPH_AREA, BinaryColor::Off)?,
            GlyphChange::Unchanged => {}
        }

        Ok(())
    }
}

/// `value` with two decimals in a 6-wide field, or [`OVERFLOW`].
fn format_value<'a>(buf: &'a mut String<16>, value: f32, suffix: &str) -> &'a str {
    if write!(buf, "{:6.2}{}", value, suffix).is_err() {
        return OVERFLOW;
    }
    buf.as_str()
}

fn draw_value<D>(target: &mut D, boxed: &Rectangle, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.fill_solid(&interior(boxed), BinaryColor::Off)?;
    Text::with_baseline(
        text,
        boxed.top_left + VALUE_INSET,
        text_style(),
        Baseline::Top,
    )
    .draw(target)?;
    Ok(())
}

/// Warning triangle with an exclamation mark.
fn draw_glyph<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Triangle::new(GLYPH_APEX, GLYPH_RIGHT, GLYPH_LEFT)
        .into_styled(stroke())
        .draw(target)?;
    Line::new(Point::new(115, 25), Point::new(115, 35))
        .into_styled(stroke())
        .draw(target)?;
    Line::new(Point::new(115, 37), Point::new(115, 38))
        .into_styled(stroke())
        .draw(target)?;
    Ok(())
}
