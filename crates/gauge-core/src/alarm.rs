//! Pressure alarm evaluation and the on-screen warning glyph

use crate::config::AlarmThresholds;

/// Alarm condition of one pressure reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmLevel {
    /// Inside the accepted band, or no pressure applied.
    Normal,
    /// Pressure applied but below the accepted band.
    UnderPressure,
    /// Above the accepted band.
    OverPressure,
}

impl AlarmLevel {
    /// Classify a PSI reading.
    ///
    /// Readings below `low_psi` (negative ones included) and NaN are
    /// [`AlarmLevel::Normal`].
    pub fn evaluate(psi: f32, thresholds: &AlarmThresholds) -> Self {
        if psi > thresholds.high_psi {
            Self::OverPressure
        } else if psi >= thresholds.low_psi && psi < thresholds.degraded_below_psi {
            Self::UnderPressure
        } else {
            Self::Normal
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::Normal
    }
}

/// What a glyph update did to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphChange {
    Shown,
    Hidden,
    Unchanged,
}

/// Tracks whether the warning glyph is on screen.
///
/// Showing an already visible glyph, or hiding a hidden one, reports
/// [`GlyphChange::Unchanged`], so the screen only draws or erases it on an
/// actual transition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlarmGlyph {
    visible: bool,
}

impl AlarmGlyph {
    pub const fn new() -> Self {
        Self { visible: false }
    }

    pub fn show(&mut self) -> GlyphChange {
        if self.visible {
            GlyphChange::Unchanged
        } else {
            self.visible = true;
            GlyphChange::Shown
        }
    }

    pub fn hide(&mut self) -> GlyphChange {
        if self.visible {
            self.visible = false;
            GlyphChange::Hidden
        } else {
            GlyphChange::Unchanged
        }
    }

    pub fn set(&mut self, active: bool) -> GlyphChange {
        if active { self.show() } else { self.hide() }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
