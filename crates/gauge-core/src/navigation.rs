//! Page navigation and the debounced page button
//!
//! The button is sampled once per render cycle. [`Debouncer`] turns the raw
//! active-low level into press edges without ever blocking the caller, and
//! [`NavigationState`] advances the page on each edge.

use embassy_time::{Duration, Instant};

/// Which unit the pressure row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Psi,
    Bar,
}

impl Page {
    pub const fn unit_label(self) -> &'static str {
        match self {
            Self::Psi => "PSI",
            Self::Bar => "BAR",
        }
    }
}

/// Current page as an index in {0, 1}.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    page_index: u8,
}

impl NavigationState {
    pub const PAGE_COUNT: u8 = 2;

    pub const fn new() -> Self {
        Self { page_index: 0 }
    }

    /// Move to the next page, wrapping from the last back to the first.
    pub fn advance(&mut self) -> Page {
        self.page_index = (self.page_index + 1) % Self::PAGE_COUNT;
        self.page()
    }

    pub fn page_index(&self) -> u8 {
        self.page_index
    }

    pub fn page(&self) -> Page {
        match self.page_index {
            0 => Page::Psi,
            _ => Page::Bar,
        }
    }
}

/// Edge detector with a time-based debounce window.
///
/// A level change is accepted only if at least `window` has passed since the
/// previous accepted change. Only the press edge (level going low) is
/// reported; holding the button reports nothing further.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
    pressed: bool,
    last_change: Option<Instant>,
}

impl Debouncer {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pressed: false,
            last_change: None,
        }
    }

    /// Feed the current level. Returns `true` only on an accepted press edge.
    pub fn update(&mut self, is_low: bool, now: Instant) -> bool {
        if is_low == self.pressed {
            return false;
        }

        if let Some(last) = self.last_change
            && now.saturating_duration_since(last) < self.window
        {
            return false;
        }

        self.pressed = is_low;
        self.last_change = Some(now);
        is_low
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
