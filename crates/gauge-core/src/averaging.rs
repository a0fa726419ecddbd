//! Block averaging of the displayed pressure

/// Sums a fixed window of samples and produces their mean once per window.
///
/// The filter is either accumulating (`remaining > 0`) or has just completed
/// a window. Completing a window computes `accumulator / window`, marks the
/// average ready and starts the next window from zero. The ready average is
/// handed out exactly once through [`AveragingState::take_average`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragingState {
    accumulator: f32,
    remaining: u8,
    window: u8,
    last_average: f32,
    average_ready: bool,
}

impl AveragingState {
    /// `window` is clamped to at least one sample.
    pub const fn new(window: u8) -> Self {
        let window = if window == 0 { 1 } else { window };
        Self {
            accumulator: 0.0,
            remaining: window,
            window,
            last_average: 0.0,
            average_ready: false,
        }
    }

    /// Add one sample. Negative (and NaN) samples are ignored.
    ///
    /// Returns the new average when this sample completes a window.
    pub fn push(&mut self, sample: f32) -> Option<f32> {
        if !(sample >= 0.0) {
            return None;
        }

        self.accumulator += sample;
        self.remaining -= 1;
        if self.remaining > 0 {
            return None;
        }

        let average = self.accumulator / self.window as f32;
        self.last_average = average;
        self.average_ready = true;
        self.accumulator = 0.0;
        self.remaining = self.window;
        Some(average)
    }

    /// Take the pending average, if any. Clears the ready flag.
    pub fn take_average(&mut self) -> Option<f32> {
        if self.average_ready {
            self.average_ready = false;
            Some(self.last_average)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.average_ready
    }

    /// Samples still missing from the current window.
    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    pub fn last_average(&self) -> f32 {
        self.last_average
    }

    pub fn window(&self) -> u8 {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_samples_make_one_average() {
        let mut avg = AveragingState::new(10);
        let samples = [28.0, 29.0, 30.0, 31.0, 32.0, 30.5, 29.5, 30.0, 30.0, 29.0];

        for s in &samples[..9] {
            assert_eq!(avg.push(*s), None);
            assert!(!avg.is_ready());
        }
        let expected = samples.iter().sum::<f32>() / 10.0;
        let average = avg.push(samples[9]).unwrap();
        assert!((average - expected).abs() < 1e-4);

        assert!(avg.is_ready());
        assert_eq!(avg.remaining(), 10);
        assert_eq!(avg.take_average(), Some(average));
        assert_eq!(avg.take_average(), None);
        assert_eq!(avg.last_average(), average);
    }

    #[test]
    fn constant_pressure_averages_to_itself() {
        let mut avg = AveragingState::new(10);
        let results: heapless::Vec<Option<f32>, 10> = (0..10).map(|_| avg.push(30.0)).collect();
        assert_eq!(results[9], Some(30.0));
        assert!(results[..9].iter().all(Option::is_none));
    }

    #[test]
    fn negative_samples_do_not_count() {
        let mut avg = AveragingState::new(3);
        avg.push(2.0);
        assert_eq!(avg.push(-1.0), None);
        assert_eq!(avg.push(f32::NAN), None);
        assert_eq!(avg.remaining(), 2);
        avg.push(4.0);
        assert_eq!(avg.push(6.0), Some(4.0));
    }

    #[test]
    fn remaining_stays_in_window() {
        let mut avg = AveragingState::new(10);
        for i in 0..35 {
            avg.push(i as f32);
            assert!((1..=10).contains(&avg.remaining()));
        }
    }

    #[test]
    fn zero_window_is_clamped() {
        let mut avg = AveragingState::new(0);
        assert_eq!(avg.window(), 1);
        assert_eq!(avg.push(5.0), Some(5.0));
    }
}
