//! Pressure unit conversions

/// Pascals in one bar.
pub const PASCALS_PER_BAR: f32 = 100_000.0;

/// Pascals in one pound per square inch.
pub const PASCALS_PER_PSI: f32 = 6_894.757;

#[inline]
pub fn pa_to_bar(pa: f32) -> f32 {
    pa / PASCALS_PER_BAR
}

#[inline]
pub fn pa_to_psi(pa: f32) -> f32 {
    pa / PASCALS_PER_PSI
}

#[inline]
pub fn psi_to_bar(psi: f32) -> f32 {
    psi * PASCALS_PER_PSI / PASCALS_PER_BAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_atmosphere() {
        let pa = 101_325.0;
        assert!((pa_to_bar(pa) - 1.01325).abs() < 1e-5);
        assert!((pa_to_psi(pa) - 14.6959).abs() < 1e-3);
    }

    #[test]
    fn psi_and_bar_agree() {
        let pa = 206_842.7;
        assert!((psi_to_bar(pa_to_psi(pa)) - pa_to_bar(pa)).abs() < 1e-5);
    }
}
