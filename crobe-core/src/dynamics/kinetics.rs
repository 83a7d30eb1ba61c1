//! Rate laws shared by the kinetic models.

/// Michaelis-Menten / Monod saturation `x / (k + x)`, zero when both are zero.
pub fn saturation(x: f64, half_max: f64) -> f64 {
    let denominator = half_max + x;
    if denominator <= 0.0 {
        0.0
    } else {
        x / denominator
    }
}

/// Hill response `x^h / (x^h + k^h)`.
pub fn hill(x: f64, half_max: f64, coefficient: f64) -> f64 {
    let xh = x.max(0.0).powf(coefficient);
    let denominator = xh + half_max.powf(coefficient);
    if denominator <= 0.0 || !denominator.is_finite() {
        return if x > half_max { 1.0 } else { 0.0 };
    }
    xh / denominator
}

/// Gaussian penalty on the distance from the optimal temperature.
///
/// Exactly 1 at `optimal`, falling to `exp(-1/2)` one `tolerance` away and towards
/// zero beyond.
pub fn temperature_factor(temperature: f64, optimal: f64, tolerance: f64) -> f64 {
    let z = (temperature - optimal) / tolerance;
    (-0.5 * z * z).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_is_half_at_half_max() {
        assert_eq!(saturation(10.0, 10.0), 0.5);
        assert_eq!(saturation(0.0, 0.0), 0.0);
        assert_eq!(saturation(3.0, 0.0), 1.0);
    }

    #[test]
    fn hill_is_sigmoidal() {
        assert!((hill(0.125, 0.125, 5.0) - 0.5).abs() < 1e-12);
        assert!(hill(0.05, 0.125, 5.0) < 0.02);
        assert!(hill(1.0, 0.125, 5.0) > 0.999);
        assert_eq!(hill(0.0, 0.125, 5.0), 0.0);
    }

    #[test]
    fn hill_survives_overflow() {
        assert_eq!(hill(1.0e200, 1.0, 5.0), 1.0);
        assert_eq!(hill(0.0, 0.0, 2.0), 0.0);
    }

    #[test]
    fn temperature_factor_peaks_at_optimum_and_decays_monotonically() {
        assert_eq!(temperature_factor(37.0, 37.0, 4.0), 1.0);
        let mut previous = 1.0;
        for offset in 1..20 {
            let above = temperature_factor(37.0 + offset as f64 * 0.5, 37.0, 4.0);
            let below = temperature_factor(37.0 - offset as f64 * 0.5, 37.0, 4.0);
            assert!((above - below).abs() < 1e-12);
            assert!(above < previous);
            previous = above;
        }
        assert!((temperature_factor(41.0, 37.0, 4.0) - (-0.5f64).exp()).abs() < 1e-12);
    }
}
