//! Intensive and extensive quantities.
//!
//! A [`Concentration`] does not depend on how much liquid there is and is averaged
//! (volume weighted) when two liquids are mixed. An [`Amount`] scales with volume and
//! is simply added. Converting between the two always goes through a volume in mL.

use crate::error::{non_negative, CrobeError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Concentration(f64);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Concentration {
    pub const ZERO: Concentration = Concentration(0.0);

    pub fn new(value: f64) -> Result<Self, CrobeError> {
        non_negative("concentration", value).map(Self)
    }

    /// Builds a concentration from an integrated value, flooring it at zero.
    pub(crate) fn clamped(value: f64) -> Self {
        Self(value.max(0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn amount_in(self, volume: f64) -> Amount {
        Amount(self.0 * volume)
    }

    /// Volume-weighted mean of two concentrations: `(va*a + vb*b) / (va + vb)`.
    ///
    /// An empty side contributes nothing; mixing two empty volumes yields zero.
    pub fn mix(a: Concentration, volume_a: f64, b: Concentration, volume_b: f64) -> Concentration {
        let total = volume_a + volume_b;
        if total <= 0.0 {
            return Concentration::ZERO;
        }
        Concentration::clamped((a.0 * volume_a + b.0 * volume_b) / total)
    }
}

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn new(value: f64) -> Result<Self, CrobeError> {
        non_negative("amount", value).map(Self)
    }

    pub(crate) fn clamped(value: f64) -> Self {
        Self(value.max(0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Concentration of this amount dissolved in `volume`; zero in an empty volume.
    pub fn concentration_in(self, volume: f64) -> Concentration {
        if volume <= 0.0 {
            Concentration::ZERO
        } else {
            Concentration::clamped(self.0 / volume)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_is_volume_weighted() {
        let mixed = Concentration::mix(
            Concentration::new(2.0e9).unwrap(),
            25.0,
            Concentration::ZERO,
            0.025,
        );
        let expected = 25.0 * 2.0e9 / 25.025;
        assert!((mixed.value() - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn mix_with_empty_side_keeps_other_concentration() {
        let c = Concentration::new(10.0).unwrap();
        assert_eq!(Concentration::mix(c, 0.0, Concentration::new(3.0).unwrap(), 2.0).value(), 3.0);
        assert_eq!(Concentration::mix(c, 0.0, c, 0.0), Concentration::ZERO);
    }

    #[test]
    fn amount_round_trips_through_volume() {
        let c = Concentration::new(4.0).unwrap();
        let amount = c.amount_in(0.5);
        assert_eq!(amount.value(), 2.0);
        assert_eq!(amount.concentration_in(0.5), c);
        assert_eq!(amount.concentration_in(0.0), Concentration::ZERO);
    }

    #[test]
    fn negative_quantities_are_rejected() {
        assert!(Concentration::new(-1.0).is_err());
        assert!(Amount::new(-0.1).is_err());
    }
}
