use crate::{
    error::{non_negative, CrobeError},
    quantity::Concentration,
};
use crobe_schemas::environment::MediaSpec;
use serde::Serialize;
use std::collections::BTreeMap;

/// Relative slack allowed when a draw asks for exactly the remaining volume.
const VOLUME_TOLERANCE: f64 = 1e-12;

/// A well-mixed liquid: volume in mL, nutrient in cell equivalents per mL, drugs in ug/mL.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Media {
    volume: f64,
    nutrient: Concentration,
    drugs: BTreeMap<String, Concentration>,
}

impl Media {
    pub fn new(volume: f64) -> Result<Self, CrobeError> {
        Ok(Self {
            volume: non_negative("volume", volume)?,
            ..Self::default()
        })
    }

    pub fn from_spec(spec: &MediaSpec) -> Result<Self, CrobeError> {
        let mut media = Self::new(spec.volume)?.with_nutrient(spec.nutrient)?;
        for (name, concentration) in &spec.drugs {
            media = media.with_drug(name, *concentration)?;
        }
        Ok(media)
    }

    pub fn with_nutrient(mut self, concentration: f64) -> Result<Self, CrobeError> {
        self.nutrient = Concentration::new(concentration)?;
        Ok(self)
    }

    pub fn with_drug(mut self, name: &str, concentration: f64) -> Result<Self, CrobeError> {
        let concentration = non_negative(&format!("drug '{}'", name), concentration)?;
        self.drugs
            .insert(name.to_string(), Concentration::clamped(concentration));
        Ok(self)
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn nutrient(&self) -> Concentration {
        self.nutrient
    }

    /// Concentration of `name`, zero when the drug is absent.
    pub fn drug(&self, name: &str) -> Concentration {
        self.drugs.get(name).copied().unwrap_or(Concentration::ZERO)
    }

    pub fn drugs(&self) -> &BTreeMap<String, Concentration> {
        &self.drugs
    }

    /// Combines two liquids: volumes add, every concentration is volume weighted.
    pub fn merged(a: &Media, b: &Media) -> Media {
        let mut drugs = BTreeMap::new();
        for name in a.drugs.keys().chain(b.drugs.keys()) {
            drugs.entry(name.clone()).or_insert_with(|| {
                Concentration::mix(a.drug(name), a.volume, b.drug(name), b.volume)
            });
        }
        Media {
            volume: a.volume + b.volume,
            nutrient: Concentration::mix(a.nutrient, a.volume, b.nutrient, b.volume),
            drugs,
        }
    }

    /// Resolves a requested draw against the available volume.
    ///
    /// Returns the volume that will actually be removed, which only differs from
    /// `requested` by rounding when the whole vessel is drawn.
    pub(crate) fn checked_draw(&self, owner: &str, requested: f64) -> Result<f64, CrobeError> {
        let requested = non_negative("sample volume", requested)?;
        let slack = VOLUME_TOLERANCE * self.volume.max(1.0);
        if requested > self.volume + slack {
            return Err(CrobeError::InsufficientVolume {
                culture: owner.to_string(),
                requested,
                available: self.volume,
            });
        }
        Ok(requested.min(self.volume))
    }

    /// Removes `volume` mL, returning it as a new liquid with identical concentrations.
    pub fn split_off(&mut self, volume: f64) -> Result<Media, CrobeError> {
        let volume = self.checked_draw("media", volume)?;
        self.volume -= volume;
        Ok(Media {
            volume,
            nutrient: self.nutrient,
            drugs: self.drugs.clone(),
        })
    }

    pub(crate) fn set_nutrient(&mut self, value: f64) {
        self.nutrient = Concentration::clamped(value);
    }

    pub(crate) fn set_drug(&mut self, name: &str, value: f64) {
        self.drugs
            .insert(name.to_string(), Concentration::clamped(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lb(volume: f64) -> Media {
        Media::new(volume).unwrap().with_nutrient(2.0e9).unwrap()
    }

    #[test]
    fn merge_dilutes_drug_into_stock() {
        let ctx = Media::new(1.0).unwrap().with_drug("CTX", 10.0e3).unwrap();
        let mixed = Media::merged(&lb(25.0), &ctx);

        assert_eq!(mixed.volume(), 26.0);
        assert!((mixed.drug("CTX").value() - 10.0e3 / 26.0).abs() < 1e-9);
        assert!((mixed.nutrient().value() - 2.0e9 * 25.0 / 26.0).abs() < 1e-3);
    }

    #[test]
    fn split_keeps_concentrations_and_removes_volume() {
        let mut stock = lb(1000.0).with_drug("CTX", 5.0).unwrap();
        let part = stock.split_off(25.0).unwrap();

        assert_eq!(part.volume(), 25.0);
        assert_eq!(stock.volume(), 975.0);
        assert_eq!(part.nutrient(), stock.nutrient());
        assert_eq!(part.drug("CTX"), stock.drug("CTX"));
    }

    #[test]
    fn overdraw_leaves_media_untouched() {
        let mut stock = lb(1.0);
        let err = stock.split_off(1.5).unwrap_err();
        assert!(matches!(err, CrobeError::InsufficientVolume { .. }));
        assert_eq!(stock.volume(), 1.0);
    }

    #[test]
    fn absent_drug_reads_as_zero() {
        assert_eq!(lb(1.0).drug("AMP"), Concentration::ZERO);
    }

    #[test]
    fn from_spec_rejects_negative_drug() {
        let mut spec = MediaSpec {
            volume: 1.0,
            ..MediaSpec::default()
        };
        spec.drugs.insert("CTX".to_string(), -1.0);
        assert!(matches!(
            Media::from_spec(&spec),
            Err(CrobeError::InvalidParameter { .. })
        ));
    }
}
