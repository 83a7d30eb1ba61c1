use super::{state::TimeSeries, Culture};
use crate::{dynamics::Dynamics, error::CrobeError, inoculum::Inoculum, media::Media};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A fluent builder for constructing a `Culture`.
///
/// Media defaults to an empty vessel and dynamics to none (a static reservoir).
/// Inocula of the same strain are merged as they are added.
pub struct CultureBuilder {
    name: String,
    media: Option<Media>,
    inocula: Vec<Inoculum>,
    dynamics: Option<Arc<dyn Dynamics>>,
}

impl CultureBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            media: None,
            inocula: Vec::new(),
            dynamics: None,
        }
    }

    pub fn with_media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_inoculum(mut self, inoculum: Inoculum) -> Self {
        self.inocula.push(inoculum);
        self
    }

    pub fn with_inocula(mut self, inocula: Vec<Inoculum>) -> Self {
        self.inocula.extend(inocula);
        self
    }

    pub fn with_dynamics(mut self, dynamics: Arc<dyn Dynamics>) -> Self {
        self.dynamics = Some(dynamics);
        self
    }

    /// Consumes the builder and returns the culture.
    ///
    /// # Errors
    ///
    /// Returns `StrainMismatch` if two inocula share a strain name but not a definition.
    pub fn build(self) -> Result<Culture, CrobeError> {
        let mut inocula: BTreeMap<String, Inoculum> = BTreeMap::new();
        for inoculum in self.inocula {
            match inocula.get_mut(inoculum.name()) {
                Some(existing) => existing.merge(&inoculum)?,
                None => {
                    inocula.insert(inoculum.name().to_string(), inoculum);
                }
            }
        }

        Ok(Culture {
            name: self.name,
            media: self.media.unwrap_or_default(),
            inocula,
            dynamics: self.dynamics,
            history: TimeSeries::default(),
        })
    }
}
