//! Cultures and the mixing algebra between them.
//!
//! Liquid is moved around the bench with two operations. [`Culture::sample`] draws a
//! sub-volume: concentrations are unchanged and every extensive quantity follows the
//! volume fraction. [`Culture::merged`] pours two cultures together: volumes and
//! extensive quantities add, concentrations become volume-weighted averages.
//! [`Culture::add`] is the in-place form that consumes the poured culture.

pub mod builder;
pub mod state;

use crate::{
    dynamics::{CultureEnvironment, Dynamics, RunSummary},
    error::{non_negative, CrobeError},
    inoculum::Inoculum,
    media::Media,
    quantity::Concentration,
};
use builder::CultureBuilder;
use state::{CultureSnapshot, TimeSeries};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Culture {
    name: String,
    media: Media,
    inocula: BTreeMap<String, Inoculum>,
    dynamics: Option<Arc<dyn Dynamics>>,
    history: TimeSeries,
}

impl Culture {
    /// An empty vessel with no liquid and no kinetics.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            media: Media::default(),
            inocula: BTreeMap::new(),
            dynamics: None,
            history: TimeSeries::default(),
        }
    }

    pub fn builder(name: &str) -> CultureBuilder {
        CultureBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    pub fn volume(&self) -> f64 {
        self.media.volume()
    }

    pub fn nutrient_concentration(&self) -> Concentration {
        self.media.nutrient()
    }

    pub fn drug_concentration(&self, drug: &str) -> Concentration {
        self.media.drug(drug)
    }

    pub fn inocula(&self) -> impl Iterator<Item = &Inoculum> {
        self.inocula.values()
    }

    pub fn inoculum(&self, strain: &str) -> Option<&Inoculum> {
        self.inocula.get(strain)
    }

    /// Live cells of `strain`, zero when the strain is absent.
    pub fn cell_count(&self, strain: &str) -> f64 {
        self.inocula.get(strain).map_or(0.0, Inoculum::cell_count)
    }

    pub fn total_cell_count(&self) -> f64 {
        self.inocula.values().map(Inoculum::cell_count).sum()
    }

    /// Extracellular enzyme of all strains together.
    pub fn extracellular_enzyme_conc(&self) -> Concentration {
        let total: f64 = self.inocula.values().map(|i| i.bla_extracellular).sum();
        Concentration::clamped(if self.volume() > 0.0 {
            total / self.volume()
        } else {
            0.0
        })
    }

    pub fn dynamics(&self) -> Option<&Arc<dyn Dynamics>> {
        self.dynamics.as_ref()
    }

    /// Time series of the most recent run; empty before the first one.
    pub fn history(&self) -> &TimeSeries {
        &self.history
    }

    /// Current state, timestamped with the end of the most recent run.
    pub fn snapshot(&self) -> CultureSnapshot {
        let time = self.history.last().map_or(0.0, |point| point.time);
        self.snapshot_at(time, None)
    }

    pub(crate) fn snapshot_at(&self, time: f64, temperature: Option<f64>) -> CultureSnapshot {
        let volume = self.volume();
        CultureSnapshot {
            time,
            temperature,
            volume,
            nutrient: self.media.nutrient().value(),
            drugs: self
                .media
                .drugs()
                .iter()
                .map(|(name, c)| (name.clone(), c.value()))
                .collect(),
            inocula: self
                .inocula
                .iter()
                .map(|(name, inoculum)| (name.clone(), inoculum.snapshot(volume)))
                .collect(),
        }
    }

    /// Pours `a` and `b` together into a new culture carrying `a`'s name and dynamics.
    ///
    /// # Errors
    ///
    /// `StrainMismatch` when both sides hold a strain of the same name with different
    /// parameters.
    pub fn merged(a: &Culture, b: &Culture) -> Result<Culture, CrobeError> {
        let mut inocula = a.inocula.clone();
        for (name, inoculum) in &b.inocula {
            match inocula.get_mut(name) {
                Some(existing) => existing.merge(inoculum)?,
                None => {
                    inocula.insert(name.clone(), inoculum.clone());
                }
            }
        }
        Ok(Culture {
            name: a.name.clone(),
            media: Media::merged(&a.media, &b.media),
            inocula,
            dynamics: a.dynamics.clone(),
            history: a.history.clone(),
        })
    }

    /// Pours `other` into this culture. On error this culture is left unchanged.
    pub fn add(&mut self, other: Culture) -> Result<(), CrobeError> {
        *self = Culture::merged(self, &other)?;
        Ok(())
    }

    /// Draws `volume` mL out of this culture.
    ///
    /// # Errors
    ///
    /// `InsufficientVolume` when more than the current volume is requested; the source
    /// is not modified in that case.
    pub fn sample(&mut self, volume: f64) -> Result<Culture, CrobeError> {
        let volume = self.media.checked_draw(&self.name, volume)?;
        let fraction = if self.volume() > 0.0 {
            volume / self.volume()
        } else {
            0.0
        };
        let media = self.media.split_off(volume)?;
        let inocula = self
            .inocula
            .iter_mut()
            .map(|(name, inoculum)| (name.clone(), inoculum.split_off(fraction)))
            .collect();

        Ok(Culture {
            name: format!("{} sample", self.name),
            media,
            inocula,
            dynamics: None,
            history: TimeSeries::default(),
        })
    }

    /// Draws `fraction` (between 0 and 1) of the current volume.
    pub fn sample_fraction(&mut self, fraction: f64) -> Result<Culture, CrobeError> {
        let fraction = non_negative("sample fraction", fraction)?;
        if fraction > 1.0 {
            return Err(CrobeError::invalid(
                "sample fraction",
                fraction,
                "must not exceed 1",
            ));
        }
        self.sample(self.volume() * fraction)
    }

    /// Runs the attached dynamics for `total_time` hours.
    ///
    /// A culture without dynamics is a static reservoir: nothing changes and the
    /// summary is marked as skipped.
    pub fn run(
        &mut self,
        total_time: f64,
        dt: f64,
        env: &mut CultureEnvironment,
    ) -> Result<RunSummary, CrobeError> {
        match self.dynamics.clone() {
            Some(dynamics) => dynamics.run(self, total_time, dt, env),
            None => {
                tracing::debug!(culture = %self.name, "no dynamics attached, skipping");
                Ok(RunSummary::skipped(&self.name))
            }
        }
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Media, &mut BTreeMap<String, Inoculum>) {
        (&mut self.media, &mut self.inocula)
    }

    pub(crate) fn set_history(&mut self, history: TimeSeries) {
        self.history = history;
    }
}
