//! Shared incubation of several cultures under a noisy temperature.
//!
//! Every culture sees `set_temp + batch + location + transient`. The batch offset is
//! drawn once per [`Incubator::incubate`] call and shared by all cultures in it; the
//! location offset is drawn the first time a culture is incubated and kept for as long
//! as the incubator lives; the transient offset is redrawn every step from the
//! culture's own random stream.

use crate::{
    culture::Culture,
    dynamics::{CultureEnvironment, RunSummary},
    error::{non_negative, positive, CrobeError},
};
use crobe_schemas::environment::IncubatorSettings;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use std::collections::HashMap;

/// Temperature offsets applied to one culture during its most recent incubation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalAssignment {
    pub batch_offset: f64,
    pub location_offset: f64,
}

impl ThermalAssignment {
    pub fn temperature(&self, set_temp: f64) -> f64 {
        set_temp + self.batch_offset + self.location_offset
    }
}

#[derive(Debug)]
pub struct Incubator {
    settings: IncubatorSettings,
    batch: Normal<f64>,
    location: Normal<f64>,
    rng: ChaCha8Rng,
    registry: HashMap<String, ThermalAssignment>,
}

fn deviation(field: &str, std: f64) -> Result<Normal<f64>, CrobeError> {
    let std = non_negative(field, std)?;
    Normal::new(0.0, std).map_err(|_| CrobeError::invalid(field, std, "not a valid deviation"))
}

impl Incubator {
    pub fn new(settings: IncubatorSettings) -> Result<Self, CrobeError> {
        if !settings.set_temp.is_finite() {
            return Err(CrobeError::invalid("set_temp", settings.set_temp, "must be finite"));
        }
        let batch = deviation("temp_std_batch", settings.temp_std_batch)?;
        let location = deviation("temp_std_location", settings.temp_std_location)?;
        non_negative("temp_std_transient", settings.temp_std_transient)?;

        Ok(Self {
            settings,
            batch,
            location,
            rng: ChaCha8Rng::seed_from_u64(0),
            registry: HashMap::new(),
        })
    }

    /// Restarts the master random stream from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn settings(&self) -> &IncubatorSettings {
        &self.settings
    }

    /// Offsets the named culture received the last time it was incubated.
    pub fn assignment(&self, culture: &str) -> Option<&ThermalAssignment> {
        self.registry.get(culture)
    }

    /// Runs every culture's dynamics for `time` hours in steps of `dt`.
    ///
    /// All random draws are taken from the master stream in slice order before any
    /// culture is stepped, so the outcome does not depend on how the parallel runs are
    /// scheduled. Summaries come back in slice order.
    pub fn incubate(
        &mut self,
        cultures: &mut [&mut Culture],
        time: f64,
        dt: f64,
    ) -> Result<Vec<RunSummary>, CrobeError> {
        let dt = positive("dt", dt)?;
        let time = non_negative("time", time)?;

        let batch_offset = self.batch.sample(&mut self.rng);
        let mut plans = Vec::with_capacity(cultures.len());
        for culture in cultures.iter() {
            let location_offset = match self.registry.get(culture.name()) {
                Some(previous) => previous.location_offset,
                None => self.location.sample(&mut self.rng),
            };
            let assignment = ThermalAssignment {
                batch_offset,
                location_offset,
            };
            self.registry.insert(culture.name().to_string(), assignment);
            plans.push((assignment, self.rng.next_u64()));
        }

        tracing::info!(
            cultures = cultures.len(),
            time,
            dt,
            batch_offset,
            "Incubating"
        );

        let set_temp = self.settings.set_temp;
        let transient_std = self.settings.temp_std_transient;
        cultures
            .par_iter_mut()
            .zip(plans.par_iter())
            .map(|(culture, (assignment, seed))| {
                if culture.dynamics().is_none() {
                    tracing::debug!(culture = %culture.name(), "no dynamics attached, skipping");
                    return Ok(RunSummary::skipped(culture.name()));
                }
                let mut env = CultureEnvironment::new(
                    assignment.temperature(set_temp),
                    transient_std,
                    *seed,
                )?;
                culture.run(time, dt, &mut env)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dynamics::BetaLactamaseDynamics, inoculum::Inoculum, media::Media,
        strain::fixtures::shared_tem,
    };
    use std::sync::Arc;

    fn settings(batch: f64, location: f64, transient: f64) -> IncubatorSettings {
        IncubatorSettings {
            set_temp: 37.0,
            temp_std_batch: batch,
            temp_std_location: location,
            temp_std_transient: transient,
        }
    }

    fn growing(name: &str, vmax: f64) -> Culture {
        Culture::builder(name)
            .with_media(
                Media::new(1.0)
                    .unwrap()
                    .with_nutrient(2.0e9)
                    .unwrap()
                    .with_drug("CTX", 0.1)
                    .unwrap(),
            )
            .with_inoculum(Inoculum::new(&shared_tem(vmax), 1.0e6).unwrap())
            .with_dynamics(Arc::new(BetaLactamaseDynamics::default()))
            .build()
            .unwrap()
    }

    #[test]
    fn noiseless_incubation_runs_at_the_set_temperature() {
        let mut incubator = Incubator::new(settings(0.0, 0.0, 0.0)).unwrap();
        let mut culture = growing("flask", 0.0);
        let summaries = incubator.incubate(&mut [&mut culture], 1.0, 0.1).unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].steps, 10);
        assert_eq!(summaries[0].mean_temperature, Some(37.0));
        assert_eq!(culture.history().len(), 11);
        assert!(culture.cell_count("TEM-0") > 1.0e6);
    }

    #[test]
    fn same_seed_gives_identical_histories() {
        let run = || {
            let mut incubator = Incubator::new(settings(0.5, 0.5, 0.2)).unwrap().with_seed(11);
            let mut a = growing("a", 0.0);
            let mut b = growing("b", 100.0);
            incubator.incubate(&mut [&mut a, &mut b], 2.0, 0.05).unwrap();
            (a.history().clone(), b.history().clone())
        };
        let serial = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(run);

        assert_eq!(run(), serial);
        assert_ne!(serial.0.last().unwrap().temperature, serial.1.last().unwrap().temperature);
    }

    #[test]
    fn location_is_kept_and_batch_is_redrawn() {
        let mut incubator = Incubator::new(settings(1.0, 1.0, 0.0)).unwrap().with_seed(3);
        let mut culture = growing("flask", 0.0);

        incubator.incubate(&mut [&mut culture], 0.1, 0.1).unwrap();
        let first = *incubator.assignment("flask").unwrap();
        incubator.incubate(&mut [&mut culture], 0.1, 0.1).unwrap();
        let second = *incubator.assignment("flask").unwrap();

        assert_eq!(first.location_offset, second.location_offset);
        assert_ne!(first.batch_offset, second.batch_offset);
        assert!(incubator.assignment("elsewhere").is_none());
    }

    #[test]
    fn cultures_without_dynamics_are_skipped() {
        let mut incubator = Incubator::new(IncubatorSettings::default()).unwrap();
        let mut stock = Culture::builder("LB Stock")
            .with_media(Media::new(100.0).unwrap().with_nutrient(2.0e9).unwrap())
            .build()
            .unwrap();
        let mut flask = growing("flask", 0.0);

        let summaries = incubator
            .incubate(&mut [&mut stock, &mut flask], 1.0, 0.1)
            .unwrap();

        assert!(summaries[0].skipped);
        assert!(!summaries[1].skipped);
        assert_eq!(stock.nutrient_concentration().value(), 2.0e9);
        assert!(stock.history().is_empty());
    }

    #[test]
    fn invalid_settings_and_steps_are_rejected() {
        assert!(Incubator::new(settings(-1.0, 0.0, 0.0)).is_err());
        assert!(Incubator::new(settings(0.0, 0.0, f64::NAN)).is_err());

        let mut incubator = Incubator::new(IncubatorSettings::default()).unwrap();
        let mut culture = growing("flask", 0.0);
        assert!(incubator.incubate(&mut [&mut culture], 1.0, 0.0).is_err());
        assert!(incubator.incubate(&mut [&mut culture], -1.0, 0.1).is_err());
        assert!(culture.history().is_empty());
    }
}
