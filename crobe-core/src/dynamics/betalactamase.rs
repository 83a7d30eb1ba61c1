//! Growth, lysis and beta-lactamase kinetics.
//!
//! Each strain's cells sit in a well-mixed medium. Drug diffuses between the medium and
//! the periplasm of live cells; beta-lactamase hydrolyses drug in whichever compartment
//! it lives in; cells lyse at a Hill rate of the drug they are exposed to and release
//! what their periplasm held. All strain rate constants are scaled by a Gaussian
//! temperature penalty. Integration is forward Euler with every value floored at zero
//! and every floor counted.

use super::{
    kinetics::{hill, saturation, temperature_factor},
    Dynamics, RunState, StepInput, StepReport,
};
use crate::{culture::Culture, error::positive, error::CrobeError};
use rand::RngCore;
use rand_distr::{Distribution, Normal};
use std::collections::{BTreeMap, BTreeSet};

/// Default width (degrees C) of the temperature penalty.
pub const DEFAULT_TEMPERATURE_TOLERANCE: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BetaLactamaseDynamics {
    temperature_tolerance: f64,
}

impl Default for BetaLactamaseDynamics {
    fn default() -> Self {
        Self {
            temperature_tolerance: DEFAULT_TEMPERATURE_TOLERANCE,
        }
    }
}

/// Time derivatives of one inoculum.
#[derive(Debug, Default)]
struct InoculumRates {
    cells: f64,
    lysed: f64,
    bla_intracellular: f64,
    bla_extracellular: f64,
    drug_intracellular: BTreeMap<String, f64>,
}

impl BetaLactamaseDynamics {
    pub fn new(temperature_tolerance: f64) -> Result<Self, CrobeError> {
        Ok(Self {
            temperature_tolerance: positive("temperature_tolerance", temperature_tolerance)?,
        })
    }

    pub fn temperature_tolerance(&self) -> f64 {
        self.temperature_tolerance
    }
}

impl Dynamics for BetaLactamaseDynamics {
    fn label(&self) -> &str {
        "beta-lactamase"
    }

    fn begin_run(&self, culture: &Culture, rng: &mut dyn RngCore) -> RunState {
        culture.inocula().fold(RunState::default(), |run, inoculum| {
            let strain = inoculum.strain();
            let lag = Normal::new(strain.mean_lag_exit_time, strain.stdev_lag_exit_time)
                .map(|distribution| distribution.sample(&mut *rng))
                .unwrap_or(strain.mean_lag_exit_time);
            run.with_lag_exit(&strain.name, lag.max(0.0))
        })
    }

    fn step(&self, culture: &mut Culture, run: &RunState, input: StepInput) -> StepReport {
        let StepInput {
            time,
            dt,
            temperature,
        } = input;
        let (media, inocula) = culture.parts_mut();
        let volume = media.volume();
        if volume <= 0.0 || dt <= 0.0 {
            return StepReport::default();
        }

        let nutrient = media.nutrient().value();
        let drug_names: BTreeSet<String> = media
            .drugs()
            .keys()
            .cloned()
            .chain(inocula.values().flat_map(|i| i.drug_intracellular.keys().cloned()))
            .collect();
        let drugs: BTreeMap<&str, f64> = drug_names
            .iter()
            .map(|name| (name.as_str(), media.drug(name).value()))
            .collect();
        let total_drug: f64 = drugs.values().sum();

        let mut nutrient_rate = 0.0;
        let mut drug_rates: BTreeMap<&str, f64> = drugs.keys().map(|name| (*name, 0.0)).collect();
        let mut rates: BTreeMap<String, InoculumRates> = BTreeMap::new();

        for (name, inoculum) in inocula.iter() {
            let strain = inoculum.strain();
            let enzyme = &strain.betalactamase;
            let phi =
                temperature_factor(temperature, strain.optimal_temp, self.temperature_tolerance);

            let cells = inoculum.cell_count;
            let periplasm = inoculum.periplasm_volume();
            let per_periplasm = |amount: f64| {
                if periplasm > 0.0 {
                    amount / periplasm
                } else {
                    0.0
                }
            };
            let bla_intra = inoculum.bla_intracellular;
            let bla_extra = inoculum.bla_extracellular;
            let enzyme_intra = per_periplasm(bla_intra);
            let enzyme_extra = bla_extra / volume;

            let exposure = if enzyme.is_intracellular {
                drugs
                    .keys()
                    .map(|drug| {
                        let held = inoculum.drug_intracellular.get(*drug).copied();
                        per_periplasm(held.unwrap_or(0.0))
                    })
                    .sum::<f64>()
            } else {
                total_drug
            };

            let mut r = InoculumRates::default();

            // growth, gated by lag exit and coupled to nutrient use
            let growth = if run.has_exited_lag(name, time) {
                cells * strain.max_growth_rate * phi
                    * saturation(nutrient, strain.halfmax_growth_nutrient_conc)
            } else {
                0.0
            };
            nutrient_rate -= growth * strain.nutrient_consumption_rate / volume;

            let lysis_rate = strain.max_lysis_rate
                * phi
                * hill(exposure, strain.halfmax_lysis_drug_conc, strain.lysis_hill_coefficient);
            let lysed = lysis_rate * cells;
            r.cells = growth - lysed;
            r.lysed = lysed;

            // production scales with live periplasm and lands where the enzyme lives
            let induction = saturation(exposure, strain.halfmax_bla_production_conc);
            let current = if enzyme.is_intracellular {
                enzyme_intra
            } else {
                enzyme_extra
            };
            let headroom = (1.0 - current / strain.bla_saturation_conc).max(0.0);
            let production = strain.bla_production_rate * phi * induction * headroom * periplasm;
            if enzyme.is_intracellular {
                r.bla_intracellular += production;
            } else {
                r.bla_extracellular += production;
            }

            let leak = strain.bla_leak_rate * phi * bla_intra;
            let released_bla = lysis_rate * bla_intra;
            r.bla_intracellular -=
                enzyme.decay_rate_intracellular * bla_intra + leak + released_bla;
            r.bla_extracellular += leak + released_bla * (1.0 - strain.bla_debris_sink_fraction)
                - enzyme.decay_rate_extracellular * bla_extra;

            for (drug, outside) in &drugs {
                let held = inoculum.drug_intracellular.get(*drug).copied().unwrap_or(0.0);
                let inside = per_periplasm(held);

                let influx = strain.drug_diffusion_rate * phi * (outside - inside) * periplasm;
                let hydrolysed_inside = enzyme.max_hydrolysis_rate
                    * enzyme_intra
                    * saturation(inside, enzyme.halfmax_hydrolysis_drug_conc)
                    * periplasm;
                let hydrolysed_outside = enzyme.max_hydrolysis_rate
                    * enzyme_extra
                    * saturation(*outside, enzyme.halfmax_hydrolysis_drug_conc);
                let released = lysis_rate * held;

                r.drug_intracellular
                    .insert(drug.to_string(), influx - hydrolysed_inside - released);
                if let Some(rate) = drug_rates.get_mut(drug) {
                    *rate += (released * (1.0 - strain.drug_debris_sink_fraction) - influx) / volume
                        - hydrolysed_outside;
                }
            }

            rates.insert(name.clone(), r);
        }

        let mut clamped = 0;
        let mut euler = |value: f64, rate: f64| {
            let next = value + dt * rate;
            if next < 0.0 {
                clamped += 1;
                0.0
            } else {
                next
            }
        };

        media.set_nutrient(euler(nutrient, nutrient_rate));
        for (drug, rate) in &drug_rates {
            media.set_drug(drug, euler(drugs[drug], *rate));
        }
        for (name, inoculum) in inocula.iter_mut() {
            let Some(r) = rates.remove(name) else {
                continue;
            };
            inoculum.cell_count = euler(inoculum.cell_count, r.cells);
            inoculum.lysed_count = euler(inoculum.lysed_count, r.lysed);
            inoculum.bla_intracellular = euler(inoculum.bla_intracellular, r.bla_intracellular);
            inoculum.bla_extracellular = euler(inoculum.bla_extracellular, r.bla_extracellular);
            for (drug, rate) in r.drug_intracellular {
                let held = inoculum.drug_intracellular.entry(drug).or_insert(0.0);
                *held = euler(*held, rate);
            }
        }

        StepReport { clamped }
    }
}
