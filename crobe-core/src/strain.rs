//! Validation and sharing of strain definitions.
//!
//! A `Strain` record is checked once, wrapped in an `Arc`, and from then on referenced
//! (never copied) by every inoculum of that strain.

use crate::error::{non_negative, positive, CrobeError};
use crobe_schemas::strain::{BetaLactamase, Strain};
use std::sync::Arc;

/// Validates `strain` and returns the shared handle used by inocula.
pub fn share(strain: Strain) -> Result<Arc<Strain>, CrobeError> {
    validate(&strain)?;
    Ok(Arc::new(strain))
}

pub fn validate(strain: &Strain) -> Result<(), CrobeError> {
    let field = |name: &str| format!("{}.{}", strain.name, name);

    for (name, value) in [
        ("max_growth_rate", strain.max_growth_rate),
        ("max_lysis_rate", strain.max_lysis_rate),
        ("halfmax_lysis_drug_conc", strain.halfmax_lysis_drug_conc),
        ("mean_lag_exit_time", strain.mean_lag_exit_time),
        ("stdev_lag_exit_time", strain.stdev_lag_exit_time),
        ("halfmax_growth_nutrient_conc", strain.halfmax_growth_nutrient_conc),
        ("nutrient_consumption_rate", strain.nutrient_consumption_rate),
        ("bla_production_rate", strain.bla_production_rate),
        ("halfmax_bla_production_conc", strain.halfmax_bla_production_conc),
        ("bla_leak_rate", strain.bla_leak_rate),
        ("drug_diffusion_rate", strain.drug_diffusion_rate),
    ] {
        non_negative(&field(name), value)?;
    }

    positive(&field("lysis_hill_coefficient"), strain.lysis_hill_coefficient)?;
    positive(&field("bla_saturation_conc"), strain.bla_saturation_conc)?;
    positive(&field("periplasm_volume"), strain.periplasm_volume)?;

    for (name, value) in [
        ("bla_debris_sink_fraction", strain.bla_debris_sink_fraction),
        ("drug_debris_sink_fraction", strain.drug_debris_sink_fraction),
    ] {
        if non_negative(&field(name), value)? > 1.0 {
            return Err(CrobeError::invalid(field(name), value, "must lie in [0, 1]"));
        }
    }

    if !strain.optimal_temp.is_finite() {
        return Err(CrobeError::invalid(
            field("optimal_temp"),
            strain.optimal_temp,
            "must be finite",
        ));
    }

    validate_enzyme(&strain.betalactamase)
}

pub fn validate_enzyme(enzyme: &BetaLactamase) -> Result<(), CrobeError> {
    let field = |name: &str| format!("{}.{}", enzyme.name, name);
    non_negative(&field("decay_rate_intracellular"), enzyme.decay_rate_intracellular)?;
    non_negative(&field("decay_rate_extracellular"), enzyme.decay_rate_extracellular)?;
    non_negative(&field("max_hydrolysis_rate"), enzyme.max_hydrolysis_rate)?;
    non_negative(
        &field("halfmax_hydrolysis_drug_conc"),
        enzyme.halfmax_hydrolysis_drug_conc,
    )?;
    Ok(())
}

/// True when both handles describe the same strain, by identity or by value.
pub fn same_definition(a: &Arc<Strain>, b: &Arc<Strain>) -> bool {
    Arc::ptr_eq(a, b) || **a == **b
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// The TEM series strain used throughout the tests, with the given Vmax.
    pub fn tem(vmax: f64) -> Strain {
        Strain {
            name: format!("TEM-{}", vmax as i64),
            max_growth_rate: 2.0,
            max_lysis_rate: 1.0,
            halfmax_lysis_drug_conc: 0.125,
            lysis_hill_coefficient: 5.0,
            optimal_temp: 37.0,
            mean_lag_exit_time: 1.5,
            stdev_lag_exit_time: 0.125,
            halfmax_growth_nutrient_conc: 7.0e9,
            nutrient_consumption_rate: 1.0,
            bla_production_rate: 1.0,
            bla_saturation_conc: 1.0,
            halfmax_bla_production_conc: 0.01,
            bla_leak_rate: 0.0,
            bla_debris_sink_fraction: 0.0,
            drug_diffusion_rate: 50.0,
            drug_debris_sink_fraction: 0.0,
            periplasm_volume: 0.16 * 1.3e-12,
            betalactamase: BetaLactamase {
                name: format!("Bla-TEM-{}", vmax as i64),
                decay_rate_intracellular: 0.0,
                decay_rate_extracellular: 0.0,
                max_hydrolysis_rate: vmax,
                halfmax_hydrolysis_drug_conc: 10.0,
                is_intracellular: true,
            },
            marker: String::new(),
            plasmids: Vec::new(),
        }
    }

    pub fn shared_tem(vmax: f64) -> Arc<Strain> {
        share(tem(vmax)).expect("fixture strain is valid")
    }
}
