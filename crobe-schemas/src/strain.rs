//! Defines the parameter records for a bacterial strain and the beta-lactamase it carries.
//! Both records are immutable once loaded; the core shares a validated `Strain` by reference
//! across every inoculum of that strain.

use serde::{Deserialize, Serialize};

/// A beta-lactamase enzyme definition.
///
/// Rates are per hour, concentrations in ug/mL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaLactamase {
    pub name: String,
    /// First-order decay of enzyme held in the periplasm.
    pub decay_rate_intracellular: f64,
    /// First-order decay of enzyme free in the medium.
    pub decay_rate_extracellular: f64,
    /// Vmax of drug hydrolysis per unit enzyme concentration.
    pub max_hydrolysis_rate: f64,
    /// Km of drug hydrolysis.
    pub halfmax_hydrolysis_drug_conc: f64,
    /// Whether the enzyme stays in the periplasm (true) or is secreted into the medium.
    pub is_intracellular: bool,
}

/// The complete kinetic definition of a strain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strain {
    pub name: String,

    pub max_growth_rate: f64,
    pub max_lysis_rate: f64,
    /// Drug concentration at which the lysis rate is half maximal.
    pub halfmax_lysis_drug_conc: f64,
    pub lysis_hill_coefficient: f64,

    /// Temperature (degrees C) at which all strain rates are unpenalized.
    pub optimal_temp: f64,
    pub mean_lag_exit_time: f64,
    pub stdev_lag_exit_time: f64,

    /// Monod constant for growth, in nutrient units (cell equivalents per mL).
    pub halfmax_growth_nutrient_conc: f64,
    /// Nutrient consumed per new cell.
    pub nutrient_consumption_rate: f64,

    pub bla_production_rate: f64,
    /// Enzyme concentration at which production stops.
    pub bla_saturation_conc: f64,
    /// Inducer (drug) concentration giving half-maximal production.
    pub halfmax_bla_production_conc: f64,
    /// Rate at which periplasmic enzyme escapes to the medium.
    pub bla_leak_rate: f64,
    /// Fraction of enzyme lost with debris when a cell lyses.
    pub bla_debris_sink_fraction: f64,

    pub drug_diffusion_rate: f64,
    /// Fraction of periplasmic drug lost with debris when a cell lyses.
    pub drug_debris_sink_fraction: f64,
    /// Periplasm volume of a single cell, in mL.
    pub periplasm_volume: f64,

    pub betalactamase: BetaLactamase,

    #[serde(default)]
    pub marker: String,
    #[serde(default)]
    pub plasmids: Vec<String>,
}
