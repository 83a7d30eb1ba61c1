use crate::culture::{state::TimeSeries, Culture};
use serde::Serialize;

/// Composition of one strain within a culture summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrainSummary {
    pub strain: String,
    pub cell_count: f64,
    /// Live cells per mL.
    pub density: f64,
    /// Share of all live cells in the culture, zero in a culture without cells.
    pub fraction: f64,
    pub lysed_count: f64,
}

/// The "info" report of a culture: volume, media and cell densities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CultureSummary {
    pub culture: String,
    pub volume: f64,
    pub nutrient: f64,
    pub drugs: Vec<(String, f64)>,
    pub total_cell_count: f64,
    pub total_density: f64,
    pub extracellular_enzyme: f64,
    pub strains: Vec<StrainSummary>,
}

fn per_ml(amount: f64, volume: f64) -> f64 {
    if volume > 0.0 {
        amount / volume
    } else {
        0.0
    }
}

pub fn summarize(culture: &Culture) -> CultureSummary {
    let volume = culture.volume();
    let total = culture.total_cell_count();
    let strains = culture
        .inocula()
        .map(|inoculum| StrainSummary {
            strain: inoculum.name().to_string(),
            cell_count: inoculum.cell_count(),
            density: per_ml(inoculum.cell_count(), volume),
            fraction: if total > 0.0 {
                inoculum.cell_count() / total
            } else {
                0.0
            },
            lysed_count: inoculum.lysed_count(),
        })
        .collect();

    CultureSummary {
        culture: culture.name().to_string(),
        volume,
        nutrient: culture.nutrient_concentration().value(),
        drugs: culture
            .media()
            .drugs()
            .iter()
            .map(|(name, c)| (name.clone(), c.value()))
            .collect(),
        total_cell_count: total,
        total_density: per_ml(total, volume),
        extracellular_enzyme: culture.extracellular_enzyme_conc().value(),
        strains,
    }
}

/// Live cells of `strain` at the end of the series relative to the start.
///
/// `None` when the strain is missing from the series or started without cells.
pub fn surviving_fraction(series: &TimeSeries, strain: &str) -> Option<f64> {
    let start = series.first()?.inocula.get(strain)?.cell_count;
    let end = series.last()?.inocula.get(strain)?.cell_count;
    (start > 0.0).then(|| end / start)
}
