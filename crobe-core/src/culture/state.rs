use crate::inoculum::InoculumSnapshot;
use serde::Serialize;
use std::collections::BTreeMap;

/// Measurable state of a culture at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CultureSnapshot {
    /// Hours since the start of the run that produced this point.
    pub time: f64,
    /// Effective temperature of the step that ended here; absent for initial points.
    pub temperature: Option<f64>,
    pub volume: f64,
    pub nutrient: f64,
    pub drugs: BTreeMap<String, f64>,
    pub inocula: BTreeMap<String, InoculumSnapshot>,
}

impl CultureSnapshot {
    pub fn total_cell_count(&self) -> f64 {
        self.inocula.values().map(|i| i.cell_count).sum()
    }

    pub fn value(&self, quantity: &Quantity) -> f64 {
        let inoculum = |strain: &str| self.inocula.get(strain);
        match quantity {
            Quantity::Volume => self.volume,
            Quantity::Nutrient => self.nutrient,
            Quantity::Drug(drug) => self.drugs.get(drug).copied().unwrap_or(0.0),
            Quantity::TotalCellCount => self.total_cell_count(),
            Quantity::CellCount(strain) => inoculum(strain).map_or(0.0, |i| i.cell_count),
            Quantity::CellDensity(strain) => inoculum(strain).map_or(0.0, |i| i.cell_density),
            Quantity::LysedCount(strain) => inoculum(strain).map_or(0.0, |i| i.lysed_count),
            Quantity::IntracellularEnzyme(strain) => {
                inoculum(strain).map_or(0.0, |i| i.bla_intracellular_conc)
            }
            Quantity::ExtracellularEnzyme(strain) => {
                inoculum(strain).map_or(0.0, |i| i.bla_extracellular_conc)
            }
            Quantity::IntracellularDrug { strain, drug } => inoculum(strain)
                .and_then(|i| i.drug_intracellular_conc.get(drug))
                .copied()
                .unwrap_or(0.0),
        }
    }
}

/// A single tracked quantity that can be pulled out of a time series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Quantity {
    Volume,
    Nutrient,
    Drug(String),
    TotalCellCount,
    CellCount(String),
    CellDensity(String),
    LysedCount(String),
    IntracellularEnzyme(String),
    ExtracellularEnzyme(String),
    IntracellularDrug { strain: String, drug: String },
}

/// Snapshots recorded over the most recent run of a culture.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<CultureSnapshot>,
    clamp_count: u64,
}

impl TimeSeries {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            clamp_count: 0,
        }
    }

    pub(crate) fn push(&mut self, snapshot: CultureSnapshot) {
        self.points.push(snapshot);
    }

    pub(crate) fn set_clamp_count(&mut self, count: u64) {
        self.clamp_count = count;
    }

    pub fn points(&self) -> &[CultureSnapshot] {
        &self.points
    }

    pub fn first(&self) -> Option<&CultureSnapshot> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&CultureSnapshot> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of values floored at zero during the run.
    pub fn clamp_count(&self) -> u64 {
        self.clamp_count
    }

    /// `(time, value)` pairs of one quantity, in time order.
    pub fn series(&self, quantity: &Quantity) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|point| (point.time, point.value(quantity)))
            .collect()
    }
}
