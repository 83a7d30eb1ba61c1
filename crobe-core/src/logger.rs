use crate::{
    culture::state::{CultureSnapshot, TimeSeries},
    error::CrobeError,
};
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One CSV row: a history point with map-valued columns stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub culture: String,
    pub time: f64,
    pub temperature: Option<f64>,
    pub volume_ml: f64,
    pub nutrient: f64,
    pub total_cell_count: f64,
    pub drugs_json: String,
    pub inocula_json: String,
}

pub struct TimeSeriesLogger {
    path: String,
    writer: Writer<fs::File>,
}

impl TimeSeriesLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CrobeError> {
        let path = path.as_ref().display().to_string();
        let writer = Writer::from_path(&path).map_err(|e| CrobeError::CsvError(path.clone(), e))?;
        Ok(Self { path, writer })
    }

    pub fn log_point(&mut self, culture: &str, point: &CultureSnapshot) -> Result<(), CrobeError> {
        let entry = LogEntry {
            culture: culture.to_string(),
            time: point.time,
            temperature: point.temperature,
            volume_ml: point.volume,
            nutrient: point.nutrient,
            total_cell_count: point.total_cell_count(),
            drugs_json: serde_json::to_string(&point.drugs)?,
            inocula_json: serde_json::to_string(&point.inocula)?,
        };
        self.writer
            .serialize(entry)
            .map_err(|e| CrobeError::CsvError(self.path.clone(), e))
    }

    /// Writes every point of `series` and flushes the file.
    pub fn log_series(&mut self, culture: &str, series: &TimeSeries) -> Result<(), CrobeError> {
        for point in series.points() {
            self.log_point(culture, point)?;
        }
        self.writer
            .flush()
            .map_err(|e| CrobeError::FileIO(self.path.clone(), e))
    }
}

/// Reads back a file written by [`TimeSeriesLogger`].
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<LogEntry>, CrobeError> {
    let path = path.as_ref().display().to_string();
    let mut reader =
        csv::Reader::from_path(&path).map_err(|e| CrobeError::CsvError(path.clone(), e))?;
    reader
        .deserialize::<LogEntry>()
        .map(|record| record.map_err(|e| CrobeError::CsvError(path.clone(), e)))
        .collect()
}
