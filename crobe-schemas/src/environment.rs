use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Incubator set point and the three standard deviations of its temperature noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncubatorSettings {
    pub set_temp: f64,
    #[serde(default)]
    pub temp_std_batch: f64,
    #[serde(default)]
    pub temp_std_location: f64,
    #[serde(default)]
    pub temp_std_transient: f64,
}

impl Default for IncubatorSettings {
    fn default() -> Self {
        Self {
            set_temp: 37.0,
            temp_std_batch: 0.0,
            temp_std_location: 0.0,
            temp_std_transient: 0.0,
        }
    }
}

/// A volume of liquid medium: mL, nutrient in cell equivalents per mL, drugs in ug/mL.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaSpec {
    pub volume: f64,
    #[serde(default)]
    pub nutrient: f64,
    #[serde(default)]
    pub drugs: BTreeMap<String, f64>,
}
