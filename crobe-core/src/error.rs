use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrobeError {
    #[error("Cannot draw {requested} mL from '{culture}': only {available} mL available")]
    InsufficientVolume {
        culture: String,
        requested: f64,
        available: f64,
    },

    #[error("Strain '{0}' is defined with different parameters on each side of the merge")]
    StrainMismatch(String),

    #[error("Invalid value {value} for '{field}': {reason}")]
    InvalidParameter {
        field: String,
        value: f64,
        reason: &'static str,
    },

    #[error("Culture '{0}' not found on the bench")]
    UnknownCulture(String),

    #[error("Strain definition for '{0}' not found")]
    UnknownStrain(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to serialize JSON column: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to write CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}

impl CrobeError {
    pub(crate) fn invalid(field: impl Into<String>, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            value,
            reason,
        }
    }
}

/// Fails unless `value` is finite and `>= 0`.
pub(crate) fn non_negative(field: &str, value: f64) -> Result<f64, CrobeError> {
    if !value.is_finite() {
        return Err(CrobeError::invalid(field, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(CrobeError::invalid(field, value, "must not be negative"));
    }
    Ok(value)
}

/// Fails unless `value` is finite and `> 0`.
pub(crate) fn positive(field: &str, value: f64) -> Result<f64, CrobeError> {
    if !value.is_finite() {
        return Err(CrobeError::invalid(field, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(CrobeError::invalid(field, value, "must be positive"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validators_reject_out_of_range_values() {
        assert!(non_negative("volume", 0.0).is_ok());
        assert!(non_negative("volume", -1.0).is_err());
        assert!(non_negative("volume", f64::NAN).is_err());
        assert!(positive("dt", 0.0).is_err());
        assert!(positive("dt", f64::INFINITY).is_err());
        assert_eq!(positive("dt", 0.5).unwrap(), 0.5);
    }

    #[test]
    fn insufficient_volume_message_names_the_culture() {
        let err = CrobeError::InsufficientVolume {
            culture: "LB Stock".to_string(),
            requested: 5.0,
            available: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Cannot draw 5 mL from 'LB Stock': only 1 mL available"
        );
    }
}
