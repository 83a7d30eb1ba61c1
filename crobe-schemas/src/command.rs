use serde::Deserialize;

/// One bench operation in a protocol, executed in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Pipette `volume` mL out of `from` and add it to `to`.
    Transfer {
        from: String,
        to: String,
        volume: f64,
    },
    Incubate {
        cultures: Vec<String>,
        time: f64,
        dt: f64,
    },
    /// Print a composition summary of each culture.
    Report {
        cultures: Vec<String>,
    },
    /// Write the time series of the culture's latest incubation to CSV.
    Export {
        culture: String,
    },
}
