//! Kinetic models and the fixed-step loop that drives them.

pub mod betalactamase;
pub mod environment;
pub mod kinetics;

pub use betalactamase::BetaLactamaseDynamics;
pub use environment::CultureEnvironment;

use crate::{
    culture::{state::TimeSeries, Culture},
    error::{non_negative, positive, CrobeError},
};
use rand::RngCore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Per-run draws that stay fixed while a culture is stepped.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    lag_exit_times: BTreeMap<String, f64>,
}

impl RunState {
    pub fn with_lag_exit(mut self, strain: &str, time: f64) -> Self {
        self.lag_exit_times.insert(strain.to_string(), time);
        self
    }

    /// Lag-exit time of `strain`; strains without a draw are never lagging.
    pub fn lag_exit_time(&self, strain: &str) -> f64 {
        self.lag_exit_times.get(strain).copied().unwrap_or(0.0)
    }

    pub fn has_exited_lag(&self, strain: &str, time: f64) -> bool {
        time >= self.lag_exit_time(strain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    /// Hours elapsed since the start of the run.
    pub time: f64,
    pub dt: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Number of values an update would have pushed below zero.
    pub clamped: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub culture: String,
    pub steps: usize,
    pub elapsed: f64,
    pub clamped: u64,
    /// Set when the culture had no dynamics and was left untouched.
    pub skipped: bool,
    pub mean_temperature: Option<f64>,
}

impl RunSummary {
    pub fn skipped(culture: &str) -> Self {
        Self {
            culture: culture.to_string(),
            steps: 0,
            elapsed: 0.0,
            clamped: 0,
            skipped: true,
            mean_temperature: None,
        }
    }
}

/// A kinetic model that can advance a culture in time.
pub trait Dynamics: Send + Sync + fmt::Debug {
    fn label(&self) -> &str;

    /// Draws everything that is fixed for one run, such as lag-exit times.
    fn begin_run(&self, culture: &Culture, rng: &mut dyn RngCore) -> RunState;

    /// Advances `culture` by `input.dt` in place.
    fn step(&self, culture: &mut Culture, run: &RunState, input: StepInput) -> StepReport;

    /// Steps `culture` until `total_time` hours have elapsed and records the time series.
    ///
    /// The last step is shortened so the run ends exactly at `total_time`. The history
    /// holds the initial state at `t = 0` followed by one point per step.
    fn run(
        &self,
        culture: &mut Culture,
        total_time: f64,
        dt: f64,
        env: &mut CultureEnvironment,
    ) -> Result<RunSummary, CrobeError> {
        let dt = positive("dt", dt)?;
        let total_time = non_negative("time", total_time)?;
        let steps = step_count(total_time, dt);

        let run = self.begin_run(culture, env.rng());
        let mut history = TimeSeries::with_capacity(steps + 1);
        history.push(culture.snapshot_at(0.0, None));

        tracing::debug!(
            culture = %culture.name(),
            dynamics = self.label(),
            steps,
            dt,
            base_temperature = env.base_temperature(),
            "Starting run"
        );

        let mut clamped = 0;
        let mut temperature_sum = 0.0;
        for index in 0..steps {
            let time = index as f64 * dt;
            let input = StepInput {
                time,
                dt: dt.min(total_time - time),
                temperature: env.next_temperature(),
            };
            let report = self.step(culture, &run, input);
            if report.clamped > 0 {
                tracing::debug!(
                    culture = %culture.name(),
                    time,
                    clamped = report.clamped,
                    "Clamped negative values"
                );
            }
            clamped += report.clamped;
            temperature_sum += input.temperature;
            let end = if index + 1 == steps {
                total_time
            } else {
                time + input.dt
            };
            history.push(culture.snapshot_at(end, Some(input.temperature)));
        }
        history.set_clamp_count(clamped);
        culture.set_history(history);

        if clamped > 0 {
            tracing::warn!(
                culture = %culture.name(),
                clamped,
                "Floored values at zero; totals may not be conserved, consider a smaller dt"
            );
        }
        tracing::info!(
            culture = %culture.name(),
            elapsed = total_time,
            cells = culture.total_cell_count(),
            "Run complete"
        );

        Ok(RunSummary {
            culture: culture.name().to_string(),
            steps,
            elapsed: total_time,
            clamped,
            skipped: false,
            mean_temperature: (steps > 0).then(|| temperature_sum / steps as f64),
        })
    }
}

/// Number of fixed steps of size `dt` needed to cover `total_time`.
fn step_count(total_time: f64, dt: f64) -> usize {
    if total_time <= 0.0 {
        return 0;
    }
    let exact = total_time / dt;
    // absorb floating error so 24.0 / 0.01 gives 2400 steps, not 2401
    let rounded = exact.round();
    let steps = if (exact - rounded).abs() < 1e-9 * rounded.max(1.0) {
        rounded
    } else {
        exact.ceil()
    };
    (steps as usize).max(1)
}
