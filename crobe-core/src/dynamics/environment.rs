use crate::error::{non_negative, CrobeError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// The temperature and random stream seen by one culture during one run.
///
/// `base_temperature` already includes the batch and location offsets; the transient
/// component is redrawn for every step.
#[derive(Debug, Clone)]
pub struct CultureEnvironment {
    base_temperature: f64,
    transient: Normal<f64>,
    rng: ChaCha8Rng,
}

impl CultureEnvironment {
    pub fn new(base_temperature: f64, transient_std: f64, seed: u64) -> Result<Self, CrobeError> {
        if !base_temperature.is_finite() {
            return Err(CrobeError::invalid(
                "temperature",
                base_temperature,
                "must be finite",
            ));
        }
        let std = non_negative("temp_std_transient", transient_std)?;
        let transient = Normal::new(0.0, std)
            .map_err(|_| CrobeError::invalid("temp_std_transient", std, "not a valid deviation"))?;
        Ok(Self {
            base_temperature,
            transient,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// A fixed temperature with no transient noise.
    pub fn constant(temperature: f64, seed: u64) -> Result<Self, CrobeError> {
        Self::new(temperature, 0.0, seed)
    }

    pub fn base_temperature(&self) -> f64 {
        self.base_temperature
    }

    /// Effective temperature for the next step.
    pub fn next_temperature(&mut self) -> f64 {
        self.base_temperature + self.transient.sample(&mut self.rng)
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}
