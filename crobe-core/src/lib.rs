//! Culture mixing algebra and beta-lactamase kinetics.
//!
//! A [`Culture`] holds a [`Media`] and one [`Inoculum`] per strain. Cultures are
//! combined with [`Culture::add`] / [`Culture::merged`], split with
//! [`Culture::sample`] and advanced in time by an [`Incubator`] that drives each
//! culture's [`Dynamics`] in parallel.

pub mod analysis;
pub mod culture;
pub mod dynamics;
pub mod error;
pub mod incubator;
pub mod inoculum;
pub mod logger;
pub mod media;
pub mod quantity;
pub mod strain;

pub use culture::{
    builder::CultureBuilder,
    state::{CultureSnapshot, Quantity, TimeSeries},
    Culture,
};
pub use dynamics::{BetaLactamaseDynamics, CultureEnvironment, Dynamics, RunSummary};
pub use error::CrobeError;
pub use incubator::Incubator;
pub use inoculum::Inoculum;
pub use media::Media;
pub use quantity::{Amount, Concentration};
