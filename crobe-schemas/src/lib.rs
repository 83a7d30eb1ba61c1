//! Plain data records shared by the simulation core and the protocol runner.
//!
//! Nothing in this crate carries behaviour beyond (de)serialization; the core
//! validates these records before they take part in a simulation.

pub mod command;
pub mod culture;
pub mod environment;
pub mod file_formats;
pub mod strain;
