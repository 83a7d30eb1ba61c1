use crate::environment::MediaSpec;
use serde::{Deserialize, Serialize};

/// The kinetic model attached to a culture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicsKind {
    BetaLactamase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InoculumSpec {
    /// Name of a strain defined in one of the strain files.
    pub strain: String,
    pub cell_count: f64,
}

/// A named vessel declared at the start of a protocol.
///
/// A culture without `media` starts empty and is filled by transfers; a culture
/// without `dynamics` is a static reservoir that never changes during incubation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultureSpec {
    pub name: String,
    #[serde(default)]
    pub media: Option<MediaSpec>,
    #[serde(default)]
    pub inocula: Vec<InoculumSpec>,
    #[serde(default)]
    pub dynamics: Option<DynamicsKind>,
}
