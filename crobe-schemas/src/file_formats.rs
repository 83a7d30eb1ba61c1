use crate::{
    command::Command, culture::CultureSpec, environment::IncubatorSettings, strain::Strain,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StrainFile {
    pub schema_version: String,
    pub strains: Vec<Strain>,
}

#[derive(Debug, Deserialize)]
pub struct ProtocolFile {
    pub schema_version: String,
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub incubator: IncubatorSettings,
    pub cultures: Vec<CultureSpec>,
    pub steps: Vec<Command>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_file_parses_tagged_steps() {
        let yaml = r#"
schema_version: "1"
name: overnight
seed: 7
incubator:
  set_temp: 37.0
  temp_std_batch: 0.5
cultures:
  - name: LB Stock
    media: { volume: 1000, nutrient: 2.0e9 }
  - name: Overnight
    dynamics: beta_lactamase
steps:
  - type: transfer
    from: LB Stock
    to: Overnight
    volume: 5.0
  - type: incubate
    cultures: [Overnight]
    time: 24
    dt: 0.01
  - type: export
    culture: Overnight
"#;
        let protocol: ProtocolFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(protocol.seed, 7);
        assert_eq!(protocol.incubator.temp_std_batch, 0.5);
        assert_eq!(protocol.incubator.temp_std_transient, 0.0);
        assert_eq!(protocol.cultures.len(), 2);
        assert!(protocol.cultures[0].dynamics.is_none());
        assert_eq!(protocol.cultures[0].media.as_ref().unwrap().nutrient, 2.0e9);
        assert!(matches!(
            protocol.steps[1],
            Command::Incubate { ref cultures, time, .. } if cultures.len() == 1 && time == 24.0
        ));
        assert!(matches!(protocol.steps[2], Command::Export { .. }));
    }
}
