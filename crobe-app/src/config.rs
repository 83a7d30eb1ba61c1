use anyhow::{Context, Result};
use crobe_core::{strain, CrobeError};
use crobe_schemas::{
    file_formats::{ProtocolFile, StrainFile},
    strain::Strain,
};
use std::{collections::HashMap, fs, path::Path, sync::Arc};

/// Every strain definition found in the strain directory, validated and shared.
pub struct StrainLibrary {
    strains: HashMap<String, Arc<Strain>>,
}

impl StrainLibrary {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        println!("Loading strain definitions from '{}'...", dir.display());

        let records = load_yaml_files_into_map(
            dir,
            |file: StrainFile| file.strains,
            |item: &Strain| item.name.clone(),
        )?;
        let mut strains = HashMap::with_capacity(records.len());
        for (name, record) in records {
            let shared = strain::share(record)
                .with_context(|| format!("Strain '{}' has invalid parameters", name))?;
            strains.insert(name, shared);
        }

        println!("Loaded {} strains.", strains.len());
        Ok(Self { strains })
    }

    pub fn get(&self, name: &str) -> Result<&Arc<Strain>, CrobeError> {
        self.strains
            .get(name)
            .ok_or_else(|| CrobeError::UnknownStrain(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.strains.len()
    }
}

pub fn load_protocol(path: impl AsRef<Path>) -> Result<ProtocolFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read protocol file: {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML from {:?}", path))
}

/// Generic helper to load all YAML files in a directory into a HashMap.
fn load_yaml_files_into_map<P, F, E, T, K>(
    dir_path: P,
    extract_vec: E,
    get_key: K,
) -> Result<HashMap<String, T>>
where
    P: AsRef<Path>,
    F: for<'de> serde::Deserialize<'de>, // The file wrapper struct (e.g., StrainFile)
    E: Fn(F) -> Vec<T>,                  // A closure to extract the Vec<T> from the wrapper
    K: Fn(&T) -> String,                 // A closure to get the key for the map from an item T
{
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir_path.as_ref())
        .with_context(|| format!("Failed to read directory: {:?}", dir_path.as_ref()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |s| s == "yaml" || s == "yml") {
            paths.push(path);
        }
    }
    // read_dir order is platform dependent; later files win on duplicate keys
    paths.sort();

    let mut map = HashMap::new();
    for path in paths {
        let content = fs::read_to_string(&path)?;
        let file_wrapper: F = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;

        for item in extract_vec(file_wrapper) {
            let key = get_key(&item);
            if map.insert(key.clone(), item).is_some() {
                tracing::warn!(
                    key = %key,
                    file = ?path,
                    "Duplicate definition replaces an earlier one"
                );
            }
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRAINS: &str = r#"
schema_version: "1"
strains:
  - name: TEM-0
    max_growth_rate: 2.0
    max_lysis_rate: 1.0
    halfmax_lysis_drug_conc: 0.125
    lysis_hill_coefficient: 5.0
    optimal_temp: 37.0
    mean_lag_exit_time: 1.5
    stdev_lag_exit_time: 0.125
    halfmax_growth_nutrient_conc: 7.0e9
    nutrient_consumption_rate: 1.0
    bla_production_rate: 1.0
    bla_saturation_conc: 1.0
    halfmax_bla_production_conc: 0.01
    bla_leak_rate: 0.0
    bla_debris_sink_fraction: 0.0
    drug_diffusion_rate: 50.0
    drug_debris_sink_fraction: 0.0
    periplasm_volume: 2.08e-13
    betalactamase:
      name: Bla-TEM-0
      decay_rate_intracellular: 0.0
      decay_rate_extracellular: 0.0
      max_hydrolysis_rate: 0.0
      halfmax_hydrolysis_drug_conc: 10.0
      is_intracellular: true
"#;

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("crobe-config-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn library_loads_yaml_files_and_ignores_others() {
        let dir = scratch_dir("load");
        fs::write(dir.join("tem.yaml"), STRAINS).unwrap();
        fs::write(dir.join("notes.txt"), "not a strain file").unwrap();

        let library = StrainLibrary::load(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(library.len(), 1);
        assert_eq!(library.get("TEM-0").unwrap().max_growth_rate, 2.0);
        assert!(matches!(library.get("TEM-9"), Err(CrobeError::UnknownStrain(_))));
    }

    #[test]
    fn shipped_data_files_are_consistent() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../data");
        let library = StrainLibrary::load(data.join("strains")).unwrap();
        let protocol = load_protocol(data.join("protocols/bla_competition.yaml")).unwrap();

        assert_eq!(library.len(), 6);
        for spec in &protocol.cultures {
            for inoculum in &spec.inocula {
                assert!(library.get(&inoculum.strain).is_ok(), "{}", inoculum.strain);
            }
        }
    }

    #[test]
    fn invalid_strain_parameters_stop_loading() {
        let dir = scratch_dir("invalid");
        fs::write(
            dir.join("bad.yaml"),
            STRAINS.replace("lysis_hill_coefficient: 5.0", "lysis_hill_coefficient: 0.0"),
        )
        .unwrap();

        let result = StrainLibrary::load(&dir);
        fs::remove_dir_all(&dir).unwrap();

        assert!(result.is_err());
    }
}
