use crate::config::StrainLibrary;
use anyhow::{Context, Result};
use crobe_core::{
    analysis::{self, CultureSummary},
    logger::TimeSeriesLogger,
    BetaLactamaseDynamics, CrobeError, Culture, Dynamics, Incubator, Inoculum, Media, RunSummary,
};
use crobe_schemas::{
    command::Command,
    culture::{CultureSpec, DynamicsKind},
    file_formats::ProtocolFile,
};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

/// The cultures of one protocol run together with the incubator they share.
pub struct Bench {
    cultures: BTreeMap<String, Culture>,
    incubator: Incubator,
    output_dir: PathBuf,
    runs: Vec<RunSummary>,
}

fn dynamics_for(kind: DynamicsKind) -> Arc<dyn Dynamics> {
    match kind {
        DynamicsKind::BetaLactamase => Arc::new(BetaLactamaseDynamics::default()),
    }
}

fn build_culture(spec: &CultureSpec, library: &StrainLibrary) -> Result<Culture> {
    let mut builder = Culture::builder(&spec.name);
    if let Some(media) = &spec.media {
        builder = builder.with_media(Media::from_spec(media)?);
    }
    for inoculum in &spec.inocula {
        let strain = library.get(&inoculum.strain)?;
        builder = builder.with_inoculum(Inoculum::new(strain, inoculum.cell_count)?);
    }
    if let Some(kind) = spec.dynamics {
        builder = builder.with_dynamics(dynamics_for(kind));
    }
    Ok(builder.build()?)
}

/// File-system friendly version of a culture name.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl Bench {
    pub fn assemble(
        protocol: &ProtocolFile,
        library: &StrainLibrary,
        output_dir: &Path,
    ) -> Result<Self> {
        let mut cultures = BTreeMap::new();
        for spec in &protocol.cultures {
            let culture = build_culture(spec, library)
                .with_context(|| format!("Failed to set up culture '{}'", spec.name))?;
            if cultures.insert(spec.name.clone(), culture).is_some() {
                anyhow::bail!("Culture '{}' is declared more than once", spec.name);
            }
        }
        let incubator = Incubator::new(protocol.incubator.clone())?.with_seed(protocol.seed);

        Ok(Self {
            cultures,
            incubator,
            output_dir: output_dir.to_path_buf(),
            runs: Vec::new(),
        })
    }

    pub fn culture(&self, name: &str) -> Result<&Culture, CrobeError> {
        self.cultures
            .get(name)
            .ok_or_else(|| CrobeError::UnknownCulture(name.to_string()))
    }

    fn culture_mut(&mut self, name: &str) -> Result<&mut Culture, CrobeError> {
        self.cultures
            .get_mut(name)
            .ok_or_else(|| CrobeError::UnknownCulture(name.to_string()))
    }

    /// Summaries of every incubation so far, in execution order.
    pub fn runs(&self) -> &[RunSummary] {
        &self.runs
    }

    pub fn execute(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Transfer { from, to, volume } => self.transfer(from, to, *volume),
            Command::Incubate { cultures, time, dt } => self.incubate(cultures, *time, *dt),
            Command::Report { cultures } => {
                for name in cultures {
                    print_culture_report(&analysis::summarize(self.culture(name)?));
                }
                Ok(())
            }
            Command::Export { culture } => self.export(culture),
        }
    }

    fn transfer(&mut self, from: &str, to: &str, volume: f64) -> Result<()> {
        // fail on an unknown target before anything is drawn
        self.culture(to)?;
        let sample = self.culture_mut(from)?.sample(volume)?;
        self.culture_mut(to)?.add(sample)?;
        tracing::debug!(from, to, volume, "Transferred");
        Ok(())
    }

    fn incubate(&mut self, names: &[String], time: f64, dt: f64) -> Result<()> {
        for name in names {
            self.culture(name)?;
        }
        let mut selected: Vec<(usize, &mut Culture)> = self
            .cultures
            .iter_mut()
            .filter_map(|(name, culture)| {
                names.iter().position(|n| n == name).map(|i| (i, culture))
            })
            .collect();
        // protocol order decides the random draws
        selected.sort_by_key(|(position, _)| *position);
        let mut cultures: Vec<&mut Culture> =
            selected.into_iter().map(|(_, culture)| culture).collect();

        let summaries = self.incubator.incubate(&mut cultures, time, dt)?;
        for summary in &summaries {
            if summary.skipped {
                println!("  - {} has no dynamics; left unchanged", summary.culture);
            } else {
                println!(
                    "  - {} incubated for {} h in {} steps (mean {:.2} C, {} clamped values)",
                    summary.culture,
                    summary.elapsed,
                    summary.steps,
                    summary.mean_temperature.unwrap_or(self.incubator.settings().set_temp),
                    summary.clamped
                );
            }
        }
        self.runs.extend(summaries);
        Ok(())
    }

    fn export(&self, name: &str) -> Result<()> {
        let culture = self.culture(name)?;
        let path = self.output_dir.join(format!("{}.csv", file_stem(name)));
        let mut logger = TimeSeriesLogger::new(&path)?;
        logger.log_series(culture.name(), culture.history())?;
        println!(
            "  - Exported {} points of '{}' to {:?}",
            culture.history().len(),
            name,
            path
        );
        Ok(())
    }
}

/// Executes every step of `protocol` in order and writes the incubation summaries.
pub fn run_protocol(
    protocol: &ProtocolFile,
    library: &StrainLibrary,
    output_dir: &Path,
) -> Result<Bench> {
    println!("\n--- [Protocol] {} ---", protocol.name);
    let mut bench = Bench::assemble(protocol, library, output_dir)?;

    for (index, step) in protocol.steps.iter().enumerate() {
        println!("\n[Step {}] {}", index + 1, describe(step));
        bench
            .execute(step)
            .with_context(|| format!("Step {} of protocol '{}' failed", index + 1, protocol.name))?;
    }

    let summary_path = output_dir.join("incubations.json");
    fs::write(&summary_path, serde_json::to_string_pretty(bench.runs())?)
        .with_context(|| format!("Failed to write {:?}", summary_path))?;
    Ok(bench)
}

fn describe(step: &Command) -> String {
    match step {
        Command::Transfer { from, to, volume } => {
            format!("transfer {} mL from '{}' to '{}'", volume, from, to)
        }
        Command::Incubate { cultures, time, dt } => {
            format!("incubate {} for {} h (dt = {} h)", cultures.join(", "), time, dt)
        }
        Command::Report { cultures } => format!("report {}", cultures.join(", ")),
        Command::Export { culture } => format!("export '{}'", culture),
    }
}

fn print_culture_report(summary: &CultureSummary) {
    println!("----------------------------------------");
    println!("Culture: {}", summary.culture);
    println!("  - Volume:    {:.3} mL", summary.volume);
    println!("  - Nutrient:  {:.3e} cell eq/mL", summary.nutrient);
    for (drug, concentration) in &summary.drugs {
        println!("  - {:<10} {:.4} ug/mL", format!("{}:", drug), concentration);
    }
    if summary.extracellular_enzyme > 0.0 {
        println!("  - Free Bla:  {:.4} uM", summary.extracellular_enzyme);
    }
    println!(
        "  - Cells:     {:.3e} total, {:.3e} /mL",
        summary.total_cell_count, summary.total_density
    );
    for strain in &summary.strains {
        println!(
            "    - {:<10} {:.3e} /mL ({:.1}%)",
            strain.strain,
            strain.density,
            strain.fraction * 100.0
        );
    }
}
