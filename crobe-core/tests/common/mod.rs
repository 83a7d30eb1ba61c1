use crobe_core::{strain::share, BetaLactamaseDynamics, Culture, Inoculum, Media};
use crobe_schemas::strain::{BetaLactamase, Strain};
use std::sync::Arc;

pub const LB_CARRYING_CAPACITY: f64 = 2.0e9;

/// A TEM-series strain: intracellular beta-lactamase with the given Vmax.
#[allow(dead_code)]
pub fn tem(vmax: f64) -> Strain {
    Strain {
        name: format!("TEM-{}", vmax as i64),
        max_growth_rate: 2.0,
        max_lysis_rate: 1.0,
        halfmax_lysis_drug_conc: 0.125,
        lysis_hill_coefficient: 5.0,
        optimal_temp: 37.0,
        mean_lag_exit_time: 1.5,
        stdev_lag_exit_time: 0.125,
        halfmax_growth_nutrient_conc: 7.0e9,
        nutrient_consumption_rate: 1.0,
        bla_production_rate: 1.0,
        bla_saturation_conc: 1.0,
        halfmax_bla_production_conc: 0.01,
        bla_leak_rate: 0.0,
        bla_debris_sink_fraction: 0.0,
        drug_diffusion_rate: 50.0,
        drug_debris_sink_fraction: 0.0,
        periplasm_volume: 0.16 * 1.3e-12,
        betalactamase: BetaLactamase {
            name: format!("Bla-TEM-{}", vmax as i64),
            decay_rate_intracellular: 0.0,
            decay_rate_extracellular: 0.0,
            max_hydrolysis_rate: vmax,
            halfmax_hydrolysis_drug_conc: 10.0,
            is_intracellular: true,
        },
        marker: String::new(),
        plasmids: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn shared_tem(vmax: f64) -> Arc<Strain> {
    share(tem(vmax)).unwrap()
}

/// LB with optional drug and one inoculum, ready to incubate.
#[allow(dead_code)]
pub fn flask(name: &str, strain: &Arc<Strain>, cells: f64, drug: f64) -> Culture {
    Culture::builder(name)
        .with_media(
            Media::new(1.0)
                .unwrap()
                .with_nutrient(LB_CARRYING_CAPACITY)
                .unwrap()
                .with_drug("CTX", drug)
                .unwrap(),
        )
        .with_inoculum(Inoculum::new(strain, cells).unwrap())
        .with_dynamics(Arc::new(BetaLactamaseDynamics::default()))
        .build()
        .unwrap()
}
