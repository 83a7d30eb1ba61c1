use crate::{
    error::{non_negative, CrobeError},
    quantity::{Amount, Concentration},
    strain::same_definition,
};
use crobe_schemas::strain::Strain;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A population of one strain inside a culture.
///
/// Every field is extensive: merging two inocula of the same strain adds them and
/// sampling a fraction of a culture takes the same fraction of each. Intracellular
/// concentrations are derived from the amounts and the total periplasm volume.
#[derive(Debug, Clone)]
pub struct Inoculum {
    strain: Arc<Strain>,
    pub(crate) cell_count: f64,
    pub(crate) lysed_count: f64,
    pub(crate) bla_intracellular: f64,
    pub(crate) bla_extracellular: f64,
    pub(crate) drug_intracellular: BTreeMap<String, f64>,
}

impl Inoculum {
    pub fn new(strain: &Arc<Strain>, cell_count: f64) -> Result<Self, CrobeError> {
        Ok(Self {
            strain: Arc::clone(strain),
            cell_count: non_negative("cell_count", cell_count)?,
            lysed_count: 0.0,
            bla_intracellular: 0.0,
            bla_extracellular: 0.0,
            drug_intracellular: BTreeMap::new(),
        })
    }

    /// Seeds enzyme already held in the periplasm of these cells.
    pub fn with_intracellular_enzyme(mut self, amount: f64) -> Result<Self, CrobeError> {
        self.bla_intracellular = non_negative("bla_intracellular", amount)?;
        Ok(self)
    }

    /// Seeds enzyme this strain has already released into the medium.
    pub fn with_extracellular_enzyme(mut self, amount: f64) -> Result<Self, CrobeError> {
        self.bla_extracellular = non_negative("bla_extracellular", amount)?;
        Ok(self)
    }

    pub fn with_intracellular_drug(mut self, name: &str, amount: f64) -> Result<Self, CrobeError> {
        let amount = non_negative(&format!("intracellular '{}'", name), amount)?;
        self.drug_intracellular.insert(name.to_string(), amount);
        Ok(self)
    }

    pub fn strain(&self) -> &Arc<Strain> {
        &self.strain
    }

    pub fn name(&self) -> &str {
        &self.strain.name
    }

    pub fn cell_count(&self) -> f64 {
        self.cell_count
    }

    pub fn lysed_count(&self) -> f64 {
        self.lysed_count
    }

    pub fn bla_intracellular(&self) -> Amount {
        Amount::clamped(self.bla_intracellular)
    }

    pub fn bla_extracellular(&self) -> Amount {
        Amount::clamped(self.bla_extracellular)
    }

    pub fn drug_intracellular(&self, name: &str) -> Amount {
        self.drug_intracellular
            .get(name)
            .map_or(Amount::ZERO, |amount| Amount::clamped(*amount))
    }

    /// Combined periplasm volume of all live cells, in mL.
    pub fn periplasm_volume(&self) -> f64 {
        self.cell_count * self.strain.periplasm_volume
    }

    pub fn intracellular_enzyme_conc(&self) -> Concentration {
        self.bla_intracellular().concentration_in(self.periplasm_volume())
    }

    pub fn intracellular_drug_conc(&self, name: &str) -> Concentration {
        self.drug_intracellular(name)
            .concentration_in(self.periplasm_volume())
    }

    /// Adds `other` into this inoculum. Both must reference the same strain definition.
    pub fn merge(&mut self, other: &Inoculum) -> Result<(), CrobeError> {
        if !same_definition(&self.strain, &other.strain) {
            return Err(CrobeError::StrainMismatch(self.strain.name.clone()));
        }
        self.cell_count += other.cell_count;
        self.lysed_count += other.lysed_count;
        self.bla_intracellular += other.bla_intracellular;
        self.bla_extracellular += other.bla_extracellular;
        for (drug, amount) in &other.drug_intracellular {
            *self.drug_intracellular.entry(drug.clone()).or_insert(0.0) += amount;
        }
        Ok(())
    }

    /// A copy holding `fraction` of every quantity.
    pub fn scaled(&self, fraction: f64) -> Inoculum {
        Inoculum {
            strain: Arc::clone(&self.strain),
            cell_count: self.cell_count * fraction,
            lysed_count: self.lysed_count * fraction,
            bla_intracellular: self.bla_intracellular * fraction,
            bla_extracellular: self.bla_extracellular * fraction,
            drug_intracellular: self
                .drug_intracellular
                .iter()
                .map(|(drug, amount)| (drug.clone(), amount * fraction))
                .collect(),
        }
    }

    /// Removes `fraction` of every quantity and returns it as a new inoculum.
    pub(crate) fn split_off(&mut self, fraction: f64) -> Inoculum {
        let part = self.scaled(fraction);
        *self = self.scaled(1.0 - fraction);
        part
    }

    pub fn snapshot(&self, culture_volume: f64) -> InoculumSnapshot {
        InoculumSnapshot {
            cell_count: self.cell_count,
            cell_density: if culture_volume > 0.0 {
                self.cell_count / culture_volume
            } else {
                0.0
            },
            lysed_count: self.lysed_count,
            bla_intracellular_conc: self.intracellular_enzyme_conc().value(),
            bla_extracellular_conc: self
                .bla_extracellular()
                .concentration_in(culture_volume)
                .value(),
            drug_intracellular_conc: self
                .drug_intracellular
                .keys()
                .map(|drug| (drug.clone(), self.intracellular_drug_conc(drug).value()))
                .collect(),
        }
    }
}

/// Reporting view of one inoculum at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InoculumSnapshot {
    pub cell_count: f64,
    pub cell_density: f64,
    pub lysed_count: f64,
    pub bla_intracellular_conc: f64,
    pub bla_extracellular_conc: f64,
    pub drug_intracellular_conc: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strain::fixtures::{shared_tem, tem};
    use crate::strain::share;

    #[test]
    fn merge_sums_extensive_quantities() {
        let strain = shared_tem(200.0);
        let mut a = Inoculum::new(&strain, 1.0e6)
            .unwrap()
            .with_intracellular_drug("CTX", 2.0)
            .unwrap();
        let b = Inoculum::new(&strain, 3.0e6)
            .unwrap()
            .with_extracellular_enzyme(0.5)
            .unwrap()
            .with_intracellular_drug("CTX", 1.0)
            .unwrap();

        a.merge(&b).unwrap();
        assert_eq!(a.cell_count(), 4.0e6);
        assert_eq!(a.bla_extracellular().value(), 0.5);
        assert_eq!(a.drug_intracellular("CTX").value(), 3.0);
    }

    #[test]
    fn merge_rejects_a_different_definition_under_the_same_name() {
        let mut altered = tem(200.0);
        altered.max_lysis_rate = 4.0;
        let mut a = Inoculum::new(&shared_tem(200.0), 1.0).unwrap();
        let b = Inoculum::new(&share(altered).unwrap(), 1.0).unwrap();

        assert!(matches!(a.merge(&b), Err(CrobeError::StrainMismatch(name)) if name == "TEM-200"));
        assert_eq!(a.cell_count(), 1.0);
    }

    #[test]
    fn split_divides_every_quantity() {
        let mut inoculum = Inoculum::new(&shared_tem(0.0), 1000.0)
            .unwrap()
            .with_intracellular_enzyme(10.0)
            .unwrap();
        let part = inoculum.split_off(0.25);

        assert_eq!(part.cell_count(), 250.0);
        assert_eq!(inoculum.cell_count(), 750.0);
        assert_eq!(part.bla_intracellular().value(), 2.5);
        let (a, b) = (
            part.intracellular_enzyme_conc().value(),
            inoculum.intracellular_enzyme_conc().value(),
        );
        assert!((a - b).abs() / b < 1e-12);
    }

    #[test]
    fn empty_inoculum_has_zero_intracellular_concentration() {
        let inoculum = Inoculum::new(&shared_tem(0.0), 0.0)
            .unwrap()
            .with_intracellular_enzyme(1.0)
            .unwrap();
        assert_eq!(inoculum.intracellular_enzyme_conc(), Concentration::ZERO);
    }
}
