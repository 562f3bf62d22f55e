#![allow(dead_code)]

use serde_json::{json, Value};
use tbdisorder::context::SimulationContext;
use tbdisorder::store::JsonConfigStore;

pub const GAUSSIAN: i64 = 1;
pub const UNIFORM: i64 = 2;
pub const DETERMINISTIC: i64 = 3;

/// Builder for simulation input documents.
pub struct LatticeDoc {
    doc: Value,
}

impl LatticeDoc {
    /// Single-thread chain of `cells` unit cells.
    pub fn chain(orbitals: usize, cells: usize) -> Self {
        Self::new(orbitals, &[cells], &[1])
    }

    pub fn new(orbitals: usize, lengths: &[usize], divisions: &[usize]) -> Self {
        Self {
            doc: json!({
                "EnergyScale": 1.0,
                "NOrbitals": orbitals,
                "L": lengths,
                "Divisions": divisions,
                "Hamiltonian": {}
            }),
        }
    }

    pub fn energy_scale(mut self, scale: f64) -> Self {
        self.doc["EnergyScale"] = json!(scale);
        self
    }

    /// `(orbital, model code, mean, spread)` in declaration order.
    pub fn disorder(mut self, entries: &[(i64, i64, f64, f64)]) -> Self {
        self.doc["Hamiltonian"]["Disorder"] = json!({
            "OrbitalNum": entries.iter().map(|e| e.0).collect::<Vec<_>>(),
            "OnsiteDisorderModelType": entries.iter().map(|e| e.1).collect::<Vec<_>>(),
            "OnsiteDisorderMeanValue": entries.iter().map(|e| e.2).collect::<Vec<_>>(),
            "OnsiteDisorderMeanStdv": entries.iter().map(|e| e.3).collect::<Vec<_>>(),
        });
        self
    }

    pub fn defect(mut self, name: &str, concentration: f64) -> Self {
        self.structural()[name] = json!({ "Concentration": concentration });
        self
    }

    pub fn defect_on(mut self, name: &str, concentration: f64, orbitals: &[usize]) -> Self {
        self.structural()[name] = json!({
            "Concentration": concentration,
            "Orbitals": orbitals,
        });
        self
    }

    pub fn hoppings(mut self, per_orbital: &[usize], amplitudes: &[f64]) -> Self {
        self.doc["Hamiltonian"]["NHoppings"] = json!(per_orbital);
        self.doc["Hamiltonian"]["Hoppings"] = json!(amplitudes);
        self
    }

    fn structural(&mut self) -> &mut Value {
        let hamiltonian = &mut self.doc["Hamiltonian"];
        if hamiltonian.get("StructuralDisorder").is_none() {
            hamiltonian["StructuralDisorder"] = json!({});
        }
        &mut hamiltonian["StructuralDisorder"]
    }

    pub fn value(&self) -> &Value {
        &self.doc
    }

    pub fn store(&self) -> JsonConfigStore {
        JsonConfigStore::from_value(self.doc.clone())
    }

    pub fn context(&self) -> SimulationContext {
        SimulationContext::from_store(self.store(), None).expect("context")
    }

    pub fn context_with_threads(&self, threads: usize) -> SimulationContext {
        SimulationContext::from_store(self.store(), Some(threads)).expect("context")
    }
}

/// `Orb=2, Nd=4`: orbital 0 fixed at 0.5, orbital 1 Gaussian(0, 1).
pub fn fixed_plus_gaussian() -> LatticeDoc {
    LatticeDoc::chain(2, 4).disorder(&[(0, DETERMINISTIC, 0.5, 0.0), (1, GAUSSIAN, 0.0, 1.0)])
}
