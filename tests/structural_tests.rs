mod common;

use common::LatticeDoc;
use serde_json::json;
use tbdisorder::core_types::ReplicaSeed;
use tbdisorder::disorder::{
    discover_defects, instantiate_defects, Defect, DefectBuilder, DefectDescriptor, PointDefect,
    PointDefectBuilder,
};
use tbdisorder::error::{DisResult, DisorderError};
use tbdisorder::geometry::{LatticeGeometry, LatticeStructure};
use tbdisorder::hamiltonian::HamiltonianAssembly;
use tbdisorder::store::{ConfigStore, JsonConfigStore};

fn chain(orbitals: usize, cells: usize) -> LatticeStructure {
    LatticeStructure::new(orbitals, vec![cells], vec![1]).unwrap()
}

#[test]
fn test_discovery_without_container() {
    let store = LatticeDoc::chain(1, 4).store();
    assert!(discover_defects(&store).unwrap().is_empty());
}

#[test]
fn test_discovery_lists_groups_in_name_order() {
    let store = LatticeDoc::chain(1, 4)
        .defect("Vacancy", 0.1)
        .defect("Adatom", 0.2)
        .store();

    let found = discover_defects(&store).unwrap();
    assert_eq!(
        found,
        vec![
            DefectDescriptor {
                name: "Adatom".to_string(),
                path: "/Hamiltonian/StructuralDisorder/Adatom".to_string(),
            },
            DefectDescriptor {
                name: "Vacancy".to_string(),
                path: "/Hamiltonian/StructuralDisorder/Vacancy".to_string(),
            },
        ]
    );
}

#[test]
fn test_discovery_skips_datasets_in_container() {
    let store = JsonConfigStore::from_value(json!({
        "Hamiltonian": {
            "StructuralDisorder": {
                "Count": 1,
                "Bond": { "Concentration": 0.5 }
            }
        }
    }));
    let found = discover_defects(&store).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Bond");
}

#[test]
fn test_builder_reads_parameters() {
    let store = LatticeDoc::chain(3, 8).defect_on("Vacancy", 0.25, &[0, 2]).store();
    let geometry = chain(3, 8);

    let descriptors = discover_defects(&store).unwrap();
    let defects = instantiate_defects(&descriptors, &PointDefectBuilder, &store, &geometry).unwrap();

    assert_eq!(defects.len(), 1);
    assert_eq!(defects[0].path(), "/Hamiltonian/StructuralDisorder/Vacancy");
    assert!(defects[0].positions().is_empty());
}

#[test]
fn test_builder_rejects_foreign_orbital() {
    let store = LatticeDoc::chain(2, 8).defect_on("Vacancy", 0.25, &[5]).store();
    let geometry = chain(2, 8);

    let descriptors = discover_defects(&store).unwrap();
    let err = instantiate_defects(&descriptors, &PointDefectBuilder, &store, &geometry)
        .err()
        .unwrap();
    assert!(matches!(err, DisorderError::IndexOutOfRange { what: "defect orbital", .. }));
}

#[test]
fn test_builder_requires_concentration() {
    let store = JsonConfigStore::from_value(json!({
        "Hamiltonian": { "StructuralDisorder": { "Vacancy": {} } }
    }));
    let geometry = chain(1, 4);
    let descriptors = discover_defects(&store).unwrap();
    let err = instantiate_defects(&descriptors, &PointDefectBuilder, &store, &geometry)
        .err()
        .unwrap();
    assert!(matches!(err, DisorderError::ConfigRead { .. }));
}

#[test]
fn test_concentration_outside_unit_interval() {
    assert!(PointDefect::new("x", 1.5, vec![0], 4).is_err());
    assert!(PointDefect::new("x", -0.1, vec![0], 4).is_err());
}

#[test]
fn test_concentration_extremes() {
    let mut rng = ReplicaSeed::new(1, 0).rng();

    let mut none = PointDefect::new("none", 0.0, vec![0], 32).unwrap();
    none.regenerate(&mut rng);
    assert!(none.positions().is_empty());

    let mut all = PointDefect::new("all", 1.0, vec![0], 32).unwrap();
    all.regenerate(&mut rng);
    assert_eq!(all.positions(), (0..32).collect::<Vec<_>>().as_slice());
}

/// Counts how many times the assembly regenerates it.
struct CountingDefect {
    path: String,
    regenerations: usize,
    positions: Vec<usize>,
}

impl Defect for CountingDefect {
    fn path(&self) -> &str {
        &self.path
    }

    fn regenerate(&mut self, _rng: &mut tbdisorder::core_types::ReplicaRng) {
        self.regenerations += 1;
        self.positions = vec![self.regenerations];
    }

    fn positions(&self) -> &[usize] {
        &self.positions
    }
}

struct CountingBuilder;

impl DefectBuilder for CountingBuilder {
    fn build(
        &self,
        descriptor: &DefectDescriptor,
        _store: &dyn ConfigStore,
        _geometry: &dyn LatticeGeometry,
    ) -> DisResult<Box<dyn Defect>> {
        Ok(Box::new(CountingDefect {
            path: descriptor.path.clone(),
            regenerations: 0,
            positions: Vec::new(),
        }))
    }
}

#[test]
fn test_assembly_regenerates_every_defect_each_realization() {
    let ctx = LatticeDoc::chain(1, 8)
        .defect("A", 0.0)
        .defect("B", 0.0)
        .context();
    let mut h =
        HamiltonianAssembly::construct(&ctx, &CountingBuilder, ReplicaSeed::new(0, 0).rng()).unwrap();

    for _ in 0..3 {
        h.generate_disorder().unwrap();
    }
    let paths: Vec<&str> = h.defects().iter().map(|d| d.path()).collect();
    assert_eq!(
        paths,
        vec![
            "/Hamiltonian/StructuralDisorder/A",
            "/Hamiltonian/StructuralDisorder/B"
        ]
    );
    assert!(h.defects().iter().all(|d| d.positions() == [3]));
}
