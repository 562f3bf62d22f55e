use crate::consts::PATH_STRUCTURAL_DISORDER;
use crate::core_types::ReplicaRng;
use crate::error::{DisResult, DisorderError};
use crate::geometry::LatticeGeometry;
use crate::store::ConfigStore;
use rand::Rng;
use tracing::debug;

/// A structural disorder group found in the configuration store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectDescriptor {
    pub name: String,
    pub path: String,
}

/// A structural defect bound to one replica's Hamiltonian.
pub trait Defect: Send {
    fn path(&self) -> &str;

    /// Draws a fresh placement from the replica stream.
    fn regenerate(&mut self, rng: &mut ReplicaRng);

    /// Unit cells the defect currently occupies.
    fn positions(&self) -> &[usize];
}

/// Turns a descriptor into a live defect. Runs while the store lock is held,
/// so implementations may read per-defect parameters from `store`.
pub trait DefectBuilder: Send + Sync {
    fn build(
        &self,
        descriptor: &DefectDescriptor,
        store: &dyn ConfigStore,
        geometry: &dyn LatticeGeometry,
    ) -> DisResult<Box<dyn Defect>>;
}

/// Lists every group directly beneath the structural disorder container.
/// A missing container means the lattice has no structural disorder.
pub fn discover_defects(store: &dyn ConfigStore) -> DisResult<Vec<DefectDescriptor>> {
    let Some(names) = store.child_groups(PATH_STRUCTURAL_DISORDER)? else {
        debug!("No structural disorder container");
        return Ok(Vec::new());
    };

    Ok(names
        .into_iter()
        .map(|name| DefectDescriptor {
            path: format!("{}/{}", PATH_STRUCTURAL_DISORDER, name),
            name,
        })
        .collect())
}

/// Builds one defect per descriptor, keeping descriptor order.
pub fn instantiate_defects(
    descriptors: &[DefectDescriptor],
    builder: &dyn DefectBuilder,
    store: &dyn ConfigStore,
    geometry: &dyn LatticeGeometry,
) -> DisResult<Vec<Box<dyn Defect>>> {
    descriptors
        .iter()
        .map(|d| builder.build(d, store, geometry))
        .collect()
}

/// Vacancy/impurity style defect: every unit cell independently hosts the
/// defect with probability `concentration`.
#[derive(Debug, Clone)]
pub struct PointDefect {
    path: String,
    concentration: f64,
    orbitals: Vec<usize>,
    unit_cells: usize,
    positions: Vec<usize>,
}

impl PointDefect {
    pub fn new(
        path: impl Into<String>,
        concentration: f64,
        orbitals: Vec<usize>,
        unit_cells: usize,
    ) -> DisResult<Self> {
        let path = path.into();
        if !(0.0..=1.0).contains(&concentration) {
            return Err(DisorderError::MalformedDisorderSpec(format!(
                "{}: concentration {} outside [0, 1]",
                path, concentration
            )));
        }
        Ok(Self {
            path,
            concentration,
            orbitals,
            unit_cells,
            positions: Vec::new(),
        })
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Orbitals removed or shifted in every occupied cell.
    pub fn orbitals(&self) -> &[usize] {
        &self.orbitals
    }
}

impl Defect for PointDefect {
    fn path(&self) -> &str {
        &self.path
    }

    fn regenerate(&mut self, rng: &mut ReplicaRng) {
        self.positions.clear();
        for cell in 0..self.unit_cells {
            if rng.gen_bool(self.concentration) {
                self.positions.push(cell);
            }
        }
    }

    fn positions(&self) -> &[usize] {
        &self.positions
    }
}

/// Reads `<group>/Concentration` and the optional `<group>/Orbitals`
/// (default: every orbital of the cell).
#[derive(Debug, Clone, Copy, Default)]
pub struct PointDefectBuilder;

impl DefectBuilder for PointDefectBuilder {
    fn build(
        &self,
        descriptor: &DefectDescriptor,
        store: &dyn ConfigStore,
        geometry: &dyn LatticeGeometry,
    ) -> DisResult<Box<dyn Defect>> {
        let concentration = store.read_f64(&format!("{}/Concentration", descriptor.path))?;

        let orbitals_path = format!("{}/Orbitals", descriptor.path);
        let orbitals = if store.contains(&orbitals_path) {
            store.read_usize_array(&orbitals_path)?
        } else {
            (0..geometry.orbitals()).collect()
        };
        if let Some(&bad) = orbitals.iter().find(|&&o| o >= geometry.orbitals()) {
            return Err(DisorderError::IndexOutOfRange {
                what: "defect orbital",
                index: bad as i64,
                bound: geometry.orbitals(),
            });
        }

        debug!(
            "Defect '{}': concentration={}, orbitals={:?}",
            descriptor.name, concentration, orbitals
        );

        Ok(Box::new(PointDefect::new(
            descriptor.path.clone(),
            concentration,
            orbitals,
            geometry.unit_cells(),
        )?))
    }
}
