use crate::consts::PATH_ENERGY_SCALE;
use crate::error::{DisResult, DisorderError};
use crate::geometry::{LatticeGeometry, LatticeStructure};
use crate::hopping::HoppingTable;
use crate::store::{ConfigStore, StoreLock};
use tracing::{info, warn};

/// Everything replicas share. Built once before any replica starts and only
/// ever handed out as `&SimulationContext`; nothing in it changes afterwards
/// (the store is reached through its own lock).
pub struct SimulationContext {
    energy_scale: f64,
    ghosts: Vec<f64>,
    threads: usize,
    geometry: Box<dyn LatticeGeometry>,
    hopping: HoppingTable,
    store: StoreLock,
}

impl SimulationContext {
    /// Reads the energy scale and hopping table. `threads` overrides the
    /// worker count the lattice decomposition asks for.
    pub fn new(
        store: StoreLock,
        geometry: Box<dyn LatticeGeometry>,
        threads: Option<usize>,
    ) -> DisResult<Self> {
        let (energy_scale, hopping) = store.with(|s| {
            let scale = s.read_f64(PATH_ENERGY_SCALE)?;
            if !(scale.is_finite() && scale > 0.0) {
                return Err(DisorderError::config_read(
                    PATH_ENERGY_SCALE,
                    format!("energy scale must be positive, got {}", scale),
                ));
            }
            Ok((scale, HoppingTable::load(s, geometry.orbitals())?))
        })?;

        // Gershgorin bound of the clean Hamiltonian.
        if hopping.max_row_sum() > energy_scale {
            warn!(
                "Energy scale {} is below the hopping row sum {}; the rescaled spectrum may leave [-1, 1]",
                energy_scale,
                hopping.max_row_sum()
            );
        }

        let threads = threads.unwrap_or_else(|| geometry.thread_count());
        if threads == 0 {
            return Err(DisorderError::ThreadPool("thread count must be positive".to_string()));
        }

        info!(
            "Context ready: orbitals={}, unit_cells={}, domains={}, threads={}, energy_scale={}",
            geometry.orbitals(),
            geometry.unit_cells(),
            geometry.domains(),
            threads,
            energy_scale
        );

        Ok(Self {
            energy_scale,
            ghosts: vec![0.0; geometry.border_size()],
            threads,
            geometry,
            hopping,
            store,
        })
    }

    /// Builds the context from a store that also describes the lattice.
    pub fn from_store<S: ConfigStore + 'static>(store: S, threads: Option<usize>) -> DisResult<Self> {
        let store = StoreLock::new(store);
        let lattice = store.with(LatticeStructure::load)?;
        Self::new(store, Box::new(lattice), threads)
    }

    pub fn energy_scale(&self) -> f64 {
        self.energy_scale
    }

    /// Ghost exchange buffer, zero-initialised, one entry per border site.
    pub fn ghosts(&self) -> &[f64] {
        &self.ghosts
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn geometry(&self) -> &dyn LatticeGeometry {
        self.geometry.as_ref()
    }

    pub fn hopping(&self) -> &HoppingTable {
        &self.hopping
    }

    pub fn store(&self) -> &StoreLock {
        &self.store
    }
}
