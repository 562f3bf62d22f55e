use crate::context::SimulationContext;
use crate::core_types::ReplicaRng;
use crate::disorder::{
    discover_defects, instantiate_defects, read_disorder_entries, realize, AndersonAddress,
    AndersonAddressTable, Defect, DefectBuilder, DisorderEntry,
};
use crate::error::{DisResult, DisorderError};
use crate::geometry::LatticeGeometry;
use crate::hopping::HoppingTable;
use std::collections::HashMap;
use tracing::debug;

/// One flag per structural domain. A set flag means the domain's cached
/// defect placement is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDirtyFlags {
    flags: Vec<bool>,
}

impl DomainDirtyFlags {
    pub fn new(domains: usize) -> Self {
        Self {
            flags: vec![false; domains],
        }
    }

    pub fn mark_all(&mut self) {
        self.flags.fill(true);
    }

    pub fn is_dirty(&self, domain: usize) -> bool {
        self.flags.get(domain).copied().unwrap_or(false)
    }

    pub fn clear(&mut self, domain: usize) {
        if let Some(flag) = self.flags.get_mut(domain) {
            *flag = false;
        }
    }

    pub fn all_dirty(&self) -> bool {
        self.flags.iter().all(|&f| f)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// A defect occupying a unit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefectSite {
    /// Index into the assembly's defect list.
    pub defect: usize,
    pub cell: usize,
}

/// Memoised per-domain defect placement.
#[derive(Debug, Clone, Default)]
pub struct DefectIndexCache {
    by_domain: HashMap<usize, Vec<DefectSite>>,
}

impl DefectIndexCache {
    pub fn get(&self, domain: usize) -> Option<&[DefectSite]> {
        self.by_domain.get(&domain).map(Vec::as_slice)
    }

    pub fn insert(&mut self, domain: usize, sites: Vec<DefectSite>) {
        self.by_domain.insert(domain, sites);
    }

    pub fn clear(&mut self) {
        self.by_domain.clear();
    }

    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }
}

/// The disordered Hamiltonian of one replica.
///
/// Created once when the replica starts, regenerated (never rebuilt) for
/// every member of the disorder ensemble, dropped when the replica ends.
/// The addressing table and deterministic constants are fixed at
/// construction; only [`HamiltonianAssembly::generate_disorder`] changes the
/// realized values.
pub struct HamiltonianAssembly<'ctx> {
    ctx: &'ctx SimulationContext,
    entries: Vec<DisorderEntry>,
    table: AndersonAddressTable,
    realization: Vec<f64>,
    defects: Vec<Box<dyn Defect>>,
    dirty: DomainDirtyFlags,
    defect_cache: DefectIndexCache,
    rng: ReplicaRng,
}

impl<'ctx> HamiltonianAssembly<'ctx> {
    pub fn construct(
        ctx: &'ctx SimulationContext,
        defect_builder: &dyn DefectBuilder,
        rng: ReplicaRng,
    ) -> DisResult<Self> {
        let geometry = ctx.geometry();

        let entries = ctx
            .store()
            .with(|store| read_disorder_entries(store, geometry.orbitals()))?;
        let table = AndersonAddressTable::build(&entries, geometry.orbitals())?;

        let defects = ctx.store().with(|store| {
            let descriptors = discover_defects(store)?;
            instantiate_defects(&descriptors, defect_builder, store, geometry)
        })?;

        let realization = vec![0.0; table.buffer_len(geometry.unit_cells())];

        debug!(
            "Hamiltonian assembled: {} disorder entries ({} random), {} defects, buffer={}",
            entries.len(),
            table.random_slots(),
            defects.len(),
            realization.len()
        );

        Ok(Self {
            ctx,
            entries,
            table,
            realization,
            defects,
            dirty: DomainDirtyFlags::new(geometry.domains()),
            defect_cache: DefectIndexCache::default(),
            rng,
        })
    }

    /// Draws a new disorder realization.
    ///
    /// Refreshes the on-site buffer, marks every domain dirty, drops the
    /// defect index cache and regenerates the defects in construction order,
    /// all from this replica's stream.
    pub fn generate_disorder(&mut self) -> DisResult<()> {
        realize(
            self.table.random_terms(),
            self.ctx.geometry().unit_cells(),
            &mut self.rng,
            &mut self.realization,
        )?;

        self.dirty.mark_all();
        self.defect_cache.clear();

        for defect in self.defects.iter_mut() {
            defect.regenerate(&mut self.rng);
        }
        Ok(())
    }

    /// On-site energy of `orbital` in unit cell `cell` for the current
    /// realization.
    pub fn onsite_energy(&self, orbital: usize, cell: usize) -> DisResult<f64> {
        let unit_cells = self.ctx.geometry().unit_cells();
        if cell >= unit_cells {
            return Err(DisorderError::IndexOutOfRange {
                what: "unit cell",
                index: cell as i64,
                bound: unit_cells,
            });
        }

        match self.table.address(orbital)? {
            AndersonAddress::Unassigned => Ok(0.0),
            AndersonAddress::Deterministic => Ok(self.table.constants()[orbital]),
            AndersonAddress::RandomSlot(slot) => {
                let idx = slot * unit_cells + cell;
                self.realization
                    .get(idx)
                    .copied()
                    .ok_or(DisorderError::IndexOutOfRange {
                        what: "realization buffer",
                        index: idx as i64,
                        bound: self.realization.len(),
                    })
            }
        }
    }

    /// Defects inside `domain`, recomputed only when the domain is dirty or
    /// has not been looked up since the last regeneration.
    pub fn defects_in_domain(&mut self, domain: usize) -> DisResult<&[DefectSite]> {
        let geometry = self.ctx.geometry();
        let domains = geometry.domains();
        if domain >= domains {
            return Err(DisorderError::IndexOutOfRange {
                what: "domain",
                index: domain as i64,
                bound: domains,
            });
        }

        if self.dirty.is_dirty(domain) || self.defect_cache.get(domain).is_none() {
            let sites = self
                .defects
                .iter()
                .enumerate()
                .flat_map(|(i, d)| {
                    d.positions()
                        .iter()
                        .filter(|&&cell| geometry.domain_of(cell) == domain)
                        .map(move |&cell| DefectSite { defect: i, cell })
                })
                .collect();
            self.defect_cache.insert(domain, sites);
            self.dirty.clear(domain);
        }

        Ok(self.defect_cache.get(domain).unwrap_or(&[]))
    }

    pub fn context(&self) -> &'ctx SimulationContext {
        self.ctx
    }

    pub fn geometry(&self) -> &'ctx dyn LatticeGeometry {
        self.ctx.geometry()
    }

    pub fn hopping(&self) -> &'ctx HoppingTable {
        self.ctx.hopping()
    }

    pub fn entries(&self) -> &[DisorderEntry] {
        &self.entries
    }

    pub fn address_table(&self) -> &AndersonAddressTable {
        &self.table
    }

    pub fn realization(&self) -> &[f64] {
        &self.realization
    }

    pub fn defects(&self) -> &[Box<dyn Defect>] {
        &self.defects
    }

    pub fn dirty_flags(&self) -> &DomainDirtyFlags {
        &self.dirty
    }

    pub fn defect_cache(&self) -> &DefectIndexCache {
        &self.defect_cache
    }

    /// The replica's random stream, for stages that draw their own numbers.
    pub fn rng(&mut self) -> &mut ReplicaRng {
        &mut self.rng
    }
}
