use super::realizer::RandomTerm;
use super::DisorderEntry;
use crate::consts::{ADDRESS_DETERMINISTIC, ADDRESS_UNASSIGNED};
use crate::error::{DisResult, DisorderError};
use serde::{Deserialize, Serialize};

/// Where the on-site energy of an orbital comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AndersonAddress {
    Unassigned,
    Deterministic,
    /// Index of the orbital's block in the realization buffer. The block
    /// starts at `slot * unit_cells`.
    RandomSlot(usize),
}

impl AndersonAddress {
    /// Flat integer encoding: -2 unassigned, -1 deterministic, else the slot.
    pub fn sentinel(self) -> i64 {
        match self {
            Self::Unassigned => ADDRESS_UNASSIGNED,
            Self::Deterministic => ADDRESS_DETERMINISTIC,
            Self::RandomSlot(slot) => slot as i64,
        }
    }
}

/// Orbital -> slot addressing for on-site disorder, plus the fixed on-site
/// energies of deterministic orbitals. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndersonAddressTable {
    addresses: Vec<AndersonAddress>,
    constants: Vec<f64>,
    terms: Vec<RandomTerm>,
}

impl AndersonAddressTable {
    /// Single forward pass over `entries` in declaration order. Random
    /// entries take consecutive slots; deterministic entries bake their mean
    /// into the constant table.
    pub fn build(entries: &[DisorderEntry], orbitals: usize) -> DisResult<Self> {
        let mut addresses = vec![AndersonAddress::Unassigned; orbitals];
        let mut constants = vec![0.0; orbitals];
        let mut terms = Vec::new();

        for entry in entries {
            let orbital = entry.orbital;
            let cell = addresses
                .get_mut(orbital)
                .ok_or(DisorderError::IndexOutOfRange {
                    what: "disorder orbital",
                    index: orbital as i64,
                    bound: orbitals,
                })?;

            if *cell != AndersonAddress::Unassigned {
                return Err(DisorderError::MalformedDisorderSpec(format!(
                    "orbital {} declares on-site disorder more than once",
                    orbital
                )));
            }

            if entry.model.kind().is_random() {
                let slot = terms.len();
                *cell = AndersonAddress::RandomSlot(slot);
                terms.push(RandomTerm {
                    orbital,
                    slot,
                    model: entry.model,
                });
            } else {
                *cell = AndersonAddress::Deterministic;
                constants[orbital] = entry.model.mean();
            }
        }

        Ok(Self {
            addresses,
            constants,
            terms,
        })
    }

    pub fn orbitals(&self) -> usize {
        self.addresses.len()
    }

    pub fn addresses(&self) -> &[AndersonAddress] {
        &self.addresses
    }

    pub fn sentinels(&self) -> Vec<i64> {
        self.addresses.iter().map(|a| a.sentinel()).collect()
    }

    pub fn address(&self, orbital: usize) -> DisResult<AndersonAddress> {
        self.addresses
            .get(orbital)
            .copied()
            .ok_or(DisorderError::IndexOutOfRange {
                what: "address table orbital",
                index: orbital as i64,
                bound: self.addresses.len(),
            })
    }

    /// Per-orbital fixed on-site energies (0 where none was declared).
    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    pub fn random_terms(&self) -> &[RandomTerm] {
        &self.terms
    }

    pub fn random_slots(&self) -> usize {
        self.terms.len()
    }

    /// Length of the realization buffer for `unit_cells` cells per slot.
    pub fn buffer_len(&self, unit_cells: usize) -> usize {
        self.terms.len() * unit_cells
    }
}
