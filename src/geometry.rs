use crate::consts::{
    DOMAIN_TILE, GHOST_WIDTH, MAX_DIMENSIONS, PATH_DIVISIONS, PATH_LENGTHS, PATH_N_ORBITALS,
};
use crate::error::{DisResult, DisorderError};
use crate::store::ConfigStore;
use serde::{Deserialize, Serialize};

/// Immutable description of the lattice one replica works on.
pub trait LatticeGeometry: Send + Sync {
    /// Orbitals per unit cell (`Orb`).
    fn orbitals(&self) -> usize;

    /// Unit cells owned by one replica (`Nd`).
    fn unit_cells(&self) -> usize;

    /// Structural domains the unit cells are tiled into (`NStr`).
    fn domains(&self) -> usize;

    /// Length of the ghost exchange buffer.
    fn border_size(&self) -> usize;

    /// Worker threads the lattice decomposition was prepared for.
    fn thread_count(&self) -> usize;

    /// Domain that contains unit cell `cell`.
    fn domain_of(&self, cell: usize) -> usize;
}

/// Hypercubic decomposition read from the configuration store.
///
/// The full lattice of `lengths` is split into `divisions` blocks, one per
/// thread. Each block is tiled into domains of `DOMAIN_TILE` cells per
/// dimension (the last tile in a dimension may be shorter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeStructure {
    pub orbitals: usize,
    pub lengths: Vec<usize>,
    pub divisions: Vec<usize>,
}

impl LatticeStructure {
    pub fn new(orbitals: usize, lengths: Vec<usize>, divisions: Vec<usize>) -> DisResult<Self> {
        let dims = lengths.len();
        if dims == 0 || dims > MAX_DIMENSIONS {
            return Err(DisorderError::Geometry(format!(
                "lattice must have 1..={} dimensions, got {}",
                MAX_DIMENSIONS, dims
            )));
        }
        if divisions.len() != dims {
            return Err(DisorderError::Geometry(format!(
                "{} lengths but {} divisions",
                dims,
                divisions.len()
            )));
        }
        if orbitals == 0 {
            return Err(DisorderError::Geometry("lattice has 0 orbitals".to_string()));
        }
        for (d, (&l, &n)) in lengths.iter().zip(&divisions).enumerate() {
            if n == 0 || l == 0 || l % n != 0 {
                return Err(DisorderError::Geometry(format!(
                    "dimension {}: length {} is not divisible into {} parts",
                    d, l, n
                )));
            }
        }

        Ok(Self {
            orbitals,
            lengths,
            divisions,
        })
    }

    pub fn load(store: &dyn ConfigStore) -> DisResult<Self> {
        let orbitals = store.read_usize(PATH_N_ORBITALS)?;
        let lengths = store.read_usize_array(PATH_LENGTHS)?;
        let divisions = store.read_usize_array(PATH_DIVISIONS)?;
        Self::new(orbitals, lengths, divisions)
    }

    /// Unit cells per dimension inside one block.
    pub fn local_lengths(&self) -> Vec<usize> {
        self.lengths
            .iter()
            .zip(&self.divisions)
            .map(|(l, n)| l / n)
            .collect()
    }

    fn tiles_per_dim(&self) -> Vec<usize> {
        self.local_lengths()
            .iter()
            .map(|l| l.div_ceil(DOMAIN_TILE))
            .collect()
    }
}

impl LatticeGeometry for LatticeStructure {
    fn orbitals(&self) -> usize {
        self.orbitals
    }

    fn unit_cells(&self) -> usize {
        self.local_lengths().iter().product()
    }

    fn domains(&self) -> usize {
        self.tiles_per_dim().iter().product()
    }

    fn border_size(&self) -> usize {
        let ld = self.local_lengths();
        let faces: usize = (0..ld.len())
            .map(|d| {
                ld.iter()
                    .enumerate()
                    .filter(|&(j, _)| j != d)
                    .map(|(_, l)| *l)
                    .product::<usize>()
            })
            .sum();
        2 * GHOST_WIDTH * faces * self.orbitals
    }

    fn thread_count(&self) -> usize {
        self.divisions.iter().product()
    }

    // Cells are numbered with dimension 0 running fastest.
    fn domain_of(&self, cell: usize) -> usize {
        let ld = self.local_lengths();
        let tiles = self.tiles_per_dim();
        let mut rest = cell;
        let mut domain = 0;
        let mut stride = 1;
        for (l, t) in ld.iter().zip(&tiles) {
            let coord = rest % l;
            rest /= l;
            domain += (coord / DOMAIN_TILE) * stride;
            stride *= t;
        }
        domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_lattice_counts() {
        let lat = LatticeStructure::new(2, vec![8, 8], vec![2, 1]).unwrap();
        assert_eq!(lat.local_lengths(), vec![4, 8]);
        assert_eq!(lat.unit_cells(), 32);
        assert_eq!(lat.domains(), 2 * 4);
        assert_eq!(lat.thread_count(), 2);
        // faces: 8 (normal to dim 0) + 4 (normal to dim 1)
        assert_eq!(lat.border_size(), 2 * GHOST_WIDTH * 12 * 2);
    }

    #[test]
    fn domain_of_walks_tiles() {
        let lat = LatticeStructure::new(1, vec![4, 4], vec![1, 1]).unwrap();
        assert_eq!(lat.domain_of(0), 0);
        assert_eq!(lat.domain_of(1), 0);
        assert_eq!(lat.domain_of(2), 1);
        assert_eq!(lat.domain_of(4), 0);
        assert_eq!(lat.domain_of(8), 2);
        assert_eq!(lat.domain_of(15), 3);
    }

    #[test]
    fn rejects_uneven_division() {
        assert!(LatticeStructure::new(1, vec![5], vec![2]).is_err());
        assert!(LatticeStructure::new(1, vec![4, 4], vec![2]).is_err());
        assert!(LatticeStructure::new(0, vec![4], vec![1]).is_err());
    }
}
