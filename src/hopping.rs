use crate::consts::{PATH_HOPPINGS, PATH_N_HOPPINGS};
use crate::error::{DisResult, DisorderError};
use crate::store::ConfigStore;
use serde::{Deserialize, Serialize};

/// Read-only handle to the clean (periodic) hopping operator.
///
/// Hopping amplitudes are stored flat, grouped by source orbital:
/// `per_orbital[o]` amplitudes belong to orbital `o`. The counts always sum
/// to the number of amplitudes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHoppingTable")]
pub struct HoppingTable {
    per_orbital: Vec<usize>,
    amplitudes: Vec<f64>,
}

#[derive(Deserialize)]
struct RawHoppingTable {
    per_orbital: Vec<usize>,
    amplitudes: Vec<f64>,
}

impl TryFrom<RawHoppingTable> for HoppingTable {
    type Error = DisorderError;

    fn try_from(raw: RawHoppingTable) -> DisResult<Self> {
        Self::new(raw.per_orbital, raw.amplitudes)
    }
}

impl HoppingTable {
    /// Fails with `ConfigRead` unless the per-orbital counts add up to the
    /// amplitude count.
    pub fn new(per_orbital: Vec<usize>, amplitudes: Vec<f64>) -> DisResult<Self> {
        let declared = per_orbital
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n));
        if declared != Some(amplitudes.len()) {
            return Err(DisorderError::config_read(
                PATH_HOPPINGS,
                format!(
                    "per-orbital counts {:?} do not cover {} amplitudes",
                    per_orbital,
                    amplitudes.len()
                ),
            ));
        }
        Ok(Self {
            per_orbital,
            amplitudes,
        })
    }

    /// Reads the table. A store without hopping datasets yields an empty table.
    pub fn load(store: &dyn ConfigStore, orbitals: usize) -> DisResult<Self> {
        if !store.contains(PATH_N_HOPPINGS) {
            return Self::new(vec![0; orbitals], Vec::new());
        }

        let per_orbital = store.read_usize_array(PATH_N_HOPPINGS)?;
        let amplitudes = store.read_f64_array(PATH_HOPPINGS)?;

        if per_orbital.len() != orbitals {
            return Err(DisorderError::config_read(
                PATH_N_HOPPINGS,
                format!("expected {} entries, got {}", orbitals, per_orbital.len()),
            ));
        }
        Self::new(per_orbital, amplitudes)
    }

    pub fn orbitals(&self) -> usize {
        self.per_orbital.len()
    }

    pub fn hopping_count(&self) -> usize {
        self.amplitudes.len()
    }

    /// Amplitudes whose source is `orbital`.
    pub fn from_orbital(&self, orbital: usize) -> DisResult<&[f64]> {
        let bound = self.per_orbital.len();
        let count = *self
            .per_orbital
            .get(orbital)
            .ok_or(DisorderError::IndexOutOfRange {
                what: "hopping orbital",
                index: orbital as i64,
                bound,
            })?;
        let start: usize = self.per_orbital[..orbital].iter().sum();
        self.amplitudes
            .get(start..start + count)
            .ok_or(DisorderError::IndexOutOfRange {
                what: "hopping amplitude",
                index: (start + count) as i64,
                bound: self.amplitudes.len(),
            })
    }

    /// Largest total hopping magnitude leaving a single orbital.
    pub fn max_row_sum(&self) -> f64 {
        (0..self.per_orbital.len())
            .filter_map(|o| self.from_orbital(o).ok())
            .map(|row| row.iter().map(|a| a.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }
}
