use super::{uniform_box, DisorderModel};
use crate::error::{DisResult, DisorderError};
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// A random on-site term with its precomputed buffer slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomTerm {
    pub orbital: usize,
    pub slot: usize,
    pub model: DisorderModel,
}

/// Fills `buffer` with a fresh realization of every random term.
///
/// Terms are drawn in declaration order, `unit_cells` samples each, written
/// at `slot * unit_cells`. The output depends only on the stream state.
pub fn realize<R: Rng + ?Sized>(
    terms: &[RandomTerm],
    unit_cells: usize,
    rng: &mut R,
    buffer: &mut [f64],
) -> DisResult<()> {
    let bound = buffer.len();

    for term in terms {
        let start = term.slot * unit_cells;
        let end = start + unit_cells;
        if end > bound {
            return Err(DisorderError::IndexOutOfRange {
                what: "realization buffer",
                index: (end - 1) as i64,
                bound,
            });
        }
        let block = &mut buffer[start..end];

        match term.model {
            DisorderModel::Gaussian { mean, std_dev } => {
                let dist = Normal::new(mean, std_dev)
                    .map_err(|e| DisorderError::MalformedDisorderSpec(e.to_string()))?;
                for v in block.iter_mut() {
                    *v = dist.sample(&mut *rng);
                }
            }
            DisorderModel::Uniform { mean, width } if width > 0.0 => {
                let (low, high) = uniform_box(mean, width).ok_or_else(|| {
                    DisorderError::MalformedDisorderSpec(format!(
                        "Uniform box of width {} around {} is not representable",
                        width, mean
                    ))
                })?;
                let dist = Uniform::new(low, high);
                for v in block.iter_mut() {
                    *v = dist.sample(&mut *rng);
                }
            }
            DisorderModel::Uniform { mean, .. } => block.fill(mean),
            // Deterministic energies live in the address table's constants.
            DisorderModel::Deterministic { .. } => {}
        }
    }

    Ok(())
}
