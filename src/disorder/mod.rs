pub mod address;
pub mod loader;
pub mod realizer;
pub mod structural;

pub use self::address::{AndersonAddress, AndersonAddressTable};
pub use self::loader::read_disorder_entries;
pub use self::realizer::{realize, RandomTerm};
pub use self::structural::{
    discover_defects, instantiate_defects, Defect, DefectBuilder, DefectDescriptor, PointDefect,
    PointDefectBuilder,
};

use crate::error::{DisResult, DisorderError};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumString};

/// On-site disorder distribution of one orbital.
///
/// `Uniform` draws from `[mean - width / 2, mean + width / 2)`: the declared
/// spread is the full width of the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(DisorderKind))]
#[strum_discriminants(derive(Display, EnumString, EnumIter, Hash, Serialize, Deserialize))]
pub enum DisorderModel {
    Gaussian { mean: f64, std_dev: f64 },
    Uniform { mean: f64, width: f64 },
    Deterministic { value: f64 },
}

impl DisorderKind {
    pub fn code(self) -> i64 {
        match self {
            Self::Gaussian => 1,
            Self::Uniform => 2,
            Self::Deterministic => 3,
        }
    }

    pub fn from_code(code: i64) -> DisResult<Self> {
        match code {
            1 => Ok(Self::Gaussian),
            2 => Ok(Self::Uniform),
            3 => Ok(Self::Deterministic),
            other => Err(DisorderError::MalformedDisorderSpec(format!(
                "unknown disorder model code {}",
                other
            ))),
        }
    }

    pub fn is_random(self) -> bool {
        !matches!(self, Self::Deterministic)
    }
}

impl DisorderModel {
    /// Builds a model from its declared kind and the (mean, spread) pair.
    pub fn new(kind: DisorderKind, mean: f64, spread: f64) -> DisResult<Self> {
        if !mean.is_finite() {
            return Err(DisorderError::MalformedDisorderSpec(format!(
                "mean {} is not finite",
                mean
            )));
        }
        if kind.is_random() && !(spread.is_finite() && spread >= 0.0) {
            return Err(DisorderError::MalformedDisorderSpec(format!(
                "{} spread must be finite and non-negative, got {}",
                kind, spread
            )));
        }

        if kind == DisorderKind::Uniform && spread > 0.0 && uniform_box(mean, spread).is_none() {
            return Err(DisorderError::MalformedDisorderSpec(format!(
                "Uniform box of width {} around {} is not representable",
                spread, mean
            )));
        }

        Ok(match kind {
            DisorderKind::Gaussian => Self::Gaussian {
                mean,
                std_dev: spread,
            },
            DisorderKind::Uniform => Self::Uniform {
                mean,
                width: spread,
            },
            DisorderKind::Deterministic => Self::Deterministic { value: mean },
        })
    }

    pub fn kind(&self) -> DisorderKind {
        DisorderKind::from(self)
    }

    pub fn mean(&self) -> f64 {
        match *self {
            Self::Gaussian { mean, .. } | Self::Uniform { mean, .. } => mean,
            Self::Deterministic { value } => value,
        }
    }

    pub fn spread(&self) -> f64 {
        match *self {
            Self::Gaussian { std_dev, .. } => std_dev,
            Self::Uniform { width, .. } => width,
            Self::Deterministic { .. } => 0.0,
        }
    }
}

/// `[mean - width / 2, mean + width / 2)` when both ends and the span are
/// finite and the box has not collapsed to a single f64.
pub(crate) fn uniform_box(mean: f64, width: f64) -> Option<(f64, f64)> {
    let half = width / 2.0;
    let (low, high) = (mean - half, mean + half);
    (low.is_finite() && high.is_finite() && (high - low).is_finite() && low < high)
        .then_some((low, high))
}

/// One declared on-site disorder term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisorderEntry {
    pub orbital: usize,
    pub model: DisorderModel,
}

impl DisorderEntry {
    pub fn new(orbital: usize, model: DisorderModel) -> Self {
        Self { orbital, model }
    }

    pub fn gaussian(orbital: usize, mean: f64, std_dev: f64) -> Self {
        Self::new(orbital, DisorderModel::Gaussian { mean, std_dev })
    }

    pub fn uniform(orbital: usize, mean: f64, width: f64) -> Self {
        Self::new(orbital, DisorderModel::Uniform { mean, width })
    }

    pub fn deterministic(orbital: usize, value: f64) -> Self {
        Self::new(orbital, DisorderModel::Deterministic { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_round_trip_through_kind() {
        for kind in DisorderKind::iter() {
            assert_eq!(DisorderKind::from_code(kind.code()).unwrap(), kind);
        }
        assert!(DisorderKind::from_code(0).is_err());
        assert!(DisorderKind::from_code(4).is_err());
    }

    #[test]
    fn kind_names_parse() {
        assert_eq!(DisorderKind::from_str("Uniform").unwrap(), DisorderKind::Uniform);
        assert_eq!(DisorderKind::Deterministic.to_string(), "Deterministic");
    }

    #[test]
    fn rejects_negative_spread_for_random_models() {
        assert!(DisorderModel::new(DisorderKind::Gaussian, 0.0, -1.0).is_err());
        assert!(DisorderModel::new(DisorderKind::Uniform, 0.0, f64::NAN).is_err());
        // Deterministic ignores the spread column.
        let det = DisorderModel::new(DisorderKind::Deterministic, 0.3, -1.0).unwrap();
        assert_eq!(det.mean(), 0.3);
        assert_eq!(det.spread(), 0.0);
    }
}
