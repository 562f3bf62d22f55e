use super::{DisorderEntry, DisorderKind, DisorderModel};
use crate::consts::{
    PATH_DISORDER_GROUP, PATH_DISORDER_MEANS, PATH_DISORDER_MODELS, PATH_DISORDER_ORBITALS,
    PATH_DISORDER_SPREADS,
};
use crate::error::{DisResult, DisorderError};
use crate::store::ConfigStore;
use tracing::debug;

/// Reads the on-site disorder declarations in declaration order.
///
/// The four parallel arrays under `/Hamiltonian/Disorder` are zipped
/// positionally. A store without the disorder group describes a clean
/// lattice and yields no entries; a group with a missing array is an error.
/// Orbital indices outside `[0, orbitals)` fail with `IndexOutOfRange`.
pub fn read_disorder_entries(
    store: &dyn ConfigStore,
    orbitals: usize,
) -> DisResult<Vec<DisorderEntry>> {
    if !store.contains(PATH_DISORDER_GROUP) {
        debug!("No on-site disorder group; lattice is clean");
        return Ok(Vec::new());
    }

    let declared = store.read_i64_array(PATH_DISORDER_ORBITALS)?;
    let models = store.read_i64_array(PATH_DISORDER_MODELS)?;
    let means = store.read_f64_array(PATH_DISORDER_MEANS)?;
    let spreads = store.read_f64_array(PATH_DISORDER_SPREADS)?;

    let m = declared.len();
    if models.len() != m || means.len() != m || spreads.len() != m {
        return Err(DisorderError::MalformedDisorderSpec(format!(
            "disorder arrays differ in length: orbitals={}, models={}, means={}, spreads={}",
            m,
            models.len(),
            means.len(),
            spreads.len()
        )));
    }

    let entries = declared
        .iter()
        .zip(&models)
        .zip(means.iter().zip(&spreads))
        .map(|((&orbital, &code), (&mean, &spread))| {
            let orbital = usize::try_from(orbital)
                .ok()
                .filter(|&o| o < orbitals)
                .ok_or(DisorderError::IndexOutOfRange {
                    what: "disorder orbital",
                    index: orbital,
                    bound: orbitals,
                })?;
            let kind = DisorderKind::from_code(code)?;
            Ok(DisorderEntry::new(orbital, DisorderModel::new(kind, mean, spread)?))
        })
        .collect::<DisResult<Vec<_>>>()?;

    debug!("Read {} on-site disorder entries", entries.len());
    Ok(entries)
}
