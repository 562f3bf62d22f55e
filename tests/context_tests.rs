mod common;

use common::LatticeDoc;
use rstest::rstest;
use tbdisorder::context::SimulationContext;
use tbdisorder::error::DisorderError;
use tbdisorder::hopping::HoppingTable;

#[test]
fn test_context_reads_shared_state() {
    let ctx = LatticeDoc::new(2, &[8, 4], &[2, 2]).energy_scale(3.5).context();

    assert_eq!(ctx.energy_scale(), 3.5);
    assert_eq!(ctx.threads(), 4);
    assert_eq!(ctx.geometry().unit_cells(), 8);
    // local block 4x2: faces 2 + 4
    assert_eq!(ctx.ghosts().len(), 2 * 2 * 6 * 2);
    assert!(ctx.ghosts().iter().all(|&g| g == 0.0));
    assert_eq!(ctx.hopping().hopping_count(), 0);
}

#[test]
fn test_thread_override() {
    let ctx = LatticeDoc::chain(1, 4).context_with_threads(6);
    assert_eq!(ctx.threads(), 6);
}

#[test]
fn test_zero_threads_rejected() {
    let err = SimulationContext::from_store(LatticeDoc::chain(1, 4).store(), Some(0))
        .err()
        .unwrap();
    assert!(matches!(err, DisorderError::ThreadPool(_)));
}

#[rstest]
#[case::zero(0.0)]
#[case::negative(-2.0)]
fn test_energy_scale_must_be_positive(#[case] scale: f64) {
    let store = LatticeDoc::chain(1, 4).energy_scale(scale).store();
    assert!(matches!(
        SimulationContext::from_store(store, None),
        Err(DisorderError::ConfigRead { .. })
    ));
}

#[test]
fn test_hopping_table_is_grouped_by_orbital() {
    let ctx = LatticeDoc::chain(2, 4)
        .hoppings(&[2, 1], &[-1.0, 0.5, -2.0])
        .context();

    let hop = ctx.hopping();
    assert_eq!(hop.hopping_count(), 3);
    assert_eq!(hop.from_orbital(0).unwrap(), &[-1.0, 0.5]);
    assert_eq!(hop.from_orbital(1).unwrap(), &[-2.0]);
    assert!(hop.from_orbital(2).is_err());
    assert_eq!(hop.max_row_sum(), 2.0);
}

#[test]
fn test_hopping_count_mismatch() {
    let store = LatticeDoc::chain(2, 4).hoppings(&[2, 2], &[1.0]).store();
    assert!(matches!(
        SimulationContext::from_store(store, None),
        Err(DisorderError::ConfigRead { .. })
    ));
}

#[rstest]
#[case::short_amplitudes(vec![3], vec![1.0])]
#[case::extra_amplitudes(vec![1, 0], vec![1.0, 2.0])]
fn test_hand_built_hopping_table_is_validated(
    #[case] per_orbital: Vec<usize>,
    #[case] amplitudes: Vec<f64>,
) {
    assert!(matches!(
        HoppingTable::new(per_orbital, amplitudes),
        Err(DisorderError::ConfigRead { .. })
    ));
}

#[rstest]
#[case::uneven_split(&[5], &[2])]
#[case::too_many_dimensions(&[2, 2, 2, 2], &[1, 1, 1, 1])]
#[case::missing_division(&[4, 4], &[1])]
fn test_bad_lattice(#[case] lengths: &[usize], #[case] divisions: &[usize]) {
    let store = LatticeDoc::new(1, lengths, divisions).store();
    assert!(matches!(
        SimulationContext::from_store(store, None),
        Err(DisorderError::Geometry(_))
    ));
}
