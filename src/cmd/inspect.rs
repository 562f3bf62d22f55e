use crate::reports;
use clap::Args;
use tbdisorder::config::EnsembleConfig;
use tbdisorder::context::SimulationContext;
use tbdisorder::core_types::ReplicaSeed;
use tbdisorder::disorder::PointDefectBuilder;
use tbdisorder::error::DisResult;
use tbdisorder::hamiltonian::HamiltonianAssembly;

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub config: EnsembleConfig,

    /// Draw one realization and show the on-site energies of the first cells.
    #[arg(long, default_value_t = false)]
    pub sample: bool,

    #[arg(long, default_value_t = 4)]
    pub cells: usize,
}

pub fn run(args: InspectArgs, config: &EnsembleConfig, ctx: &SimulationContext) -> DisResult<()> {
    let seed = ReplicaSeed::new(config.seed.unwrap_or(0), 0);
    let mut assembly = HamiltonianAssembly::construct(ctx, &PointDefectBuilder, seed.rng())?;

    println!("\n🔎 === LATTICE & DISORDER === 🔎");
    reports::print_context_summary(ctx);
    reports::print_address_table(&assembly);
    reports::print_defects(&assembly);

    if args.sample {
        assembly.generate_disorder()?;
        reports::print_onsite_sample(&assembly, args.cells)?;
    }
    Ok(())
}
