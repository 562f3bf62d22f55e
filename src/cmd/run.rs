use crate::reports;
use clap::Args;
use tbdisorder::config::EnsembleConfig;
use tbdisorder::context::SimulationContext;
use tbdisorder::disorder::PointDefectBuilder;
use tbdisorder::error::DisResult;
use tbdisorder::orchestrator::ReplicaOrchestrator;
use tbdisorder::pipeline::{OnsiteStatistics, Pipeline};
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: EnsembleConfig,

    /// Print the full report as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: RunArgs, config: &EnsembleConfig, ctx: &SimulationContext) -> DisResult<()> {
    let pipeline = Pipeline::new().with_stage(OnsiteStatistics::new(config.realizations));
    let builder = PointDefectBuilder;

    let orchestrator = ReplicaOrchestrator::new(ctx, &builder);
    let report = orchestrator.run(&config.options(), &pipeline)?;

    if args.json {
        println!("{}", reports::ensemble_json(&report)?);
    } else {
        reports::print_ensemble_report(&report);
        reports::print_ensemble_summary(&report, OnsiteStatistics::NAME);
    }

    let failed = report.failed().count();
    if failed > 0 {
        warn!("⚠️  {} of {} replicas failed", failed, report.outcomes.len());
    }
    Ok(())
}
