use crate::context::SimulationContext;
use crate::core_types::ReplicaSeed;
use crate::disorder::DefectBuilder;
use crate::error::{DisResult, DisorderError};
use crate::hamiltonian::HamiltonianAssembly;
use crate::pipeline::{Pipeline, StageOutput};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{error, info, warn};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder, Debug, Clone, Default)]
pub struct EnsembleOptions {
    /// Defaults to the context's thread count, one replica per worker.
    #[builder(default, setter(strip_option))]
    pub replicas: Option<usize>,
    /// Root of every replica stream. Drawn from entropy when absent.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

/// Result of one replica. `result` holds the stage outputs in pipeline order,
/// or the fault that ended the replica.
#[derive(Debug)]
pub struct ReplicaOutcome {
    pub index: usize,
    pub seed: ReplicaSeed,
    pub result: Result<Vec<StageOutput>, DisorderError>,
}

impl ReplicaOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct EnsembleReport {
    pub root_seed: u64,
    /// One per replica, in replica index order.
    pub outcomes: Vec<ReplicaOutcome>,
}

impl EnsembleReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ReplicaOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ReplicaOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ReplicaOutcome::is_ok)
    }

    /// Mean of `metric` from `stage` over the replicas that produced it.
    pub fn ensemble_mean(&self, stage: &str, metric: &str) -> Option<f64> {
        let values: Vec<f64> = self
            .succeeded()
            .filter_map(|o| o.result.as_ref().ok())
            .flat_map(|outputs| outputs.iter())
            .filter(|out| out.stage == stage)
            .filter_map(|out| out.metric(metric))
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}

/// Runs the replica ensemble on a fixed-size worker pool.
pub struct ReplicaOrchestrator<'a> {
    ctx: &'a SimulationContext,
    defect_builder: &'a dyn DefectBuilder,
}

impl<'a> ReplicaOrchestrator<'a> {
    pub fn new(ctx: &'a SimulationContext, defect_builder: &'a dyn DefectBuilder) -> Self {
        Self {
            ctx,
            defect_builder,
        }
    }

    /// Blocks until every replica has finished. Replica faults and panics are
    /// recorded in that replica's outcome; only a pool that cannot be built
    /// fails the whole run.
    pub fn run(&self, options: &EnsembleOptions, pipeline: &Pipeline) -> DisResult<EnsembleReport> {
        let replicas = options.replicas.unwrap_or_else(|| self.ctx.threads());
        let root_seed = options.seed.unwrap_or_else(rand::random);

        if replicas == 0 {
            warn!("Ensemble requested with zero replicas");
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.ctx.threads())
            .thread_name(|i| format!("replica-worker-{}", i))
            .build()
            .map_err(|e| DisorderError::ThreadPool(e.to_string()))?;

        info!(
            "Starting ensemble: {} replicas on {} workers, root seed {}, stages {:?}",
            replicas,
            self.ctx.threads(),
            root_seed,
            pipeline.stage_names()
        );

        let outcomes: Vec<ReplicaOutcome> = pool.install(|| {
            (0..replicas)
                .into_par_iter()
                .map(|index| self.run_replica(index, ReplicaSeed::new(root_seed, index as u64), pipeline))
                .collect()
        });

        for outcome in &outcomes {
            if let Err(e) = &outcome.result {
                error!("Replica {} failed: {}", outcome.index, e);
            }
        }

        let report = EnsembleReport {
            root_seed,
            outcomes,
        };
        info!(
            "Ensemble finished: {} succeeded, {} failed",
            report.succeeded().count(),
            report.failed().count()
        );
        Ok(report)
    }

    fn run_replica(&self, index: usize, seed: ReplicaSeed, pipeline: &Pipeline) -> ReplicaOutcome {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut assembly = HamiltonianAssembly::construct(self.ctx, self.defect_builder, seed.rng())?;
            pipeline.run(&mut assembly)
        }))
        .unwrap_or_else(|payload| {
            Err(DisorderError::ReplicaPanicked {
                replica: index,
                reason: panic_message(payload.as_ref()),
            })
        });

        ReplicaOutcome {
            index,
            seed,
            result,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
