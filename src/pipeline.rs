use crate::error::{DisResult, DisorderError};
use crate::hamiltonian::HamiltonianAssembly;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Named scalar results produced by one stage of one replica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: String,
    pub metrics: Vec<(String, f64)>,
}

impl StageOutput {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            metrics: Vec::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.push((name.into(), value));
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// One step of the per-replica analysis. Stages draw realizations through
/// the assembly they are handed; they never see another replica's state.
pub trait AnalysisStage: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, assembly: &mut HamiltonianAssembly<'_>) -> DisResult<StageOutput>;
}

/// Ordered list of stages run once per replica.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn AnalysisStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage<S: AnalysisStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn push(&mut self, stage: Box<dyn AnalysisStage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs every stage in order; the first failure ends the replica.
    pub fn run(&self, assembly: &mut HamiltonianAssembly<'_>) -> DisResult<Vec<StageOutput>> {
        let mut outputs = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            debug!("Running stage '{}'", stage.name());
            outputs.push(stage.run(assembly)?);
        }
        Ok(outputs)
    }
}

/// Draws `realizations` disorder configurations and reports the mean and
/// variance of the on-site potential over every orbital and unit cell, plus
/// the mean number of occupied defect sites per realization.
#[derive(Debug, Clone, Copy)]
pub struct OnsiteStatistics {
    pub realizations: usize,
}

impl OnsiteStatistics {
    pub const NAME: &'static str = "onsite_statistics";

    pub fn new(realizations: usize) -> Self {
        Self { realizations }
    }
}

impl AnalysisStage for OnsiteStatistics {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, assembly: &mut HamiltonianAssembly<'_>) -> DisResult<StageOutput> {
        if self.realizations == 0 {
            return Err(DisorderError::Stage {
                stage: Self::NAME.to_string(),
                reason: "needs at least one realization".to_string(),
            });
        }

        let orbitals = assembly.geometry().orbitals();
        let unit_cells = assembly.geometry().unit_cells();
        let domains = assembly.geometry().domains();

        // Welford
        let mut count = 0u64;
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut defect_sites = 0usize;

        for _ in 0..self.realizations {
            assembly.generate_disorder()?;

            for orbital in 0..orbitals {
                for cell in 0..unit_cells {
                    let e = assembly.onsite_energy(orbital, cell)?;
                    count += 1;
                    let delta = e - mean;
                    mean += delta / count as f64;
                    m2 += delta * (e - mean);
                }
            }

            for domain in 0..domains {
                defect_sites += assembly.defects_in_domain(domain)?.len();
            }
        }

        let variance = if count > 0 { m2 / count as f64 } else { 0.0 };

        Ok(StageOutput::new(Self::NAME)
            .with_metric("mean", mean)
            .with_metric("variance", variance)
            .with_metric("samples", count as f64)
            .with_metric(
                "defect_sites",
                defect_sites as f64 / self.realizations as f64,
            ))
    }
}
