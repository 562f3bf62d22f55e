use crate::error::{DisResult, DisorderError};
use crate::orchestrator::EnsembleOptions;
use clap::parser::ValueSource;
use clap::{ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Run parameters for an ensemble. Everything the simulation input itself
/// does not describe.
#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Number of replicas; one per worker when omitted.
    #[arg(long)]
    pub replicas: Option<usize>,

    /// Root seed of the replica streams.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads; the lattice decomposition decides when omitted.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Disorder realizations drawn by each replica.
    #[arg(long, default_value_t = 10)]
    pub realizations: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            replicas: None,
            seed: None,
            threads: None,
            realizations: 10,
        }
    }
}

impl EnsembleConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> DisResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DisorderError::config_read(&path.display().to_string(), e.to_string())
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copies every value the user typed on the command line over `self`.
    pub fn merge_from_cli(&mut self, cli: &EnsembleConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(replicas);
        update_if_present!(seed);
        update_if_present!(threads);
        update_if_present!(realizations);
    }

    pub fn options(&self) -> EnsembleOptions {
        EnsembleOptions {
            replicas: self.replicas,
            seed: self.seed,
        }
    }
}
