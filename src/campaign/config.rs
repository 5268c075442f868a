//! Campaign configuration
//!
//! One immutable value describes a whole sweep. It is passed into the
//! controller and threaded down; nothing reads parameters from global state.

use crate::experiment::{SurvivorPolicy, TransferProtocol};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters shared by every replicate of a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub num_days: u32,
    pub generations_per_day: u32,
    /// Per-copy probability of introducing the mutation during replication
    pub mutation_rate: f64,
    /// Cells grown per generation before dilution (1 tracks a single lineage)
    pub max_cells: usize,
    /// Which cells survive dilution and the daily transfer
    pub survivor: SurvivorPolicy,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            num_days: 60,
            generations_per_day: 24,
            mutation_rate: 18e-7,
            max_cells: 1,
            survivor: SurvivorPolicy::FirstLineage,
        }
    }
}

impl SimulationSettings {
    pub fn protocol(&self, max_plasmids: usize) -> TransferProtocol {
        TransferProtocol {
            num_days: self.num_days,
            generations_per_day: self.generations_per_day,
            max_plasmids,
            mutation_rate: self.mutation_rate,
            max_cells: self.max_cells,
            survivor: self.survivor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub simulation: SimulationSettings,
    /// Copy-number ceilings to sweep, one campaign each
    pub plasmid_copy_numbers: Vec<usize>,
    /// Informative replicates wanted per copy number
    pub num_replicates: u32,
    /// Simulations a campaign may run before giving up
    pub max_attempts: u32,
    /// Base seed; a random one is drawn when absent
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            plasmid_copy_numbers: vec![1, 2, 5, 10, 20, 50, 100],
            num_replicates: 20,
            max_attempts: 5000,
            seed: None,
            output_dir: PathBuf::from("pcn-results"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("mutation rate must lie in [0, 1], got {0}")]
    MutationRate(f64),

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("no plasmid copy numbers to sweep")]
    NoCopyNumbers,

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

impl CampaignConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(0.0..=1.0).contains(&sim.mutation_rate) {
            return Err(ConfigError::MutationRate(sim.mutation_rate));
        }
        if sim.num_days == 0 {
            return Err(ConfigError::Zero("num_days"));
        }
        if sim.generations_per_day == 0 {
            return Err(ConfigError::Zero("generations_per_day"));
        }
        if sim.max_cells == 0 {
            return Err(ConfigError::Zero("max_cells"));
        }
        if self.plasmid_copy_numbers.is_empty() {
            return Err(ConfigError::NoCopyNumbers);
        }
        if self.plasmid_copy_numbers.contains(&0) {
            return Err(ConfigError::Zero("plasmid copy number"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Zero("max_attempts"));
        }
        Ok(())
    }

    /// Load a config from JSON; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Small, fast settings for demos and smoke tests
    pub fn demo(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            simulation: SimulationSettings {
                num_days: 5,
                generations_per_day: 24,
                mutation_rate: 1e-3,
                ..SimulationSettings::default()
            },
            plasmid_copy_numbers: vec![1, 10, 50],
            num_replicates: 5,
            max_attempts: 200,
            seed: Some(2024),
            output_dir: output_dir.into(),
        }
    }
}
