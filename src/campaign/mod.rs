//! Campaigns — repeated experiments per copy number, cached on disk
//!
//! A sweep runs one campaign per plasmid copy number. Each campaign keeps
//! retrying the transfer protocol until it has enough informative replicates
//! or runs out of attempts.

mod config;
mod controller;
mod sweep;

pub use config::{CampaignConfig, ConfigError, SimulationSettings};
pub use controller::{attempt_seed, CampaignController, CampaignError, CampaignReport, CampaignStatus};
pub use sweep::{run_sweep, run_sweep_with};
