//! PCN — plasmid copy number simulator
//!
//! Simulates how mutations accumulate in multicopy plasmids when a bacterial
//! lineage is passed through a single-cell bottleneck every day. Copy number
//! raises mutation supply, random partitioning at division removes mutant
//! copies again; this crate measures the balance by Monte Carlo.

pub mod analysis;
pub mod campaign;
pub mod cell;
pub mod experiment;
pub mod storage;

pub use analysis::{MutationTable, ReplicateStats};
pub use campaign::{run_sweep, CampaignConfig, CampaignController, CampaignReport, CampaignStatus};
pub use cell::{Bacterium, Plasmid};
pub use experiment::{Population, ReplicateOutcome, TransferProtocol};
pub use storage::{FsResultStore, ResultStore};
