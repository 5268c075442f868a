//! Durable result storage
//!
//! Replicate logs double as a memo cache: a committed log for a key means
//! that replicate is done and only needs to be re-read. Logs are written to a
//! staging file first and committed by rename, so a crash or a discarded run
//! never leaves something that looks like a finished replicate.

mod dataset;
mod fs_store;

pub use dataset::Dataset;
pub use fs_store::{FsResultStore, StagedLog};

use crate::analysis::MutationTable;
use crate::experiment::{LogParseError, SurvivorPolicy, TransferProtocol};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Canonical identity of one replicate slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicateKey {
    pub num_days: u32,
    pub generations_per_day: u32,
    pub mutation_rate: f64,
    pub max_plasmids: usize,
    pub max_cells: usize,
    pub survivor: SurvivorPolicy,
    pub replicate_index: u32,
}

impl ReplicateKey {
    pub fn new(protocol: &TransferProtocol, replicate_index: u32) -> Self {
        Self {
            num_days: protocol.num_days,
            generations_per_day: protocol.generations_per_day,
            mutation_rate: protocol.mutation_rate,
            max_plasmids: protocol.max_plasmids,
            max_cells: protocol.max_cells,
            survivor: protocol.survivor,
            replicate_index,
        }
    }

    /// Key shared by every replicate of one copy-number setting.
    ///
    /// The growth cap and survivor policy only show up when they differ from
    /// single-lineage tracking (`max_cells = 1`, first lineage).
    pub fn setting_stem(&self) -> String {
        let mut stem = format!(
            "d{}_g{}_mu{:e}_pcn{}",
            self.num_days, self.generations_per_day, self.mutation_rate, self.max_plasmids
        );
        if self.max_cells != 1 {
            stem.push_str(&format!("_c{}", self.max_cells));
        }
        if self.survivor == SurvivorPolicy::Uniform {
            stem.push_str("_uniform");
        }
        stem
    }
}

impl fmt::Display for ReplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_r{}", self.setting_stem(), self.replicate_index)
    }
}

/// A committed replicate read back from the store
#[derive(Debug, Clone)]
pub struct StoredReplicate {
    pub key: String,
    pub attempts: u32,
    pub sha256: String,
    pub table: MutationTable,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed log for {key}: {source}")]
    MalformedLog {
        key: String,
        #[source]
        source: LogParseError,
    },

    #[error("no committed result for {0}")]
    NotFound(String),
}

/// Where replicate logs and sweep datasets live
pub trait ResultStore: Send + Sync {
    /// In-progress log of a single attempt
    type Staged: Write;

    /// Attempt count of the committed result for `key`, if there is one
    fn exists(&self, key: &ReplicateKey) -> Result<Option<u32>, StoreError>;

    /// Read a committed result back
    fn load(&self, key: &ReplicateKey) -> Result<StoredReplicate, StoreError>;

    /// Open a fresh log for one attempt. Never visible to `exists`.
    fn stage(&self, key: &ReplicateKey) -> Result<Self::Staged, StoreError>;

    /// Commit a staged log as the result for `key`, tagged with the attempts
    /// it took
    fn save(&self, key: &ReplicateKey, staged: Self::Staged, attempts: u32) -> Result<(), StoreError>;

    /// Throw away a staged log
    fn discard(&self, staged: Self::Staged) -> Result<(), StoreError>;

    fn save_dataset(&self, dataset: &Dataset) -> Result<(), StoreError>;

    fn load_dataset(&self, protocol: &TransferProtocol) -> Result<Option<Dataset>, StoreError>;
}
