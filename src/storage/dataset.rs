//! Dataset — the aggregate artifact of one copy-number setting
//!
//! Written once at the end of a campaign. `complete` is false when the
//! attempt budget ran out before enough informative replicates were found.

use super::ReplicateKey;
use crate::analysis::ReplicateStats;
use crate::experiment::TransferProtocol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub protocol: TransferProtocol,
    pub requested: u32,
    pub complete: bool,
    pub created_at: DateTime<Utc>,
    pub records: Vec<ReplicateStats>,
}

impl Dataset {
    pub fn new(protocol: TransferProtocol, requested: u32, records: Vec<ReplicateStats>) -> Self {
        Self {
            protocol,
            requested,
            complete: records.len() as u32 >= requested,
            created_at: Utc::now(),
            records,
        }
    }

    /// File stem shared with the replicate keys of this setting
    pub fn stem(&self) -> String {
        stem_for(&self.protocol)
    }

    /// Mean attempts spent per informative replicate
    pub fn mean_attempts(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().map(|r| r.attempts as f64).sum::<f64>() / self.records.len() as f64
    }

    /// Mean cumulative count of newly arisen mutations per replicate
    pub fn mean_total_new(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().map(|r| r.series.total_new() as f64).sum::<f64>()
            / self.records.len() as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "Dataset '{}' | {}/{} replicates{} | mean attempts {:.1} | mean new mutations {:.3}",
            self.stem(),
            self.records.len(),
            self.requested,
            if self.complete { "" } else { " (incomplete)" },
            self.mean_attempts(),
            self.mean_total_new(),
        )
    }
}

pub(crate) fn stem_for(protocol: &TransferProtocol) -> String {
    ReplicateKey::new(protocol, 0).setting_stem()
}
