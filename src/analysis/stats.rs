//! Generation-indexed mutation statistics
//!
//! Counts are per generation step, in log order, over the retained cells only:
//! daughters diluted away never divide, so they are not part of the lineage.
//! A cell "carries" the mutation when at least one of its copies is mutated;
//! the mutation is fixed in that cell when every copy is mutated and
//! heterogeneous otherwise. A mutation is new in a cell whose mother carried
//! no mutated copy before replicating, and lost in a cell that inherited none
//! of its mother's mutated copies.

use super::MutationTable;
use crate::experiment::CellSummary;
use serde::{Deserialize, Serialize};

fn per_generation(table: &MutationTable, count: impl Fn(&CellSummary) -> usize) -> Vec<usize> {
    table
        .records
        .iter()
        .map(|r| {
            r.summary
                .cells
                .iter()
                .filter(|c| c.retained)
                .map(&count)
                .sum::<usize>()
        })
        .collect()
}

/// Mutated plasmid copies across the retained cells
pub fn count_mutated_copies(table: &MutationTable) -> Vec<usize> {
    per_generation(table, |c| c.mutated)
}

/// Cells carrying the mutation
pub fn count_muts(table: &MutationTable) -> Vec<usize> {
    per_generation(table, |c| usize::from(c.carries_mutation()))
}

/// Cells in which the mutation is fixed
pub fn count_fixed_muts(table: &MutationTable) -> Vec<usize> {
    per_generation(table, |c| usize::from(c.is_fixed()))
}

/// Cells in which the mutation newly arose
pub fn count_new_muts(table: &MutationTable) -> Vec<usize> {
    per_generation(table, |c| usize::from(c.gained_mutation()))
}

/// Cells that lost the mutation their mother carried
pub fn count_lost_muts(table: &MutationTable) -> Vec<usize> {
    per_generation(table, |c| usize::from(c.lost_mutation()))
}

/// Running total of a per-generation series
pub fn cumulative(series: &[usize]) -> Vec<usize> {
    series
        .iter()
        .scan(0usize, |total, &n| {
            *total += n;
            Some(*total)
        })
        .collect()
}

/// All per-generation series derived from one log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSeries {
    pub mutated_copies: Vec<usize>,
    pub muts: Vec<usize>,
    pub fixed: Vec<usize>,
    pub heterogeneous: Vec<usize>,
    pub new: Vec<usize>,
    pub cumulative_new: Vec<usize>,
    pub lost: Vec<usize>,
    pub cumulative_lost: Vec<usize>,
}

impl GenerationSeries {
    pub fn from_table(table: &MutationTable) -> Self {
        let muts = count_muts(table);
        let fixed = count_fixed_muts(table);
        let heterogeneous = muts.iter().zip(&fixed).map(|(m, f)| m - f).collect();
        let new = count_new_muts(table);
        let lost = count_lost_muts(table);
        Self {
            mutated_copies: count_mutated_copies(table),
            cumulative_new: cumulative(&new),
            cumulative_lost: cumulative(&lost),
            muts,
            fixed,
            heterogeneous,
            new,
            lost,
        }
    }

    pub fn generations(&self) -> usize {
        self.muts.len()
    }

    pub fn total_new(&self) -> usize {
        self.cumulative_new.last().copied().unwrap_or(0)
    }

    pub fn total_lost(&self) -> usize {
        self.cumulative_lost.last().copied().unwrap_or(0)
    }
}

/// Statistics record for one informative replicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicateStats {
    pub replicate_index: u32,
    /// Attempts it took to obtain this replicate, the successful one included
    pub attempts: u32,
    pub key: String,
    /// SHA-256 of the log the series were derived from
    pub log_sha256: String,
    pub series: GenerationSeries,
}

impl ReplicateStats {
    pub fn from_table(
        table: &MutationTable,
        replicate_index: u32,
        attempts: u32,
        key: impl Into<String>,
        log_sha256: impl Into<String>,
    ) -> Self {
        Self {
            replicate_index,
            attempts,
            key: key.into(),
            log_sha256: log_sha256.into(),
            series: GenerationSeries::from_table(table),
        }
    }
}
