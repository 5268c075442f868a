//! Transfer protocol — one replicate serial-transfer experiment
//!
//! Day loop over generation loop. Every generation is appended to the log
//! before the segregant check, so a discarded run leaves a complete trace up
//! to the failing generation. The protocol never deletes its log; the caller
//! decides what to do with it from the returned outcome.

use super::population::{Population, SurvivorPolicy};
use super::record::LogRecord;
use crate::cell::CellParams;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// Why a replicate carries no usable signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardReason {
    /// A cell lost all plasmid copies at this point
    Segregant { day: u32, step: u32 },
    /// The lineage ended without any mutation having segregated
    WildType,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::Segregant { day, step } => {
                write!(f, "segregant at day {} generation {}", day, step)
            }
            DiscardReason::WildType => write!(f, "wild-type lineage"),
        }
    }
}

/// What a finished run looked like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generations: u64,
    pub final_cells: usize,
    pub final_mutated_copies: usize,
    pub mutation_events: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicateOutcome {
    Success(RunSummary),
    Discarded(DiscardReason),
}

impl ReplicateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReplicateOutcome::Success(_))
    }
}

/// Parameters of a single serial-transfer experiment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferProtocol {
    pub num_days: u32,
    pub generations_per_day: u32,
    pub max_plasmids: usize,
    pub mutation_rate: f64,
    pub max_cells: usize,
    pub survivor: SurvivorPolicy,
}

impl TransferProtocol {
    pub fn cell_params(&self) -> CellParams {
        CellParams {
            mutation_rate: self.mutation_rate,
            max_plasmids: self.max_plasmids,
        }
    }

    /// Run the experiment, appending one line per generation to `log`.
    ///
    /// Only I/O on `log` can fail; segregant and wild-type runs come back as
    /// `ReplicateOutcome::Discarded`.
    pub fn run<R: Rng + ?Sized, W: Write + ?Sized>(
        &self,
        rng: &mut R,
        log: &mut W,
    ) -> io::Result<ReplicateOutcome> {
        let mut population =
            Population::founded(self.cell_params(), self.max_cells, self.survivor, rng);

        for day in 0..self.num_days {
            if day > 0 {
                population = population.transfer(rng);
            }
            for step in 0..self.generations_per_day {
                // The day's last generation is diluted straight to the cell
                // that gets transferred, so the log marks the true survivor
                let transfer_follows = step + 1 == self.generations_per_day && day + 1 < self.num_days;
                let summary = if transfer_follows {
                    population.grow_keeping(1, rng)
                } else {
                    population.grow(rng)
                };
                LogRecord { day, step, summary }.write_to(log)?;

                if population.is_segregant() {
                    debug!("pcn={} segregant at day {} generation {}", self.max_plasmids, day, step);
                    log.flush()?;
                    return Ok(ReplicateOutcome::Discarded(DiscardReason::Segregant { day, step }));
                }
            }
        }
        log.flush()?;

        if population.is_wild_type() {
            return Ok(ReplicateOutcome::Discarded(DiscardReason::WildType));
        }
        Ok(ReplicateOutcome::Success(RunSummary {
            generations: population.generation,
            final_cells: population.len(),
            final_mutated_copies: population.mutated_copies(),
            mutation_events: population.mutation_events(),
        }))
    }
}
