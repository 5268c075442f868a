//! Experiment — populations and the daily serial-transfer protocol
//!
//! A replicate starts from one founder, grows for a number of generations
//! each day and passes a single survivor on to the next day.

mod population;
mod protocol;
mod record;

pub use population::{Population, SurvivorPolicy};
pub use protocol::{DiscardReason, ReplicateOutcome, RunSummary, TransferProtocol};
pub use record::{CellSummary, GenerationSummary, LogParseError, LogRecord};
