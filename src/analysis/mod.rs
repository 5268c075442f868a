//! Analysis — read per-generation logs back and derive mutation statistics
//!
//! Everything here is a pure transform over the log format written by the
//! transfer protocol.

mod table;
mod stats;

pub use table::MutationTable;
pub use stats::{
    count_fixed_muts, count_lost_muts, count_muts, count_mutated_copies, count_new_muts,
    cumulative, GenerationSeries, ReplicateStats,
};
