//! Monotonic id source for plasmids and cells
//!
//! One allocator lives inside each simulated population, so ids are unique
//! within a replicate and never depend on process-wide state.

use super::{CellId, PlasmidId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next_plasmid: PlasmidId,
    next_cell: CellId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next plasmid id
    pub fn plasmid(&mut self) -> PlasmidId {
        let id = self.next_plasmid;
        self.next_plasmid += 1;
        id
    }

    /// Hand out the next cell id
    pub fn cell(&mut self) -> CellId {
        let id = self.next_cell;
        self.next_cell += 1;
        id
    }

    /// Number of plasmids created so far
    pub fn plasmids_issued(&self) -> u64 {
        self.next_plasmid
    }
}
