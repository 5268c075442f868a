//! Cells and their plasmids — the replication and segregation engine
//!
//! A bacterium carries a pool of plasmid copies. Each generation the pool is
//! replicated back up to the copy-number ceiling (the only place mutations
//! arise) and then split at random between two daughters.

mod ids;
mod plasmid;
mod bacterium;

pub use ids::IdAllocator;
pub use plasmid::{Plasmid, PlasmidId};
pub use bacterium::{Bacterium, CellId, CellParams};
