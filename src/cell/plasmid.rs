//! Plasmid — one copy of the tracked plasmid inside a cell
//!
//! A plasmid is never edited after creation. Replication yields a new copy
//! that inherits the parent's state, and may flip from wild-type to mutated.
//! Mutations are irreversible: a mutated plasmid only ever produces mutated
//! copies.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub type PlasmidId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plasmid {
    /// Unique within a replicate, increasing in creation order
    pub id: PlasmidId,
    /// Generation during which this copy was made
    pub origin_generation: u64,
    /// Whether this copy carries the mutation
    pub mutated: bool,
    /// Plasmid this copy was replicated from (None for seed copies)
    pub parent_id: Option<PlasmidId>,
}

impl Plasmid {
    /// Create a wild-type seed copy with no ancestry
    pub fn wild_type(id: PlasmidId, generation: u64) -> Self {
        Self {
            id,
            origin_generation: generation,
            mutated: false,
            parent_id: None,
        }
    }

    /// Copy this plasmid, drawing one Bernoulli(`mutation_rate`) mutation trial
    pub fn replicate<R: Rng + ?Sized>(
        &self,
        mutation_rate: f64,
        id: PlasmidId,
        generation: u64,
        rng: &mut R,
    ) -> Plasmid {
        // gen_bool panics outside [0, 1]; NaN never mutates
        let p = if mutation_rate.is_nan() { 0.0 } else { mutation_rate.clamp(0.0, 1.0) };
        let hit = rng.gen_bool(p);
        Plasmid {
            id,
            origin_generation: generation,
            mutated: self.mutated || hit,
            parent_id: Some(self.id),
        }
    }

    /// True when this copy is the first mutated one in its ancestry
    pub fn is_de_novo(&self, parent: &Plasmid) -> bool {
        self.mutated && !parent.mutated
    }
}
