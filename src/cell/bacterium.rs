//! Bacterium — a host cell owning a pool of plasmid copies
//!
//! Two operations drive the whole model:
//! - `replicate_to_capacity` refills the pool up to the copy-number ceiling,
//!   picking templates uniformly (with replacement) from the pre-replication
//!   pool, which mirrors unregulated copy-number control.
//! - `segregate` flips a fair coin for every copy to decide which daughter
//!   inherits it. Nothing is replicated or mutated during division.

use super::{IdAllocator, Plasmid};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type CellId = u64;

/// Per-cell replication parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellParams {
    /// Probability that a single plasmid copy event introduces the mutation
    pub mutation_rate: f64,
    /// Plasmid copy number ceiling (PCN)
    pub max_plasmids: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bacterium {
    pub id: CellId,
    pub generation: u64,
    plasmids: Vec<Plasmid>,
    pub params: CellParams,
}

impl Bacterium {
    pub fn new(id: CellId, generation: u64, plasmids: Vec<Plasmid>, params: CellParams) -> Self {
        Self {
            id,
            generation,
            plasmids,
            params,
        }
    }

    /// Build a founder cell already filled to the copy-number ceiling with
    /// wild-type copies. Seeding replicates a single wild-type plasmid with
    /// mutations switched off, so the founder starts clean.
    pub fn founder<R: Rng + ?Sized>(params: CellParams, ids: &mut IdAllocator, rng: &mut R) -> Self {
        let mut cell = Self::new(
            ids.cell(),
            0,
            vec![Plasmid::wild_type(ids.plasmid(), 0)],
            CellParams {
                mutation_rate: 0.0,
                ..params
            },
        );
        cell.replicate_to_capacity(rng, ids);
        cell.params = params;
        cell
    }

    pub fn plasmids(&self) -> &[Plasmid] {
        &self.plasmids
    }

    pub fn plasmid_count(&self) -> usize {
        self.plasmids.len()
    }

    pub fn mutated_count(&self) -> usize {
        self.plasmids.iter().filter(|p| p.mutated).count()
    }

    /// A cell that lost every copy of the plasmid
    pub fn is_segregant(&self) -> bool {
        self.plasmids.is_empty()
    }

    /// All copies carry the mutation
    pub fn is_fixed(&self) -> bool {
        !self.plasmids.is_empty() && self.plasmids.iter().all(|p| p.mutated)
    }

    /// Replicate plasmids until the pool reaches `max_plasmids`.
    ///
    /// Templates are drawn only from the copies present before this call, so
    /// a fresh copy is never itself a template within the same generation.
    /// Returns the number of de-novo mutations introduced.
    pub fn replicate_to_capacity<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        ids: &mut IdAllocator,
    ) -> usize {
        let template_count = self.plasmids.len();
        if template_count == 0 {
            return 0;
        }

        let mut de_novo = 0;
        self.plasmids.reserve(self.params.max_plasmids.saturating_sub(template_count));
        while self.plasmids.len() < self.params.max_plasmids {
            let template = &self.plasmids[rng.gen_range(0..template_count)];
            let copy = template.replicate(self.params.mutation_rate, ids.plasmid(), self.generation, rng);
            if copy.is_de_novo(template) {
                de_novo += 1;
            }
            self.plasmids.push(copy);
        }
        de_novo
    }

    /// Divide into two daughters, assigning every copy by an independent fair
    /// coin flip. The parent is consumed.
    pub fn segregate<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        ids: &mut IdAllocator,
    ) -> (Bacterium, Bacterium) {
        let generation = self.generation + 1;
        let half = self.plasmids.len() / 2 + 1;
        let mut a = Vec::with_capacity(half);
        let mut b = Vec::with_capacity(half);
        for plasmid in self.plasmids {
            if rng.gen_bool(0.5) {
                a.push(plasmid);
            } else {
                b.push(plasmid);
            }
        }
        (
            Bacterium::new(ids.cell(), generation, a, self.params),
            Bacterium::new(ids.cell(), generation, b, self.params),
        )
    }
}
