//! Population — the cells of the current generation and its lineage history
//!
//! A generation step replicates every retained cell to capacity and divides
//! it; the daughters replace the current generation and are then diluted, so
//! that only the retained daughters become the next mothers. At a day boundary
//! the population is reduced to one survivor (the serial transfer bottleneck).

use super::record::{CellSummary, GenerationSummary};
use crate::cell::{Bacterium, CellParams, IdAllocator};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How cells are picked when the population is reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivorPolicy {
    /// Keep cells in population order, always following the first lineage
    #[default]
    FirstLineage,
    /// Draw survivors uniformly without replacement
    Uniform,
}

impl SurvivorPolicy {
    /// Pick `keep` of `len` positions. Returned positions are sorted so the
    /// kept cells stay in population order.
    pub fn select<R: Rng + ?Sized>(&self, len: usize, keep: usize, rng: &mut R) -> Vec<usize> {
        if keep >= len {
            return (0..len).collect();
        }
        match self {
            SurvivorPolicy::FirstLineage => (0..keep).collect(),
            SurvivorPolicy::Uniform => {
                let mut picked = index::sample(rng, len, keep).into_vec();
                picked.sort_unstable();
                picked
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    pub day: u32,
    pub generation: u64,
    bacteria: Vec<Bacterium>,
    /// Sorted positions in `bacteria` that survived dilution
    retained: Vec<usize>,
    ids: IdAllocator,
    /// Cells kept after each division; the rest are diluted away
    max_cells: usize,
    survivor: SurvivorPolicy,
    /// Set once a mutant-carrying cell split its mutant copies unequally
    heteroplasmic_split_seen: bool,
    mutation_events: u64,
}

impl Population {
    /// Start day 0 from a single founder filled with wild-type copies
    pub fn founded<R: Rng + ?Sized>(
        params: CellParams,
        max_cells: usize,
        survivor: SurvivorPolicy,
        rng: &mut R,
    ) -> Self {
        let mut ids = IdAllocator::new();
        let founder = Bacterium::founder(params, &mut ids, rng);
        Self {
            day: 0,
            generation: 0,
            bacteria: vec![founder],
            retained: vec![0],
            ids,
            max_cells: max_cells.max(1),
            survivor,
            heteroplasmic_split_seen: false,
            mutation_events: 0,
        }
    }

    pub fn bacteria(&self) -> &[Bacterium] {
        &self.bacteria
    }

    pub fn len(&self) -> usize {
        self.bacteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bacteria.is_empty()
    }

    /// Cells of the current generation that survived dilution
    pub fn retained(&self) -> impl Iterator<Item = &Bacterium> + '_ {
        self.retained.iter().map(|&i| &self.bacteria[i])
    }

    /// Run one generation and dilute the daughters to `max_cells`
    pub fn grow<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GenerationSummary {
        self.grow_keeping(self.max_cells, rng)
    }

    /// Replicate and divide every retained cell, then keep at most `keep`
    /// daughters as the mothers of the next generation. All daughters stay in
    /// the generation (and in the summary) until the next step.
    pub fn grow_keeping<R: Rng + ?Sized>(&mut self, keep: usize, rng: &mut R) -> GenerationSummary {
        let mothers = std::mem::take(&mut self.bacteria);
        let mut retained = std::mem::take(&mut self.retained).into_iter().peekable();

        let mut next = Vec::with_capacity(retained.len() * 2);
        let mut parents = Vec::with_capacity(retained.len() * 2);
        for (position, mut mother) in mothers.into_iter().enumerate() {
            if retained.next_if_eq(&position).is_none() {
                continue;
            }
            let parent_mutated = mother.mutated_count();
            self.mutation_events += mother.replicate_to_capacity(rng, &mut self.ids) as u64;
            let (a, b) = mother.segregate(rng, &mut self.ids);

            let (ma, mb) = (a.mutated_count(), b.mutated_count());
            if ma + mb > 0 && ma != mb {
                self.heteroplasmic_split_seen = true;
            }
            next.extend([a, b]);
            parents.extend([parent_mutated, parent_mutated]);
        }

        let kept = self.survivor.select(next.len(), keep.max(1), rng);
        let cells = next
            .iter()
            .zip(parents)
            .enumerate()
            .map(|(i, (daughter, parent_mutated))| CellSummary {
                plasmids: daughter.plasmid_count(),
                mutated: daughter.mutated_count(),
                parent_mutated,
                retained: kept.binary_search(&i).is_ok(),
            })
            .collect();

        self.bacteria = next;
        self.retained = kept;
        self.generation += 1;
        GenerationSummary { cells }
    }

    /// Any cell of the current generation lost every plasmid copy
    pub fn is_segregant(&self) -> bool {
        self.bacteria.iter().any(Bacterium::is_segregant)
    }

    /// No cell carries a mutated copy and the lineage never split mutants
    /// unequally between daughters
    pub fn is_wild_type(&self) -> bool {
        !self.heteroplasmic_split_seen && self.bacteria.iter().all(|b| b.mutated_count() == 0)
    }

    pub fn heteroplasmic_split_seen(&self) -> bool {
        self.heteroplasmic_split_seen
    }

    /// De-novo mutations introduced since the founder, across all cells grown
    pub fn mutation_events(&self) -> u64 {
        self.mutation_events
    }

    /// Day-boundary bottleneck: keep a single retained cell with its plasmid
    /// pool untouched and start the next day from it.
    pub fn transfer<R: Rng + ?Sized>(mut self, rng: &mut R) -> Population {
        let picked = self.survivor.select(self.retained.len(), 1, rng);
        let survivor: Vec<Bacterium> = picked
            .first()
            .map(|&i| self.retained[i])
            .map(|position| self.bacteria.swap_remove(position))
            .into_iter()
            .collect();
        Population {
            day: self.day + 1,
            retained: (0..survivor.len()).collect(),
            bacteria: survivor,
            ..self
        }
    }

    pub fn mutated_copies(&self) -> usize {
        self.bacteria.iter().map(Bacterium::mutated_count).sum()
    }
}
