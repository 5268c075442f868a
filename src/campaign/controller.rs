//! Campaign controller — collect informative replicates for one copy number
//!
//! Replicates are produced in index order. A replicate already committed to
//! the store is read back instead of simulated. Otherwise the transfer
//! protocol is retried with fresh draws until it succeeds or the campaign's
//! attempt budget is spent. Fresh and cached replicates both go through
//! `ResultStore::load`, so a re-run yields exactly the records of the first.

use super::config::CampaignConfig;
use crate::analysis::ReplicateStats;
use crate::experiment::{DiscardReason, ReplicateOutcome, TransferProtocol};
use crate::storage::{Dataset, ReplicateKey, ResultStore, StoreError};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("invalid configuration: {0}")]
    Config(#[from] super::config::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error while simulating: {0}")]
    Io(#[from] std::io::Error),

    #[error("campaign worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Complete,
    /// The attempt budget ran out first
    Incomplete { obtained: u32, requested: u32 },
}

/// What one campaign did and produced
#[derive(Debug, Clone)]
pub struct CampaignReport {
    pub max_plasmids: usize,
    pub status: CampaignStatus,
    pub dataset: Dataset,
    /// Protocol runs performed by this campaign (cached replicates excluded)
    pub simulations: u32,
    pub cache_hits: u32,
    pub discarded_segregant: u32,
    pub discarded_wild_type: u32,
}

impl CampaignReport {
    pub fn summary(&self) -> String {
        let status = match self.status {
            CampaignStatus::Complete => "complete".to_string(),
            CampaignStatus::Incomplete { obtained, requested } => {
                format!("INCOMPLETE {}/{}", obtained, requested)
            }
        };
        format!(
            "pcn={} | {} | {} simulated, {} cached | discarded: {} segregant, {} wild-type",
            self.max_plasmids,
            status,
            self.simulations,
            self.cache_hits,
            self.discarded_segregant,
            self.discarded_wild_type,
        )
    }
}

/// Seed for one attempt, derived from the base seed and the replicate slot
pub fn attempt_seed(base_seed: u64, key: &ReplicateKey, attempt: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(key.to_string().as_bytes());
    hasher.update(attempt.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[derive(Debug, Clone, Copy)]
pub struct CampaignController {
    pub protocol: TransferProtocol,
    pub num_replicates: u32,
    pub max_attempts: u32,
    pub base_seed: u64,
}

impl CampaignController {
    pub fn new(config: &CampaignConfig, max_plasmids: usize, base_seed: u64) -> Self {
        Self {
            protocol: config.simulation.protocol(max_plasmids),
            num_replicates: config.num_replicates,
            max_attempts: config.max_attempts,
            base_seed,
        }
    }

    /// Produce the replicates, persist the dataset and report what happened
    pub fn run<S: ResultStore + ?Sized>(&self, store: &S) -> Result<CampaignReport, CampaignError> {
        let pcn = self.protocol.max_plasmids;
        let mut records = Vec::with_capacity(self.num_replicates as usize);
        let mut simulations = 0u32;
        let mut cache_hits = 0u32;
        let mut discarded_segregant = 0u32;
        let mut discarded_wild_type = 0u32;

        'replicates: for replicate_index in 0..self.num_replicates {
            let key = ReplicateKey::new(&self.protocol, replicate_index);

            if store.exists(&key)?.is_some() {
                cache_hits += 1;
            } else {
                let mut attempts = 0u32;
                loop {
                    if simulations >= self.max_attempts {
                        break 'replicates;
                    }
                    attempts += 1;
                    simulations += 1;

                    let mut rng = StdRng::seed_from_u64(attempt_seed(self.base_seed, &key, attempts));
                    let mut staged = store.stage(&key)?;
                    let outcome = match self.protocol.run(&mut rng, &mut staged) {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            // Keep the I/O error; a failing discard would only mask it
                            let _ = store.discard(staged);
                            return Err(e.into());
                        }
                    };

                    match outcome {
                        ReplicateOutcome::Success(_) => {
                            store.save(&key, staged, attempts)?;
                            break;
                        }
                        ReplicateOutcome::Discarded(reason) => {
                            store.discard(staged)?;
                            match reason {
                                DiscardReason::Segregant { .. } => discarded_segregant += 1,
                                DiscardReason::WildType => discarded_wild_type += 1,
                            }
                            debug!("{} attempt {} discarded: {}", key, attempts, reason);
                        }
                    }
                }
            }

            let stored = store.load(&key)?;
            let record = ReplicateStats::from_table(
                &stored.table,
                replicate_index,
                stored.attempts,
                stored.key,
                stored.sha256,
            );
            info!(
                "pcn={} replicate {}/{} after {} attempts ({} new mutations)",
                pcn,
                replicate_index + 1,
                self.num_replicates,
                record.attempts,
                record.series.total_new(),
            );
            records.push(record);
        }

        let obtained = records.len() as u32;
        let status = if obtained >= self.num_replicates {
            CampaignStatus::Complete
        } else {
            warn!(
                "pcn={}: attempt budget of {} exhausted with {}/{} informative replicates",
                pcn, self.max_attempts, obtained, self.num_replicates
            );
            CampaignStatus::Incomplete {
                obtained,
                requested: self.num_replicates,
            }
        };

        let dataset = Dataset::new(self.protocol, self.num_replicates, records);
        store.save_dataset(&dataset)?;

        Ok(CampaignReport {
            max_plasmids: pcn,
            status,
            dataset,
            simulations,
            cache_hits,
            discarded_segregant,
            discarded_wild_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::config::SimulationSettings;
    use crate::experiment::SurvivorPolicy;
    use crate::storage::{FsResultStore, StagedLog, StoredReplicate};
    use std::io::{self, Write};
    use std::path::PathBuf;

    fn test_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pcn-campaign-test-{}", uuid::Uuid::new_v4()))
    }

    fn config(rate: f64, replicates: u32, max_attempts: u32) -> CampaignConfig {
        CampaignConfig {
            simulation: SimulationSettings {
                num_days: 3,
                generations_per_day: 6,
                mutation_rate: rate,
                ..SimulationSettings::default()
            },
            plasmid_copy_numbers: vec![20],
            num_replicates: replicates,
            max_attempts,
            seed: Some(11),
            output_dir: PathBuf::new(),
        }
    }

    /// Filesystem store whose staged logs fail once `budget` bytes are written
    struct FullDiskStore {
        inner: FsResultStore,
        budget: usize,
    }

    struct FullDiskLog {
        inner: StagedLog,
        remaining: usize,
    }

    impl Write for FullDiskLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() > self.remaining {
                return Err(io::Error::other("no space left on device"));
            }
            self.remaining -= buf.len();
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl ResultStore for FullDiskStore {
        type Staged = FullDiskLog;

        fn exists(&self, key: &ReplicateKey) -> Result<Option<u32>, StoreError> {
            self.inner.exists(key)
        }

        fn load(&self, key: &ReplicateKey) -> Result<StoredReplicate, StoreError> {
            self.inner.load(key)
        }

        fn stage(&self, key: &ReplicateKey) -> Result<FullDiskLog, StoreError> {
            Ok(FullDiskLog {
                inner: self.inner.stage(key)?,
                remaining: self.budget,
            })
        }

        fn save(&self, key: &ReplicateKey, staged: FullDiskLog, attempts: u32) -> Result<(), StoreError> {
            self.inner.save(key, staged.inner, attempts)
        }

        fn discard(&self, staged: FullDiskLog) -> Result<(), StoreError> {
            self.inner.discard(staged.inner)
        }

        fn save_dataset(&self, dataset: &Dataset) -> Result<(), StoreError> {
            self.inner.save_dataset(dataset)
        }

        fn load_dataset(&self, protocol: &TransferProtocol) -> Result<Option<Dataset>, StoreError> {
            self.inner.load_dataset(protocol)
        }
    }

    #[test]
    fn test_log_write_failure_propagates_without_artifact() {
        let dir = test_dir();
        let store = FullDiskStore {
            inner: FsResultStore::open(&dir).unwrap(),
            budget: 64,
        };
        let controller = CampaignController::new(&config(0.02, 2, 500), 20, 11);

        let err = controller.run(&store).unwrap_err();
        assert!(matches!(err, CampaignError::Io(_)), "{err}");
        assert_eq!(store.exists(&ReplicateKey::new(&controller.protocol, 0)).unwrap(), None);
        // The failed attempt's staged log is gone and no dataset was written
        assert_eq!(std::fs::read_dir(dir.join("logs")).unwrap().count(), 0);
        assert!(store.load_dataset(&controller.protocol).unwrap().is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_single_copy_zero_rate_exhausts_budget() {
        let dir = test_dir();
        let store = FsResultStore::open(&dir).unwrap();
        let controller = CampaignController::new(&config(0.0, 3, 25), 1, 11);
        let report = controller.run(&store).unwrap();

        assert_eq!(
            report.status,
            CampaignStatus::Incomplete { obtained: 0, requested: 3 }
        );
        assert_eq!(report.simulations, 25);
        assert_eq!(report.discarded_segregant + report.discarded_wild_type, 25);
        assert!(report.dataset.records.is_empty());
        assert!(!report.dataset.complete);
        // Nothing committed, nothing staged left behind
        assert_eq!(std::fs::read_dir(dir.join("logs")).unwrap().count(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_zero_rate_is_always_wild_type() {
        let dir = test_dir();
        let store = FsResultStore::open(&dir).unwrap();
        let controller = CampaignController::new(&config(0.0, 2, 10), 64, 11);
        let report = controller.run(&store).unwrap();
        assert_eq!(report.discarded_wild_type, 10);
        assert!(matches!(report.status, CampaignStatus::Incomplete { obtained: 0, .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_collects_requested_replicates() {
        let dir = test_dir();
        let store = FsResultStore::open(&dir).unwrap();
        let controller = CampaignController::new(&config(0.02, 4, 500), 20, 11);
        let report = controller.run(&store).unwrap();

        assert_eq!(report.status, CampaignStatus::Complete);
        assert_eq!(report.dataset.records.len(), 4);
        assert_eq!(report.cache_hits, 0);
        let spent: u32 = report.dataset.records.iter().map(|r| r.attempts).sum();
        assert_eq!(spent, report.simulations);
        for (i, record) in report.dataset.records.iter().enumerate() {
            assert_eq!(record.replicate_index, i as u32);
            assert!(record.attempts >= 1);
            assert_eq!(record.series.generations(), 18);
        }
        assert!(store.load_dataset(&controller.protocol).unwrap().is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rerun_hits_cache_only() {
        let dir = test_dir();
        let store = FsResultStore::open(&dir).unwrap();
        let controller = CampaignController::new(&config(0.02, 3, 500), 20, 11);
        let first = controller.run(&store).unwrap();

        // A different seed would change every draw, so any simulation would show
        let rerun = CampaignController { base_seed: 12345, ..controller };
        let second = rerun.run(&store).unwrap();

        assert_eq!(second.simulations, 0);
        assert_eq!(second.cache_hits, 3);
        assert_eq!(second.dataset.records, first.dataset.records);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_growth_settings_are_cached_separately() {
        let dir = test_dir();
        let store = FsResultStore::open(&dir).unwrap();
        let base = config(0.02, 3, 500);
        let first = CampaignController::new(&base, 20, 11).run(&store).unwrap();
        assert_eq!(first.cache_hits, 0);

        let mut uniform = base.clone();
        uniform.simulation.survivor = SurvivorPolicy::Uniform;
        let second = CampaignController::new(&uniform, 20, 11).run(&store).unwrap();
        assert_eq!(second.cache_hits, 0);
        assert!(second.simulations >= 3);

        let mut wide = uniform.clone();
        wide.simulation.max_cells = 8;
        let third = CampaignController::new(&wide, 20, 11).run(&store).unwrap();
        assert_eq!(third.cache_hits, 0);
        // More than one lineage is grown, so later generations hold more than two cells
        let table = store.load(&ReplicateKey::new(&third.dataset.protocol, 0)).unwrap().table;
        assert!(table.records.iter().any(|r| r.summary.cells.len() > 2));

        // Each setting still resumes from its own cache
        let again = CampaignController::new(&uniform, 20, 11).run(&store).unwrap();
        assert_eq!(again.simulations, 0);
        assert_eq!(again.dataset.records, second.dataset.records);

        let datasets = std::fs::read_dir(dir.join("datasets")).unwrap().count();
        assert_eq!(datasets, 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_same_seed_same_logs() {
        let run = || {
            let dir = test_dir();
            let store = FsResultStore::open(&dir).unwrap();
            let controller = CampaignController::new(&config(0.02, 2, 500), 20, 77);
            let report = controller.run(&store).unwrap();
            let _ = std::fs::remove_dir_all(&dir);
            report.dataset.records
        };
        let a = run();
        let b = run();
        assert_eq!(a, b);
        assert_ne!(a[0].log_sha256, a[1].log_sha256);
    }

    #[test]
    fn test_attempt_seed_varies() {
        let config = config(0.1, 1, 1);
        let protocol = config.simulation.protocol(10);
        let k0 = ReplicateKey::new(&protocol, 0);
        let k1 = ReplicateKey::new(&protocol, 1);
        assert_eq!(attempt_seed(1, &k0, 1), attempt_seed(1, &k0, 1));
        assert_ne!(attempt_seed(1, &k0, 1), attempt_seed(1, &k0, 2));
        assert_ne!(attempt_seed(1, &k0, 1), attempt_seed(1, &k1, 1));
        assert_ne!(attempt_seed(1, &k0, 1), attempt_seed(2, &k0, 1));
    }
}
