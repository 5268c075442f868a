//! Parallel sweep over copy numbers
//!
//! Campaigns share nothing but the store, so each one runs on its own
//! blocking task.

use super::config::CampaignConfig;
use super::controller::{CampaignController, CampaignError, CampaignReport};
use crate::storage::{FsResultStore, ResultStore};
use log::info;
use std::sync::Arc;

/// Run every campaign of `config` against a filesystem store under
/// `config.output_dir`
pub async fn run_sweep(config: &CampaignConfig) -> Result<Vec<CampaignReport>, CampaignError> {
    config.validate()?;
    let store = Arc::new(FsResultStore::open(&config.output_dir)?);
    run_sweep_with(config, store).await
}

/// Run every campaign of `config` against `store`, one blocking task per copy
/// number. Reports come back in the order of `plasmid_copy_numbers`.
pub async fn run_sweep_with<S>(
    config: &CampaignConfig,
    store: Arc<S>,
) -> Result<Vec<CampaignReport>, CampaignError>
where
    S: ResultStore + 'static,
{
    config.validate()?;
    let base_seed = config.seed.unwrap_or_else(rand::random);
    info!(
        "Sweeping {} copy numbers, {} replicates each, base seed {}",
        config.plasmid_copy_numbers.len(),
        config.num_replicates,
        base_seed
    );

    let tasks = config.plasmid_copy_numbers.iter().map(|&pcn| {
        let controller = CampaignController::new(config, pcn, base_seed);
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || controller.run(store.as_ref()))
    });

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| {
            joined
                .map_err(|e| CampaignError::Worker(e.to_string()))
                .and_then(|report| report)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::{CampaignStatus, SimulationSettings};

    #[tokio::test]
    async fn test_sweep_runs_every_copy_number() {
        let dir = std::env::temp_dir().join(format!("pcn-sweep-test-{}", uuid::Uuid::new_v4()));
        let config = CampaignConfig {
            simulation: SimulationSettings {
                num_days: 2,
                generations_per_day: 8,
                mutation_rate: 0.05,
                ..SimulationSettings::default()
            },
            plasmid_copy_numbers: vec![1, 16, 32],
            num_replicates: 2,
            max_attempts: 40,
            seed: Some(3),
            output_dir: dir.clone(),
        };

        let reports = run_sweep(&config).await.unwrap();
        let pcns: Vec<usize> = reports.iter().map(|r| r.max_plasmids).collect();
        assert_eq!(pcns, vec![1, 16, 32]);
        assert!(matches!(reports[0].status, CampaignStatus::Incomplete { obtained: 0, .. }));
        assert_eq!(reports[1].status, CampaignStatus::Complete);
        assert_eq!(reports[2].status, CampaignStatus::Complete);
        assert_eq!(std::fs::read_dir(dir.join("datasets")).unwrap().count(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_sweep_rejects_invalid_config() {
        let config = CampaignConfig {
            plasmid_copy_numbers: Vec::new(),
            ..CampaignConfig::default()
        };
        assert!(matches!(run_sweep(&config).await, Err(CampaignError::Config(_))));
    }
}
