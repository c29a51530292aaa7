// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Runs a full training pipeline:
//
//   Step 1: Load the train and test splits   (Layer 4 - data)
//   Step 2: Wrap them as Burn datasets       (Layer 4 - data)
//   Step 3: Save the run config              (Layer 6 - infra)
//   Step 4: Run the Learner                  (Layer 5 - ml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::CifarDataset, loader::CifarLoader};
use crate::domain::{
    architecture::{Architecture, ShortcutKind},
    task::Task,
    traits::{ImageSource, Split},
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::trainer::{run_training, TrainSummary};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for one run. Saved next to the checkpoint as JSON
// so `evaluate` can rebuild the same network later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub task:           Task,
    pub architecture:   Architecture,
    pub shortcut:       ShortcutKind,
    pub data_dir:       String,
    pub checkpoint_dir: String,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub momentum:       f64,
    pub weight_decay:   f64,
    pub milestones:     Vec<usize>,
    pub gamma:          f64,
    pub ic_dropout:     f64,
    pub seed:           u64,
    pub num_workers:    usize,
    pub log_interval:   usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            task:           Task::Cifar10,
            architecture:   Architecture::Resnet110,
            shortcut:       ShortcutKind::A,
            data_dir:       "data".to_string(),
            checkpoint_dir: "res".to_string(),
            epochs:         200,
            batch_size:     64,
            lr:             0.1,
            momentum:       0.9,
            weight_decay:   1e-4,
            milestones:     vec![100, 150],
            gamma:          0.1,
            ic_dropout:     0.5,
            seed:           42,
            num_workers:    1,
            log_interval:   100,
        }
    }
}

impl TrainConfig {
    /// "<task>_<model>", the prefix of every file a run writes.
    pub fn run_name(&self) -> String {
        format!("{}_{}", self.task, self.architecture)
    }

    /// Reject settings the trainer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        if !(0.0..1.0).contains(&self.ic_dropout) {
            bail!("IC dropout must be in [0, 1), got {}", self.ic_dropout);
        }
        if self.num_workers == 0 {
            bail!("num_workers must be at least 1");
        }
        if self.lr <= 0.0 {
            bail!("learning rate must be positive, got {}", self.lr);
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load both splits ──────────────────────────────────────────
        let loader = CifarLoader::new(&cfg.data_dir, cfg.task);
        let train  = loader.load_split(Split::Train)?;
        let test   = loader.load_split(Split::Test)?;
        if train.is_empty() || test.is_empty() {
            bail!("'{}' contains no {} images", cfg.data_dir, cfg.task);
        }

        // ── Step 2: Burn datasets ─────────────────────────────────────────────
        let train_dataset = CifarDataset::new(train);
        let test_dataset  = CifarDataset::new(test);

        // ── Step 3: Persist config before the first epoch ─────────────────────
        let run        = cfg.run_name();
        let checkpoint = CheckpointManager::new(&cfg.checkpoint_dir, &run)?;
        checkpoint.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir, &run)?;
        tracing::info!("Writing metrics to '{}'", metrics.csv_path().display());

        // ── Step 4: Train ─────────────────────────────────────────────────────
        tracing::info!(
            "Training {} on {} for {} epochs ({} train / {} test images)",
            cfg.architecture,
            cfg.task,
            cfg.epochs,
            train_dataset.image_count(),
            test_dataset.image_count(),
        );
        run_training(cfg, train_dataset, test_dataset, checkpoint, metrics)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_name() {
        let cfg = TrainConfig {
            task:         Task::Cifar100,
            architecture: Architecture::Resnet164Ic,
            ..TrainConfig::default()
        };
        assert_eq!(cfg.run_name(), "cifar100_resnet164_ic");
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(TrainConfig::default().validate().is_ok());
        assert!(TrainConfig { batch_size: 0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { ic_dropout: 1.0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { lr: 0.0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { num_workers: 0, ..TrainConfig::default() }.validate().is_err());
    }

    #[test]
    fn test_missing_data_dir_fails_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_dir:       dir.path().join("nope").display().to_string(),
            checkpoint_dir: dir.path().join("ckpt").display().to_string(),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}
