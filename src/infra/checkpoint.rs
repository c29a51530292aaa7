// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores the BEST model of a training run.
//
// Every run is identified by "<task>_<model>", e.g.
// "cifar10_resnet110_ic". Files written for a run:
//
//   checkpoints/
//     cifar10_resnet110_ic_best.mpk       ← weights of the best epoch
//     cifar10_resnet110_ic_best.json      ← which epoch, what accuracy
//     cifar10_resnet110_ic_config.json    ← TrainConfig of the run
//
// The weights are only rewritten when test accuracy strictly
// improves, so the .mpk file always matches the .json next
// to it.
//
// Burn's CompactRecorder stores half-precision MessagePack, and
// loading fails if the architecture does not match.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::CompactRecorder,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;

/// What the best checkpoint of a run scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRecord {
    /// 1-based epoch that produced the checkpoint
    pub epoch:    usize,
    /// Test Prec@1 in percent
    pub test_acc: f64,
}

pub struct CheckpointManager {
    dir: PathBuf,
    run: String,
}

impl CheckpointManager {
    /// Create a manager for one run. Creates the directory if needed.
    pub fn new(dir: impl Into<PathBuf>, run: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir, run: run.into() })
    }

    /// Path of the best weights, without the extension the recorder adds.
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(format!("{}_best", self.run))
    }

    fn best_path(&self) -> PathBuf {
        self.dir.join(format!("{}_best.json", self.run))
    }

    fn config_path(&self) -> PathBuf {
        self.dir.join(format!("{}_config.json", self.run))
    }

    /// Overwrite the best checkpoint with `model`.
    pub fn save_best<B: Backend, M: Module<B>>(&self, model: &M, best: &BestRecord) -> Result<()> {
        let path = self.model_path();
        model
            .clone()
            .save_file(path.clone(), &CompactRecorder::new())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        fs::write(self.best_path(), serde_json::to_string_pretty(best)?)
            .with_context(|| format!("Failed to write '{}'", self.best_path().display()))?;

        tracing::debug!("Saved best checkpoint: epoch {} ({:.3}%)", best.epoch, best.test_acc);
        Ok(())
    }

    /// Load the best weights into a freshly built `model`.
    pub fn load_best<B: Backend, M: Module<B>>(&self, model: M, device: &B::Device) -> Result<M> {
        let path = self.model_path();
        let model = model
            .load_file(path.clone(), &CompactRecorder::new(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?", path.display())
            })?;
        Ok(model)
    }

    pub fn load_best_record(&self) -> Result<BestRecord> {
        let path = self.best_path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'. Have you run 'train' first?", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the training configuration so `evaluate` can rebuild the model.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.config_path();
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.config_path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'evaluate'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::nn::{Linear, LinearConfig};

    type TestBackend = NdArray;

    #[test]
    fn test_config_survives_disk() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path(), "cifar10_resnet110").unwrap();
        let cfg  = TrainConfig { epochs: 3, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        assert_eq!(ckpt.load_config().unwrap().epochs, 3);
    }

    #[test]
    fn test_best_weights_reload() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path(), "run").unwrap();
        let device = Default::default();

        let saved: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        let best = BestRecord { epoch: 7, test_acc: 91.25 };
        ckpt.save_best(&saved, &best).unwrap();

        let fresh: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        let loaded = ckpt.load_best(fresh, &device).unwrap();
        loaded
            .weight
            .val()
            .into_data()
            .assert_approx_eq(&saved.weight.val().into_data(), 2);
        assert_eq!(ckpt.load_best_record().unwrap(), best);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path(), "never_trained").unwrap();
        let device = Default::default();
        let model: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        assert!(ckpt.load_best(model, &device).is_err());
        assert!(ckpt.load_config().is_err());
    }
}
