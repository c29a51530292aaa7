use anyhow::Result;

use crate::data::{dataset::CifarDataset, loader::CifarLoader};
use crate::domain::{
    architecture::Architecture,
    task::Task,
    traits::{ImageSource, Split},
};
use crate::infra::checkpoint::{BestRecord, CheckpointManager};
use crate::ml::evaluator::evaluate_checkpoint;

/// Result of re-scoring a saved run.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub run:      String,
    pub test_acc: f64,
    /// What the trainer recorded when it saved the checkpoint
    pub recorded: BestRecord,
}

/// Reloads the best checkpoint of `<task>_<architecture>` and scores it.
pub struct EvaluateUseCase {
    checkpoint_dir: String,
    data_dir:       Option<String>,
    task:           Task,
    architecture:   Architecture,
}

impl EvaluateUseCase {
    /// `data_dir` overrides the directory stored in the run config.
    pub fn new(
        checkpoint_dir: String,
        data_dir:       Option<String>,
        task:           Task,
        architecture:   Architecture,
    ) -> Self {
        Self { checkpoint_dir, data_dir, task, architecture }
    }

    pub fn execute(&self) -> Result<EvaluationReport> {
        let run        = format!("{}_{}", self.task, self.architecture);
        let checkpoint = CheckpointManager::new(&self.checkpoint_dir, &run)?;
        let cfg        = checkpoint.load_config()?;
        cfg.validate()?;
        let recorded   = checkpoint.load_best_record()?;

        let data_dir = self.data_dir.clone().unwrap_or_else(|| cfg.data_dir.clone());
        let test     = CifarLoader::new(data_dir, cfg.task).load_split(Split::Test)?;

        let test_acc = evaluate_checkpoint(&cfg, &checkpoint, CifarDataset::new(test))?;
        Ok(EvaluationReport { run, test_acc, recorded })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;

    #[test]
    fn test_saved_config_with_zero_workers_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig { num_workers: 0, ..TrainConfig::default() };
        let ckpt = CheckpointManager::new(dir.path(), cfg.run_name()).unwrap();
        ckpt.save_config(&cfg).unwrap();
        std::fs::write(
            dir.path().join(format!("{}_best.json", cfg.run_name())),
            r#"{"epoch": 1, "test_acc": 10.0}"#,
        )
        .unwrap();

        let use_case = EvaluateUseCase::new(
            dir.path().display().to_string(),
            Some(dir.path().display().to_string()),
            cfg.task,
            cfg.architecture,
        );
        let err = use_case.execute().unwrap_err();
        assert!(format!("{err:#}").contains("num_workers"));
    }
}
