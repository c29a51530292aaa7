// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Appends one CSV row per epoch so learning curves can be
// plotted after (or during) a run.
//
// Output file: checkpoints/<task>_<model>_metrics.csv
//
//   epoch,lr,train_loss,train_acc,test_acc
//   1,0.100000,1.912345,29.874000,38.120000
//   2,0.100000,1.501234,44.560000,49.870000
//
// Accuracies are Prec@1 in percent. A re-run of the same task
// and model appends to the existing file without a second header.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

/// One row of metrics for a single epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch:      usize,
    /// Learning rate used during the epoch
    pub lr:         f64,
    pub train_loss: f64,
    pub train_acc:  f64,
    pub test_acc:   f64,
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Open (or create) `<dir>/<run>_metrics.csv`.
    pub fn new(dir: impl Into<PathBuf>, run: &str) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join(format!("{run}_metrics.csv"));
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "epoch,lr,train_loss,train_acc,test_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch, m.lr, m.train_loss, m.train_acc, m.test_acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn row(epoch: usize, test_acc: f64) -> EpochMetrics {
        EpochMetrics { epoch, lr: 0.1, train_loss: 1.5, train_acc: 40.0, test_acc }
    }

    #[test]
    fn test_rows_append_under_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path(), "cifar10_resnet110").unwrap();
        logger.log(&row(1, 30.0)).unwrap();

        // Reopening must not write a second header
        let logger = MetricsLogger::new(dir.path(), "cifar10_resnet110").unwrap();
        logger.log(&row(2, 35.5)).unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,lr,train_loss,train_acc,test_acc");
        assert_eq!(lines[2], "2,0.100000,1.500000,40.000000,35.500000");
    }
}
