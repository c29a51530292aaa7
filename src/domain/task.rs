// ============================================================
// Layer 3 - Task
// ============================================================
// The classification task decides two things:
//   - which CIFAR archive the loader reads
//   - how many output logits the network produces
//
// Only CIFAR-10 and CIFAR-100 exist. Anything else is rejected
// by clap before a use case ever runs.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The dataset a model is trained and evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Cifar10,
    Cifar100,
}

impl Task {
    /// Number of classes, which is also the width of the final linear layer.
    pub fn num_classes(&self) -> usize {
        match self {
            Task::Cifar10  => 10,
            Task::Cifar100 => 100,
        }
    }

    /// Short name used in checkpoint file names, e.g. `cifar10`.
    pub fn name(&self) -> &'static str {
        match self {
            Task::Cifar10  => "cifar10",
            Task::Cifar100 => "cifar100",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_classes() {
        assert_eq!(Task::Cifar10.num_classes(), 10);
        assert_eq!(Task::Cifar100.num_classes(), 100);
    }

    #[test]
    fn test_parse_from_cli_string() {
        assert_eq!(Task::from_str("cifar100", true).unwrap(), Task::Cifar100);
        // Unknown tasks are rejected rather than silently defaulted
        assert!(Task::from_str("imagenet", true).is_err());
    }

    #[test]
    fn test_serde_uses_short_name() {
        let json = serde_json::to_string(&Task::Cifar10).unwrap();
        assert_eq!(json, "\"cifar10\"");
    }
}
