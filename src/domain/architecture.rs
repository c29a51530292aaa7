// ============================================================
// Layer 3 - Architecture
// ============================================================
// The four CIFAR ResNets this crate can build.
//
// All of them share the same three-stage layout (16, 32, 64
// planes). Depth is controlled by how many basic blocks each
// stage contains:
//
//   depth = 6 * n + 2
//   resnet110 → n = 18
//   resnet164 → n = 27
//
// The `_ic` variants swap the post-activation BasicBlock for a
// pre-activation block that puts an IC layer (BatchNorm + Dropout)
// in front of every convolution.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which network to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    #[value(name = "resnet110")]
    Resnet110,
    #[value(name = "resnet164")]
    Resnet164,
    #[value(name = "resnet110_ic")]
    Resnet110Ic,
    #[value(name = "resnet164_ic")]
    Resnet164Ic,
}

impl Architecture {
    /// Model name as it appears in checkpoint files.
    pub fn name(&self) -> &'static str {
        match self {
            Architecture::Resnet110   => "resnet110",
            Architecture::Resnet164   => "resnet164",
            Architecture::Resnet110Ic => "resnet110_ic",
            Architecture::Resnet164Ic => "resnet164_ic",
        }
    }

    /// Number of basic blocks in each of the three stages.
    pub fn blocks_per_stage(&self) -> [usize; 3] {
        match self {
            Architecture::Resnet110 | Architecture::Resnet110Ic => [18, 18, 18],
            Architecture::Resnet164 | Architecture::Resnet164Ic => [27, 27, 27],
        }
    }

    pub fn uses_ic_layers(&self) -> bool {
        matches!(self, Architecture::Resnet110Ic | Architecture::Resnet164Ic)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a block's residual path is matched to its output when the
/// stride or channel count changes.
///
///   A - subsample every second pixel, zero-pad the channel axis
///       by planes/4 on both sides (no parameters)
///   B - 1x1 strided convolution followed by BatchNorm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ShortcutKind {
    #[default]
    A,
    B,
}
