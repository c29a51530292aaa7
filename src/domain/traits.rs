// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer only talks to image data through
// `ImageSource`, so the CIFAR binary reader can be swapped for
// another format (or an in-memory fixture in tests) without
// touching the training workflow.

use anyhow::Result;
use crate::domain::image::LabeledImage;

/// Which half of a dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can produce labelled images for a split.
///
/// Implementations:
///   - CifarLoader → reads the official CIFAR-10/100 binary archives
pub trait ImageSource {
    fn load_split(&self, split: Split) -> Result<Vec<LabeledImage>>;
}
