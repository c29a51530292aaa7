// ============================================================
// Layer 3 - LabeledImage Domain Type
// ============================================================
// One CIFAR sample exactly as it is stored on disk:
//   3 channels × 32 rows × 32 columns of u8, channel-major (CHW),
//   plus the integer class label.
//
// Pixels stay as u8 until the batcher turns them into floats,
// which keeps a 50k-image training set at ~150 MB instead of ~600 MB.

use serde::{Deserialize, Serialize};

pub const CHANNELS: usize = 3;
pub const HEIGHT:   usize = 32;
pub const WIDTH:    usize = 32;

/// Bytes of pixel data per image (3 * 32 * 32).
pub const PIXELS_PER_IMAGE: usize = CHANNELS * HEIGHT * WIDTH;

/// A decoded image and its class index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledImage {
    /// CHW pixel data, always `PIXELS_PER_IMAGE` long
    pub pixels: Vec<u8>,

    /// Class index in `0..num_classes`
    pub label: usize,
}

impl LabeledImage {
    pub fn new(pixels: Vec<u8>, label: usize) -> Self {
        debug_assert_eq!(pixels.len(), PIXELS_PER_IMAGE);
        Self { pixels, label }
    }

    /// Pixel value at channel `c`, row `y`, column `x`.
    pub fn at(&self, c: usize, y: usize, x: usize) -> u8 {
        self.pixels[c * HEIGHT * WIDTH + y * WIDTH + x]
    }
}
