// ============================================================
// Layer 4 - Image Transforms
// ============================================================
// Training-time augmentation and the normalisation shared by
// both splits.
//
// Training pipeline (applied per sample, in this order):
//   1. Random horizontal flip, probability 0.5
//   2. Random 32x32 crop from the image zero-padded by 4 pixels
//   3. Scale to [0, 1] and normalise per channel
//
// Test pipeline: step 3 only.
//
// Padding is done in u8 space with 0, so a padded pixel ends
// up as (0 - mean) / std after normalisation, not as 0.0.

use rand::Rng;

use crate::domain::image::{LabeledImage, CHANNELS, HEIGHT, PIXELS_PER_IMAGE, WIDTH};

/// Per-channel mean used for normalisation (R, G, B).
pub const MEAN: [f32; CHANNELS] = [0.485, 0.456, 0.406];

/// Per-channel standard deviation used for normalisation (R, G, B).
pub const STD: [f32; CHANNELS] = [0.229, 0.224, 0.225];

/// Random flip + padded crop, as used for the training split.
#[derive(Debug, Clone)]
pub struct Augmenter {
    pub flip_prob: f64,
    pub padding:   usize,
}

impl Default for Augmenter {
    fn default() -> Self {
        Self { flip_prob: 0.5, padding: 4 }
    }
}

impl Augmenter {
    pub fn apply<R: Rng + ?Sized>(&self, image: &LabeledImage, rng: &mut R) -> LabeledImage {
        let flipped = if rng.gen_bool(self.flip_prob) {
            horizontal_flip(image)
        } else {
            image.clone()
        };

        let dy = rng.gen_range(0..=2 * self.padding);
        let dx = rng.gen_range(0..=2 * self.padding);
        padded_crop(&flipped, self.padding, dy, dx)
    }
}

/// Mirror an image left to right.
pub fn horizontal_flip(image: &LabeledImage) -> LabeledImage {
    let mut pixels = Vec::with_capacity(PIXELS_PER_IMAGE);
    for c in 0..CHANNELS {
        for y in 0..HEIGHT {
            for x in (0..WIDTH).rev() {
                pixels.push(image.at(c, y, x));
            }
        }
    }
    LabeledImage::new(pixels, image.label)
}

/// Crop a 32x32 window whose top-left corner sits at (`dy`, `dx`) in the
/// image zero-padded by `padding` on every side.
///
/// `dy == dx == padding` reproduces the original image.
pub fn padded_crop(image: &LabeledImage, padding: usize, dy: usize, dx: usize) -> LabeledImage {
    let mut pixels = Vec::with_capacity(PIXELS_PER_IMAGE);
    for c in 0..CHANNELS {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                // Coordinates in the unpadded source image
                let sy = (y + dy).checked_sub(padding).filter(|&v| v < HEIGHT);
                let sx = (x + dx).checked_sub(padding).filter(|&v| v < WIDTH);
                let value = match (sy, sx) {
                    (Some(sy), Some(sx)) => image.at(c, sy, sx),
                    _ => 0,
                };
                pixels.push(value);
            }
        }
    }
    LabeledImage::new(pixels, image.label)
}

/// Append the normalised float pixels of `image` to `out` (CHW order).
pub fn normalize_into(image: &LabeledImage, out: &mut Vec<f32>) {
    let plane = HEIGHT * WIDTH;
    for (i, &p) in image.pixels.iter().enumerate() {
        let c = i / plane;
        out.push((p as f32 / 255.0 - MEAN[c]) / STD[c]);
    }
}
