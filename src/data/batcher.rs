// ============================================================
// Layer 4 - Image Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<LabeledImage>
// into one float image tensor and one label tensor.
//
//   Input:  N LabeledImages, each 3×32×32 u8
//   Output: images  [N, 3, 32, 32]  (normalised f32)
//           targets [N]             (class indices)
//
// The training batcher also runs the random flip / crop from
// augment.rs on every sample, so each epoch sees a different
// view of the data. The test batcher only normalises.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::augment::{normalize_into, Augmenter};
use crate::domain::image::{LabeledImage, CHANNELS, HEIGHT, PIXELS_PER_IMAGE, WIDTH};

// ─── ImageBatch ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Normalised pixels - shape: [batch_size, 3, 32, 32]
    pub images: Tensor<B, 4>,

    /// Ground truth class indices - shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,

    /// `Some` for the training split only
    augmenter: Option<Augmenter>,
}

impl<B: Backend> ImageBatcher<B> {
    /// Batcher for the training split: augments every sample.
    pub fn train(device: B::Device) -> Self {
        Self { device, augmenter: Some(Augmenter::default()) }
    }

    /// Batcher for the test split: normalisation only.
    pub fn test(device: B::Device) -> Self {
        Self { device, augmenter: None }
    }
}

impl<B: Backend> Batcher<LabeledImage, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<LabeledImage>) -> ImageBatch<B> {
        let batch_size = items.len();
        let mut rng    = rand::thread_rng();

        // ── Augment + normalise into one flat buffer ──────────────────────────
        let mut flat = Vec::with_capacity(batch_size * PIXELS_PER_IMAGE);
        for item in &items {
            match &self.augmenter {
                Some(aug) => normalize_into(&aug.apply(item, &mut rng), &mut flat),
                None      => normalize_into(item, &mut flat),
            }
        }

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        // ── Create tensors ────────────────────────────────────────────────────
        let images = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, CHANNELS, HEIGHT, WIDTH]);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ImageBatch { images, targets }
    }
}
