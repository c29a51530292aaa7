use burn::data::dataset::Dataset;

use crate::domain::image::LabeledImage;

/// In-memory CIFAR split served to Burn's DataLoader.
pub struct CifarDataset {
    images: Vec<LabeledImage>,
}

impl CifarDataset {
    pub fn new(images: Vec<LabeledImage>) -> Self { Self { images } }

    pub fn image_count(&self) -> usize { self.images.len() }
}

impl Dataset<LabeledImage> for CifarDataset {
    fn get(&self, index: usize) -> Option<LabeledImage> {
        self.images.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}
