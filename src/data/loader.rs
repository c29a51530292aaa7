// ============================================================
// Layer 4 - CIFAR Binary Loader
// ============================================================
// Reads the "binary version" of CIFAR-10 and CIFAR-100 as
// published on https://www.cs.toronto.edu/~kriz/cifar.html
//
// Expected layout under the data root (i.e. the archives
// extracted in place):
//
//   data/
//     cifar-10-batches-bin/
//       data_batch_1.bin … data_batch_5.bin   ← train
//       test_batch.bin                        ← test
//     cifar-100-binary/
//       train.bin
//       test.bin
//
// Record layout:
//   CIFAR-10:  <1 byte label><3072 bytes pixels>
//   CIFAR-100: <1 byte coarse><1 byte fine><3072 bytes pixels>
//
// Pixels are 1024 red, then 1024 green, then 1024 blue bytes,
// each plane row-major. That is already CHW order, so a record's
// pixel slice is copied into LabeledImage as is.

use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::image::{LabeledImage, PIXELS_PER_IMAGE};
use crate::domain::task::Task;
use crate::domain::traits::{ImageSource, Split};

/// Loads CIFAR-10 or CIFAR-100 from the extracted binary archives.
/// Implements the ImageSource trait from Layer 3.
pub struct CifarLoader {
    root: PathBuf,
    task: Task,
}

impl CifarLoader {
    pub fn new(root: impl Into<PathBuf>, task: Task) -> Self {
        Self { root: root.into(), task }
    }

    /// The binary files that make up a split, in reading order.
    pub fn split_files(&self, split: Split) -> Vec<PathBuf> {
        match (self.task, split) {
            (Task::Cifar10, Split::Train) => {
                let dir = self.root.join("cifar-10-batches-bin");
                (1..=5).map(|i| dir.join(format!("data_batch_{i}.bin"))).collect()
            }
            (Task::Cifar10, Split::Test) => {
                vec![self.root.join("cifar-10-batches-bin").join("test_batch.bin")]
            }
            (Task::Cifar100, Split::Train) => {
                vec![self.root.join("cifar-100-binary").join("train.bin")]
            }
            (Task::Cifar100, Split::Test) => {
                vec![self.root.join("cifar-100-binary").join("test.bin")]
            }
        }
    }

    /// Number of label bytes in front of each record's pixels.
    fn label_bytes(&self) -> usize {
        match self.task {
            Task::Cifar10  => 1,
            Task::Cifar100 => 2,
        }
    }
}

impl ImageSource for CifarLoader {
    fn load_split(&self, split: Split) -> Result<Vec<LabeledImage>> {
        tracing::info!("Loading {} {:?} dataset", self.task, split);

        let mut images = Vec::new();
        for path in self.split_files(split) {
            let mut part = read_record_file(&path, self.label_bytes(), self.task.num_classes())?;
            tracing::debug!("Read {} images from '{}'", part.len(), path.display());
            images.append(&mut part);
        }

        tracing::info!("Loaded {} {:?} images", images.len(), split);
        Ok(images)
    }
}

/// Decode every fixed-size record in one binary batch file.
///
/// The label used is the LAST label byte of the record, which is the
/// class label for CIFAR-10 and the fine label for CIFAR-100.
fn read_record_file(path: &Path, label_bytes: usize, num_classes: usize) -> Result<Vec<LabeledImage>> {
    let bytes = fs::read(path).with_context(|| {
        format!(
            "Cannot read '{}'. Download and extract the CIFAR binary archive into the data directory first.",
            path.display()
        )
    })?;
    decode_records(&bytes, label_bytes, num_classes)
        .with_context(|| format!("Malformed CIFAR file '{}'", path.display()))
}

fn decode_records(bytes: &[u8], label_bytes: usize, num_classes: usize) -> Result<Vec<LabeledImage>> {
    let record_len = label_bytes + PIXELS_PER_IMAGE;
    if bytes.len() % record_len != 0 {
        bail!(
            "file size {} is not a multiple of the {}-byte record size",
            bytes.len(),
            record_len
        );
    }

    bytes
        .chunks_exact(record_len)
        .enumerate()
        .map(|(i, record)| {
            let label = record[label_bytes - 1] as usize;
            if label >= num_classes {
                bail!("record {i} has label {label}, expected < {num_classes}");
            }
            Ok(LabeledImage::new(record[label_bytes..].to_vec(), label))
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(labels: &[u8], fill: u8) -> Vec<u8> {
        let mut r = labels.to_vec();
        r.extend(std::iter::repeat(fill).take(PIXELS_PER_IMAGE));
        r
    }

    #[test]
    fn test_decode_cifar10_records() {
        let mut bytes = record(&[3], 7);
        bytes.extend(record(&[9], 200));

        let images = decode_records(&bytes, 1, 10).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].label, 3);
        assert_eq!(images[1].label, 9);
        assert_eq!(images[1].pixels.len(), PIXELS_PER_IMAGE);
        assert_eq!(images[1].at(2, 31, 31), 200);
    }

    #[test]
    fn test_cifar100_uses_fine_label() {
        // coarse = 4, fine = 57
        let bytes  = record(&[4, 57], 0);
        let images = decode_records(&bytes, 2, 100).unwrap();
        assert_eq!(images[0].label, 57);
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let mut bytes = record(&[1], 0);
        bytes.pop();
        assert!(decode_records(&bytes, 1, 10).is_err());
    }

    #[test]
    fn test_out_of_range_label_is_rejected() {
        let bytes = record(&[10], 0);
        assert!(decode_records(&bytes, 1, 10).is_err());
    }

    #[test]
    fn test_load_split_from_disk() {
        let dir     = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("cifar-100-binary");
        fs::create_dir_all(&bin_dir).unwrap();
        let mut bytes = record(&[0, 12], 1);
        bytes.extend(record(&[1, 99], 2));
        fs::write(bin_dir.join("test.bin"), bytes).unwrap();

        let loader = CifarLoader::new(dir.path(), Task::Cifar100);
        let images = loader.load_split(Split::Test).unwrap();
        assert_eq!(images.iter().map(|i| i.label).collect::<Vec<_>>(), vec![12, 99]);
    }

    #[test]
    fn test_missing_file_names_expected_path() {
        let dir    = tempfile::tempdir().unwrap();
        let loader = CifarLoader::new(dir.path(), Task::Cifar10);
        let err    = loader.load_split(Split::Train).unwrap_err();
        assert!(format!("{err:#}").contains("data_batch_1.bin"));
    }

    #[test]
    fn test_cifar10_train_has_five_batches() {
        let loader = CifarLoader::new("data", Task::Cifar10);
        assert_eq!(loader.split_files(Split::Train).len(), 5);
        assert_eq!(loader.split_files(Split::Test).len(), 1);
    }
}
