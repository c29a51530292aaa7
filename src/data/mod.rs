// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// From CIFAR binary files on disk to tensor batches:
//
//   *.bin files
//       │
//       ▼
//   CifarLoader     → decodes records into LabeledImage
//       │
//       ▼
//   CifarDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher    → flip / crop (train only), normalise, stack
//       │
//       ▼
//   DataLoader      → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the CIFAR-10 / CIFAR-100 binary format
pub mod loader;

/// Random flip, padded crop, and normalisation
pub mod augment;

/// Implements Burn's Dataset trait for decoded images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
