// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by training and evaluation:
//
//   checkpoint.rs - best-model weights (Burn CompactRecorder),
//                   best-epoch record and run config as JSON
//
//   metrics.rs    - per-epoch metrics appended to a CSV file
//
// Reference: Burn Book §5 (Records and Checkpointing)

/// Best-model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
