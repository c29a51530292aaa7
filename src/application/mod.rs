// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers for one user goal:
//
//   train_use_case.rs    - load CIFAR, build the model, train,
//                          keep the best checkpoint
//   evaluate_use_case.rs - reload a finished run's best
//                          checkpoint and score it on the test split
//
// No tensor math and no printing here; that lives in Layer 5
// and Layer 1 respectively.

// The training workflow
pub mod train_use_case;

// Re-scoring a saved best checkpoint
pub mod evaluate_use_case;
