// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types describing what the system works with:
// which dataset we train on, which network we build, and what
// a single labelled image looks like.
//
// Rules for this layer:
//   - NO Burn tensor types here
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Everything here is unit-testable without a GPU.

// CIFAR-10 / CIFAR-100 task selection
pub mod task;

// ResNet depth / IC variant and shortcut options
pub mod architecture;

// A single decoded 32x32 RGB image with its label
pub mod image;

// Core abstractions (traits) that other layers implement
pub mod traits;
