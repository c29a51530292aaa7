use burn::prelude::*;

/// Running average of a per-batch metric, weighted by batch size.
#[derive(Debug, Clone, Default)]
pub struct AverageMeter {
    pub sum:   f64,
    pub count: usize,
    pub avg:   f64,
}

impl AverageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` as the mean over `n` samples.
    pub fn update(&mut self, value: f64, n: usize) {
        self.sum   += value * n as f64;
        self.count += n;
        self.avg    = if self.count > 0 { self.sum / self.count as f64 } else { 0.0 };
    }
}

/// Number of rows whose argmax matches the target class.
///
/// logits: [batch, num_classes], targets: [batch]
pub fn top1_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns [batch, 1]; flatten to [batch] before comparing
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    predicted.equal(targets).int().sum().into_scalar().elem::<i64>() as usize
}

/// Top-1 precision of a batch as a percentage (0-100).
pub fn precision_at_1<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> f64 {
    let batch_size = targets.dims()[0];
    if batch_size == 0 {
        return 0.0;
    }
    100.0 * top1_correct(logits, targets) as f64 / batch_size as f64
}
