// ============================================================
// Layer 5 - Learning-Rate Schedule
// ============================================================
// Step decay as used for CIFAR ResNets:
//
//   lr(epoch) = base_lr * gamma ^ (#milestones <= epoch)
//
// With base_lr = 0.1, milestones = [100, 150], gamma = 0.1:
//   epochs   0..100 → 0.1
//   epochs 100..150 → 0.01
//   epochs 150..    → 0.001
//
// The trainer reads `current_lr()` for every optimizer step of an
// epoch and calls `step()` once after validation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiStepLr {
    base_lr:    f64,
    milestones: Vec<usize>,
    gamma:      f64,
    /// Number of completed epochs
    epoch:      usize,
}

impl MultiStepLr {
    pub fn new(base_lr: f64, mut milestones: Vec<usize>, gamma: f64) -> Self {
        milestones.sort_unstable();
        Self { base_lr, milestones, gamma, epoch: 0 }
    }

    /// Learning rate for any (0-based) epoch.
    pub fn lr_at(&self, epoch: usize) -> f64 {
        let decays = self.milestones.iter().filter(|&&m| m <= epoch).count();
        self.base_lr * self.gamma.powi(decays as i32)
    }

    pub fn current_lr(&self) -> f64 {
        self.lr_at(self.epoch)
    }

    /// Advance to the next epoch.
    pub fn step(&mut self) {
        self.epoch += 1;
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_decays_at_milestones() {
        let sched = MultiStepLr::new(0.1, vec![100, 150], 0.1);
        assert!(close(sched.lr_at(0), 0.1));
        assert!(close(sched.lr_at(99), 0.1));
        assert!(close(sched.lr_at(100), 0.01));
        assert!(close(sched.lr_at(149), 0.01));
        assert!(close(sched.lr_at(150), 0.001));
        assert!(close(sched.lr_at(199), 0.001));
    }

    #[test]
    fn test_step_advances_current_lr() {
        let mut sched = MultiStepLr::new(1.0, vec![1], 0.5);
        assert!(close(sched.current_lr(), 1.0));
        sched.step();
        assert!(close(sched.current_lr(), 0.5));
        sched.step();
        assert!(close(sched.current_lr(), 0.5));
    }

    #[test]
    fn test_unsorted_milestones() {
        let sched = MultiStepLr::new(1.0, vec![20, 10], 0.1);
        assert!(close(sched.lr_at(15), 0.1));
    }

    #[test]
    fn test_no_milestones_is_constant() {
        let sched = MultiStepLr::new(0.05, Vec::new(), 0.1);
        assert!(close(sched.lr_at(1000), 0.05));
    }
}
