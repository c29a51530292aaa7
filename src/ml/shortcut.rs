// ============================================================
// Layer 5 - Residual Shortcut
// ============================================================
// The skip path of a basic block. Three shapes are possible:
//
//   identity    stride 1 and same channel count
//   option A    x[:, :, ::s, ::s] then zero-pad channels by planes/4
//               on each side (no parameters, used by the CIFAR paper)
//   option B    1x1 conv (stride s) + BatchNorm projection
//
// Burn's Module derive handles Option<Module> fields, so the three
// cases share one struct instead of an enum.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig,
    },
    prelude::*,
};

use crate::domain::architecture::ShortcutKind;
use crate::ml::kaiming_normal;

#[derive(Module, Debug)]
pub struct Shortcut<B: Backend> {
    projection:      Option<Conv2d<B>>,
    projection_norm: Option<BatchNorm<B, 2>>,
    /// Zero channels added on each side by option A (0 otherwise)
    channel_pad:     usize,
    stride:          usize,
}

impl<B: Backend> Shortcut<B> {
    pub fn new(
        in_planes: usize,
        planes:    usize,
        stride:    usize,
        kind:      ShortcutKind,
        device:    &B::Device,
    ) -> Self {
        let identity = stride == 1 && in_planes == planes;
        match kind {
            _ if identity => Self {
                projection: None, projection_norm: None, channel_pad: 0, stride: 1,
            },
            ShortcutKind::A => Self {
                projection: None, projection_norm: None, channel_pad: planes / 4, stride,
            },
            ShortcutKind::B => Self {
                projection: Some(
                    Conv2dConfig::new([in_planes, planes], [1, 1])
                        .with_stride([stride, stride])
                        .with_bias(false)
                        .with_initializer(kaiming_normal())
                        .init(device),
                ),
                projection_norm: Some(BatchNormConfig::new(planes).init(device)),
                channel_pad: 0,
                stride,
            },
        }
    }

    pub fn is_identity(&self) -> bool {
        self.projection.is_none() && self.channel_pad == 0 && self.stride == 1
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        if let (Some(conv), Some(norm)) = (&self.projection, &self.projection_norm) {
            return norm.forward(conv.forward(x));
        }
        if self.is_identity() {
            return x;
        }

        // ── Option A ──────────────────────────────────────────────────────────
        let device         = x.device();
        let [_, _, h, w]   = x.dims();
        let rows = Tensor::<B, 1, Int>::arange_step(0..h as i64, self.stride, &device);
        let cols = Tensor::<B, 1, Int>::arange_step(0..w as i64, self.stride, &device);
        let x = x.select(2, rows).select(3, cols);

        if self.channel_pad == 0 {
            return x;
        }
        let [n, _, h, w] = x.dims();
        let zeros = Tensor::<B, 4>::zeros([n, self.channel_pad, h, w], &device);
        Tensor::cat(vec![zeros.clone(), x, zeros], 1)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_identity_passes_input_through() {
        let device   = Default::default();
        let shortcut = Shortcut::<TestBackend>::new(16, 16, 1, ShortcutKind::A, &device);
        assert!(shortcut.is_identity());

        let x   = Tensor::<TestBackend, 4>::ones([2, 16, 8, 8], &device);
        let out = shortcut.forward(x.clone());
        out.into_data().assert_eq(&x.into_data(), true);
    }

    #[test]
    fn test_option_a_subsamples_and_pads_channels() {
        let device   = Default::default();
        let shortcut = Shortcut::<TestBackend>::new(16, 32, 2, ShortcutKind::A, &device);
        let x        = Tensor::<TestBackend, 4>::ones([2, 16, 8, 8], &device);
        let out      = shortcut.forward(x);
        assert_eq!(out.dims(), [2, 32, 4, 4]);

        // 8 zero channels, 16 copied channels, 8 zero channels
        let sum: f32 = out.clone().slice([0..2, 0..8, 0..4, 0..4]).sum().into_scalar();
        assert_eq!(sum, 0.0);
        let sum: f32 = out.slice([0..2, 8..24, 0..4, 0..4]).sum().into_scalar();
        assert_eq!(sum, (2 * 16 * 4 * 4) as f32);
    }

    #[test]
    fn test_option_a_keeps_even_positions() {
        let device = Default::default();
        // Values 0..16 laid out on a 4x4 grid in a single channel
        let x = Tensor::<TestBackend, 1>::from_floats(
            (0..16).map(|v| v as f32).collect::<Vec<_>>().as_slice(),
            &device,
        )
        .reshape([1, 1, 4, 4]);
        let shortcut = Shortcut::<TestBackend>::new(1, 1, 2, ShortcutKind::A, &device);
        let out      = shortcut.forward(x);
        let values   = out.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 2.0, 8.0, 10.0]);
    }

    #[test]
    fn test_option_b_projects() {
        let device   = Default::default();
        let shortcut = Shortcut::<TestBackend>::new(16, 32, 2, ShortcutKind::B, &device);
        assert!(!shortcut.is_identity());
        let x   = Tensor::<TestBackend, 4>::ones([1, 16, 8, 8], &device);
        assert_eq!(shortcut.forward(x).dims(), [1, 32, 4, 4]);
    }
}
