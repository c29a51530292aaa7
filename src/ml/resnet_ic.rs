// ============================================================
// Layer 5 - CIFAR ResNet with IC layers (pre-activation)
// ============================================================
// An IC ("Information Combining") layer is BatchNorm followed by
// Dropout. It is placed directly in front of every weight layer
// so each convolution sees whitened, partially dropped inputs.
//
//   IC(3) → conv3x3(3→16)
//   stage 1..3: n × BasicBlockIc (16, 32, 64 planes)
//   ReLU → IC(64) → global average pool → Linear(64 → num_classes)
//
// BasicBlockIc:
//   out = conv1(IC1(ReLU(x)))
//   out = conv2(IC2(ReLU(out))) + shortcut(x)
//
// There is no ReLU after the addition; the next block (or the
// head) applies it first.

use burn::{
    nn::{
        conv::Conv2d,
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Linear,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::architecture::ShortcutKind;
use crate::ml::shortcut::Shortcut;
use crate::ml::{classifier_head, conv3x3, stage_strides, ImageClassifier, STAGE_PLANES, STEM_PLANES};

#[derive(Config, Debug)]
pub struct ResNetIcConfig {
    pub num_blocks:  [usize; 3],
    pub num_classes: usize,
    pub shortcut:    ShortcutKind,
    /// Dropout probability inside every IC layer
    #[config(default = 0.5)]
    pub dropout:     f64,
}

impl ResNetIcConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResNetIc<B> {
        let ic1   = IcLayer::new(3, self.dropout, device);
        let conv1 = conv3x3(3, STEM_PLANES, 1).init(device);

        let mut in_planes = STEM_PLANES;
        let layer1 = self.make_layer(&mut in_planes, STAGE_PLANES[0], self.num_blocks[0], 1, device);
        let layer2 = self.make_layer(&mut in_planes, STAGE_PLANES[1], self.num_blocks[1], 2, device);
        let layer3 = self.make_layer(&mut in_planes, STAGE_PLANES[2], self.num_blocks[2], 2, device);

        ResNetIc {
            ic1,
            conv1,
            layer1,
            layer2,
            layer3,
            ic2:    IcLayer::new(in_planes, self.dropout, device),
            pool:   AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            linear: classifier_head(in_planes, self.num_classes, device),
        }
    }

    fn make_layer<B: Backend>(
        &self,
        in_planes:  &mut usize,
        planes:     usize,
        num_blocks: usize,
        stride:     usize,
        device:     &B::Device,
    ) -> Vec<BasicBlockIc<B>> {
        stage_strides(stride, num_blocks)
            .into_iter()
            .map(|stride| {
                let block = BasicBlockIc::new(
                    *in_planes, planes, stride, self.shortcut, self.dropout, device,
                );
                *in_planes = planes;
                block
            })
            .collect()
    }
}

/// BatchNorm followed by Dropout.
#[derive(Module, Debug)]
pub struct IcLayer<B: Backend> {
    bn:      BatchNorm<B, 2>,
    dropout: Dropout,
}

impl<B: Backend> IcLayer<B> {
    pub fn new(planes: usize, p: f64, device: &B::Device) -> Self {
        Self {
            bn:      BatchNormConfig::new(planes).init(device),
            dropout: DropoutConfig::new(p).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.dropout.forward(self.bn.forward(x))
    }
}

#[derive(Module, Debug)]
pub struct BasicBlockIc<B: Backend> {
    ic1:      IcLayer<B>,
    conv1:    Conv2d<B>,
    ic2:      IcLayer<B>,
    conv2:    Conv2d<B>,
    shortcut: Shortcut<B>,
}

impl<B: Backend> BasicBlockIc<B> {
    pub fn new(
        in_planes: usize,
        planes:    usize,
        stride:    usize,
        shortcut:  ShortcutKind,
        dropout:   f64,
        device:    &B::Device,
    ) -> Self {
        Self {
            ic1:      IcLayer::new(in_planes, dropout, device),
            conv1:    conv3x3(in_planes, planes, stride).init(device),
            ic2:      IcLayer::new(planes, dropout, device),
            conv2:    conv3x3(planes, planes, 1).init(device),
            shortcut: Shortcut::new(in_planes, planes, stride, shortcut, device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let out = self.conv1.forward(self.ic1.forward(relu(x.clone())));
        let out = self.conv2.forward(self.ic2.forward(relu(out)));
        out + self.shortcut.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct ResNetIc<B: Backend> {
    ic1:    IcLayer<B>,
    conv1:  Conv2d<B>,
    layer1: Vec<BasicBlockIc<B>>,
    layer2: Vec<BasicBlockIc<B>>,
    layer3: Vec<BasicBlockIc<B>>,
    ic2:    IcLayer<B>,
    pool:   AdaptiveAvgPool2d,
    linear: Linear<B>,
}

impl<B: Backend> ResNetIc<B> {
    /// images: [batch, 3, H, W] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = self.conv1.forward(self.ic1.forward(images));
        for block in self.layer1.iter().chain(&self.layer2).chain(&self.layer3) {
            x = block.forward(x);
        }
        // IC runs on the 8x8 maps, before pooling
        let x = self.ic2.forward(relu(x));
        let x = self.pool.forward(x).flatten::<2>(1, 3);
        self.linear.forward(x)
    }
}

impl<B: Backend> ImageClassifier<B> for ResNetIc<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        ResNetIc::forward(self, images)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model: ResNetIc<TestBackend> =
            ResNetIcConfig::new([1, 1, 1], 10, ShortcutKind::A).init(&device);
        let images = Tensor::<TestBackend, 4>::random(
            [2, 3, 32, 32],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        assert_eq!(model.forward(images).dims(), [2, 10]);
    }

    #[test]
    fn test_default_dropout() {
        let cfg = ResNetIcConfig::new([18, 18, 18], 100, ShortcutKind::A);
        assert_eq!(cfg.dropout, 0.5);
    }

    #[test]
    fn test_inference_is_deterministic() {
        // Dropout is a no-op outside autodiff, so two passes agree exactly
        let device = Default::default();
        let model: ResNetIc<TestBackend> = ResNetIcConfig::new([1, 1, 1], 10, ShortcutKind::B)
            .with_dropout(0.9)
            .init(&device);
        let images = Tensor::<TestBackend, 4>::ones([1, 3, 32, 32], &device);
        let a = model.forward(images.clone()).into_data();
        let b = model.forward(images).into_data();
        a.assert_eq(&b, true);
    }

    #[test]
    fn test_ic_block_has_no_trailing_relu() {
        // relu(-1) = 0 zeroes the residual branch (fresh BatchNorm maps 0 to 0,
        // convs have no bias), so the output is the identity shortcut: -1
        let device = Default::default();
        let block  = BasicBlockIc::<TestBackend>::new(16, 16, 1, ShortcutKind::A, 0.5, &device);
        let x      = Tensor::<TestBackend, 4>::ones([1, 16, 4, 4], &device).neg();
        let out    = block.forward(x);
        let max: f32 = out.clone().max().into_scalar();
        let min: f32 = out.min().into_scalar();
        assert!((max + 1.0).abs() < 1e-6);
        assert!((min + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ic_layer_keeps_shape() {
        let device = Default::default();
        let ic     = IcLayer::<TestBackend>::new(16, 0.5, &device);
        let x      = Tensor::<TestBackend, 4>::ones([2, 16, 8, 8], &device);
        assert_eq!(ic.forward(x).dims(), [2, 16, 8, 8]);
    }
}
