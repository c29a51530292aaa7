// ============================================================
// Layer 5 - CIFAR ResNet (post-activation)
// ============================================================
// The 6n+2 network from He et al. (2016) for 32x32 inputs:
//
//   conv3x3(3→16) → BN → ReLU
//   stage 1: n × BasicBlock(16)            32x32
//   stage 2: n × BasicBlock(32), stride 2  16x16
//   stage 3: n × BasicBlock(64), stride 2   8x8
//   global average pool → Linear(64 → num_classes)
//
// BasicBlock:
//   out = ReLU(BN(conv1(x)))
//   out = BN(conv2(out)) + shortcut(x)
//   out = ReLU(out)

use burn::{
    nn::{
        conv::Conv2d,
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        BatchNorm, BatchNormConfig,
        Linear,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::architecture::ShortcutKind;
use crate::ml::shortcut::Shortcut;
use crate::ml::{classifier_head, conv3x3, stage_strides, ImageClassifier, STAGE_PLANES, STEM_PLANES};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct ResNetConfig {
    pub num_blocks:  [usize; 3],
    pub num_classes: usize,
    pub shortcut:    ShortcutKind,
}

impl ResNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResNet<B> {
        let conv1 = conv3x3(3, STEM_PLANES, 1).init(device);
        let bn1   = BatchNormConfig::new(STEM_PLANES).init(device);

        let mut in_planes = STEM_PLANES;
        let layer1 = self.make_layer(&mut in_planes, STAGE_PLANES[0], self.num_blocks[0], 1, device);
        let layer2 = self.make_layer(&mut in_planes, STAGE_PLANES[1], self.num_blocks[1], 2, device);
        let layer3 = self.make_layer(&mut in_planes, STAGE_PLANES[2], self.num_blocks[2], 2, device);

        ResNet {
            conv1,
            bn1,
            layer1,
            layer2,
            layer3,
            pool:   AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            linear: classifier_head(in_planes, self.num_classes, device),
        }
    }

    /// One stage: the first block takes `stride`, the rest stride 1.
    /// `in_planes` is advanced to the stage's output width.
    fn make_layer<B: Backend>(
        &self,
        in_planes:  &mut usize,
        planes:     usize,
        num_blocks: usize,
        stride:     usize,
        device:     &B::Device,
    ) -> Vec<BasicBlock<B>> {
        stage_strides(stride, num_blocks)
            .into_iter()
            .map(|stride| {
                let block = BasicBlock::new(*in_planes, planes, stride, self.shortcut, device);
                *in_planes = planes;
                block
            })
            .collect()
    }
}

#[derive(Module, Debug)]
pub struct BasicBlock<B: Backend> {
    conv1:    Conv2d<B>,
    bn1:      BatchNorm<B, 2>,
    conv2:    Conv2d<B>,
    bn2:      BatchNorm<B, 2>,
    shortcut: Shortcut<B>,
}

impl<B: Backend> BasicBlock<B> {
    pub fn new(
        in_planes: usize,
        planes:    usize,
        stride:    usize,
        shortcut:  ShortcutKind,
        device:    &B::Device,
    ) -> Self {
        Self {
            conv1:    conv3x3(in_planes, planes, stride).init(device),
            bn1:      BatchNormConfig::new(planes).init(device),
            conv2:    conv3x3(planes, planes, 1).init(device),
            bn2:      BatchNormConfig::new(planes).init(device),
            shortcut: Shortcut::new(in_planes, planes, stride, shortcut, device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let out = relu(self.bn1.forward(self.conv1.forward(x.clone())));
        let out = self.bn2.forward(self.conv2.forward(out));
        relu(out + self.shortcut.forward(x))
    }
}

#[derive(Module, Debug)]
pub struct ResNet<B: Backend> {
    conv1:  Conv2d<B>,
    bn1:    BatchNorm<B, 2>,
    layer1: Vec<BasicBlock<B>>,
    layer2: Vec<BasicBlock<B>>,
    layer3: Vec<BasicBlock<B>>,
    pool:   AdaptiveAvgPool2d,
    linear: Linear<B>,
}

impl<B: Backend> ResNet<B> {
    /// images: [batch, 3, H, W] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = relu(self.bn1.forward(self.conv1.forward(images)));
        for block in self.layer1.iter().chain(&self.layer2).chain(&self.layer3) {
            x = block.forward(x);
        }
        let x = self.pool.forward(x).flatten::<2>(1, 3);
        self.linear.forward(x)
    }

    pub fn depth(&self) -> usize {
        2 * (self.layer1.len() + self.layer2.len() + self.layer3.len()) + 2
    }
}

impl<B: Backend> ImageClassifier<B> for ResNet<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        ResNet::forward(self, images)
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
        let model: ResNet<TestBackend> =
            ResNetConfig::new([1, 1, 1], 10, ShortcutKind::A).init(&device);
        let images = Tensor::<TestBackend, 4>::random(
            [2, 3, 32, 32],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        assert_eq!(model.forward(images).dims(), [2, 10]);
        assert_eq!(model.depth(), 8);
    }

    #[test]
    fn test_forward_shape_with_projection_shortcut() {
        let device = Default::default();
        let model: ResNet<TestBackend> =
            ResNetConfig::new([2, 1, 1], 100, ShortcutKind::B).init(&device);
        let images = Tensor::<TestBackend, 4>::zeros([1, 3, 32, 32], &device);
        assert_eq!(model.forward(images).dims(), [1, 100]);
    }

    #[test]
    fn test_basic_block_output_is_non_negative() {
        let device = Default::default();
        let block  = BasicBlock::<TestBackend>::new(16, 16, 1, ShortcutKind::A, &device);
        let x = Tensor::<TestBackend, 4>::random(
            [2, 16, 8, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let min: f32 = block.forward(x).min().into_scalar();
        assert!(min >= 0.0);
    }

    #[test]
    fn test_only_stage_entry_blocks_downsample() {
        let device = Default::default();
        let model: ResNet<TestBackend> =
            ResNetConfig::new([2, 2, 2], 10, ShortcutKind::A).init(&device);
        assert!(model.layer1.iter().all(|b| b.shortcut.is_identity()));
        assert!(!model.layer2[0].shortcut.is_identity());
        assert!(model.layer2[1].shortcut.is_identity());
        assert!(!model.layer3[0].shortcut.is_identity());
    }
}
