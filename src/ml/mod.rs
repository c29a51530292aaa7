// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn-specific code lives in this layer.
//
//   shortcut.rs   - identity / option A / option B skip paths
//   resnet.rs     - post-activation CIFAR ResNet (BasicBlock)
//   resnet_ic.rs  - pre-activation ResNet with IC layers
//   scheduler.rs  - multi-step learning-rate decay
//   meter.rs      - running averages and top-1 accuracy
//   trainer.rs    - the epoch loop with best-model checkpointing
//   evaluator.rs  - reload the best checkpoint and score it
//
// Reference: He et al. (2016) Deep Residual Learning
//            Burn Book §3 (Building Blocks), §5 (Training)

pub mod shortcut;
pub mod resnet;
pub mod resnet_ic;
pub mod scheduler;
pub mod meter;
pub mod trainer;
pub mod evaluator;

use burn::{
    module::Param,
    nn::{conv::Conv2dConfig, Initializer, Linear, LinearConfig, PaddingConfig2d},
    prelude::*,
    tensor::Distribution,
};

use crate::domain::architecture::{Architecture, ShortcutKind};
use crate::ml::resnet::{ResNet, ResNetConfig};
use crate::ml::resnet_ic::{ResNetIc, ResNetIcConfig};

/// Output channels of the stem convolution.
pub const STEM_PLANES: usize = 16;

/// Channel width of each of the three stages.
pub const STAGE_PLANES: [usize; 3] = [16, 32, 64];

/// Anything that maps an image batch to class logits.
///
/// Lets the trainer and evaluator stay generic over the plain and IC
/// networks, which are different Burn modules.
pub trait ImageClassifier<B: Backend> {
    /// images: [batch, 3, H, W] → logits: [batch, num_classes]
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}

/// Kaiming-normal (fan-in, ReLU gain) init for every conv and linear weight.
pub(crate) fn kaiming_normal() -> Initializer {
    Initializer::KaimingNormal {
        gain:         std::f64::consts::SQRT_2,
        fan_out_only: false,
    }
}

/// Final linear layer: Kaiming-normal weight, bias drawn from
/// U(-1/sqrt(fan_in), 1/sqrt(fan_in)). Only the weight is Kaiming.
pub(crate) fn classifier_head<B: Backend>(
    in_features: usize,
    num_classes: usize,
    device:      &B::Device,
) -> Linear<B> {
    let mut linear = LinearConfig::new(in_features, num_classes)
        .with_initializer(kaiming_normal())
        .init(device);
    let bound = 1.0 / (in_features as f64).sqrt();
    linear.bias = Some(Param::from_tensor(Tensor::random(
        [num_classes],
        Distribution::Uniform(-bound, bound),
        device,
    )));
    linear
}

/// 3x3 convolution, padding 1, no bias.
pub(crate) fn conv3x3(in_planes: usize, planes: usize, stride: usize) -> Conv2dConfig {
    Conv2dConfig::new([in_planes, planes], [3, 3])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .with_bias(false)
        .with_initializer(kaiming_normal())
}

/// Stride of every block in a stage: `[stride, 1, 1, ...]`.
pub(crate) fn stage_strides(stride: usize, num_blocks: usize) -> Vec<usize> {
    (0..num_blocks).map(|i| if i == 0 { stride } else { 1 }).collect()
}

/// Build one of the plain ResNets (`resnet110`, `resnet164`).
pub fn build_resnet<B: Backend>(
    arch:        Architecture,
    num_classes: usize,
    shortcut:    ShortcutKind,
    device:      &B::Device,
) -> ResNet<B> {
    let model = ResNetConfig::new(arch.blocks_per_stage(), num_classes, shortcut).init(device);
    tracing::info!("Creating {} model ({} weight layers)", arch, model.depth());
    model
}

/// Build one of the IC ResNets (`resnet110_ic`, `resnet164_ic`).
pub fn build_resnet_ic<B: Backend>(
    arch:        Architecture,
    num_classes: usize,
    shortcut:    ShortcutKind,
    dropout:     f64,
    device:      &B::Device,
) -> ResNetIc<B> {
    tracing::info!("Creating {} model with IC layers", arch);
    ResNetIcConfig::new(arch.blocks_per_stage(), num_classes, shortcut)
        .with_dropout(dropout)
        .init(device)
}
