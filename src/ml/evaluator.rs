// ============================================================
// Layer 5 - Evaluator
// ============================================================
// Scores a model on the test split without autodiff.
//
// `validate_model` is shared with the trainer's per-epoch
// validation. `evaluate_checkpoint` rebuilds the network from a
// saved run config and loads the best weights first, so a
// finished run can be re-scored later.

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::CifarDataset,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{build_resnet, build_resnet_ic, meter::{precision_at_1, AverageMeter}, ImageClassifier};

type EvalBackend = burn::backend::Wgpu;

/// Prec@1 meter over every batch the loader yields.
pub fn validate_model<B: Backend, M: ImageClassifier<B>>(
    model:  &M,
    loader: &dyn DataLoader<ImageBatch<B>>,
) -> AverageMeter {
    let mut top1_acc = AverageMeter::new();
    for batch in loader.iter() {
        let batch_size = batch.targets.dims()[0];
        let logits     = model.forward(batch.images);
        top1_acc.update(precision_at_1(logits, batch.targets), batch_size);
    }
    top1_acc
}

/// Load the best checkpoint described by `cfg` and return its test Prec@1.
pub fn evaluate_checkpoint(
    cfg:          &TrainConfig,
    checkpoint:   &CheckpointManager,
    test_dataset: CifarDataset,
) -> Result<f64> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    evaluate_checkpoint_on::<EvalBackend>(cfg, checkpoint, test_dataset, device)
}

pub fn evaluate_checkpoint_on<B: Backend>(
    cfg:          &TrainConfig,
    checkpoint:   &CheckpointManager,
    test_dataset: CifarDataset,
    device:       B::Device,
) -> Result<f64> {
    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::test(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers)
        .build(test_dataset);

    let num_classes = cfg.task.num_classes();
    let top1_acc = if cfg.architecture.uses_ic_layers() {
        let model = build_resnet_ic::<B>(cfg.architecture, num_classes, cfg.shortcut, cfg.ic_dropout, &device);
        let model = checkpoint.load_best(model, &device)?;
        validate_model(&model, loader.as_ref())
    } else {
        let model = build_resnet::<B>(cfg.architecture, num_classes, cfg.shortcut, &device);
        let model = checkpoint.load_best(model, &device)?;
        validate_model(&model, loader.as_ref())
    };

    tracing::info!("*Evaluation*: Prec@1 {:.3} over {} images", top1_acc.avg, top1_acc.count);
    Ok(top1_acc.avg)
}
