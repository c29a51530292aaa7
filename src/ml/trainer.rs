// ============================================================
// Layer 5 - Training Loop (Learner)
// ============================================================
// Epoch-based supervised training with step LR decay and
// best-model selection.
//
// Per epoch:
//   1. log the current learning rate
//   2. train_step - one pass over the augmented training set
//   3. validate   - Prec@1 over the test set, no autodiff
//   4. record test accuracy, step the scheduler
//   5. if test accuracy beats the best so far → save the model
//
// Burn specifics:
//   - Training runs on B (Autodiff<Wgpu> in production)
//   - model.valid() gives the same weights on B::InnerBackend,
//     where Dropout is off and BatchNorm uses running statistics
//   - optim.step consumes the model and returns the updated one,
//     so train_step takes and returns the model by value
//
// Reference: Burn Book §5 (Custom Training Loop)
//            He et al. (2016) §4.2 CIFAR-10 training schedule

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{
        decay::WeightDecayConfig, momentum::MomentumConfig, GradientsParams, Optimizer, SgdConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{marker::PhantomData, sync::Arc};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::CifarDataset,
};
use crate::infra::{
    checkpoint::{BestRecord, CheckpointManager},
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    evaluator::validate_model,
    meter::{precision_at_1, AverageMeter},
    build_resnet, build_resnet_ic,
    resnet::ResNet,
    resnet_ic::ResNetIc,
    scheduler::MultiStepLr,
    ImageClassifier,
};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Outcome of a full training run.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    /// Test Prec@1 after every epoch, in order
    pub test_acc_all: Vec<f64>,
    /// Best epoch, `None` if accuracy never rose above 0
    pub best:         Option<BestRecord>,
}

/// Train on the default WGPU device.
pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: CifarDataset,
    test_dataset:  CifarDataset,
    checkpoint:    CheckpointManager,
    metrics:       MetricsLogger,
) -> Result<TrainSummary> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    run_training_on::<MyBackend>(cfg, train_dataset, test_dataset, checkpoint, metrics, device)
}

/// Build model, loaders and optimizer for `cfg`, then run the Learner.
pub fn run_training_on<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: CifarDataset,
    test_dataset:  CifarDataset,
    checkpoint:    CheckpointManager,
    metrics:       MetricsLogger,
    device:        B::Device,
) -> Result<TrainSummary> {
    B::seed(cfg.seed);

    let num_train_batches = train_dataset.image_count().div_ceil(cfg.batch_size);

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ImageBatcher::<B>::train(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(train_dataset);

    // Validation runs on the inner backend, no autodiff overhead
    let test_loader = DataLoaderBuilder::new(ImageBatcher::<B::InnerBackend>::test(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers)
        .build(test_dataset);

    // ── SGD with momentum + L2 weight decay ───────────────────────────────────
    let optim_cfg = SgdConfig::new()
        .with_momentum(Some(
            MomentumConfig::new()
                .with_momentum(cfg.momentum)
                .with_dampening(0.0),
        ))
        .with_weight_decay(Some(WeightDecayConfig::new(cfg.weight_decay as f32)));

    let scheduler   = MultiStepLr::new(cfg.lr, cfg.milestones.clone(), cfg.gamma);
    let num_classes = cfg.task.num_classes();

    if cfg.architecture.uses_ic_layers() {
        let model = build_resnet_ic::<B>(cfg.architecture, num_classes, cfg.shortcut, cfg.ic_dropout, &device);
        Learner::new(optim_cfg.init::<B, ResNetIc<B>>(), scheduler, checkpoint, metrics, cfg, device)
            .train(model, train_loader, test_loader, num_train_batches)
    } else {
        let model = build_resnet::<B>(cfg.architecture, num_classes, cfg.shortcut, &device);
        Learner::new(optim_cfg.init::<B, ResNet<B>>(), scheduler, checkpoint, metrics, cfg, device)
            .train(model, train_loader, test_loader, num_train_batches)
    }
}

/// Best-epoch bookkeeping. Only a strictly higher accuracy counts, so
/// ties keep the earliest epoch and an all-zero run never saves.
#[derive(Debug, Clone, Default)]
pub struct BestTracker {
    best: Option<BestRecord>,
}

impl BestTracker {
    /// Best accuracy so far, 0 before anything was recorded.
    pub fn best_acc(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |b| b.test_acc)
    }

    /// Record an epoch's result. Returns the new best when it improved.
    pub fn observe(&mut self, epoch: usize, test_acc: f64) -> Option<BestRecord> {
        if test_acc > self.best_acc() {
            let best = BestRecord { epoch, test_acc };
            self.best = Some(best.clone());
            Some(best)
        } else {
            None
        }
    }

    pub fn into_best(self) -> Option<BestRecord> {
        self.best
    }
}

/// Scientific notation with a signed two-digit exponent, e.g. `1.00000e-01`.
pub fn format_lr(lr: f64) -> String {
    let raw = format!("{:.5e}", lr);
    match raw.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => raw,
        },
        None => raw,
    }
}

/// Owns everything a training run needs except the model itself,
/// which is threaded through by value.
pub struct Learner<B: AutodiffBackend, M, O> {
    optim:        O,
    scheduler:    MultiStepLr,
    checkpoint:   CheckpointManager,
    metrics:      MetricsLogger,
    epochs:       usize,
    log_interval: usize,
    device:       B::Device,

    // ── Run records ───────────────────────────────────────────────────────────
    test_acc_all: Vec<f64>,
    best:         BestTracker,

    _model: PhantomData<M>,
}

impl<B, M, O> Learner<B, M, O>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + ImageClassifier<B>,
    M::InnerModule: ImageClassifier<B::InnerBackend>,
    O: Optimizer<M, B>,
{
    pub fn new(
        optim:      O,
        scheduler:  MultiStepLr,
        checkpoint: CheckpointManager,
        metrics:    MetricsLogger,
        cfg:        &TrainConfig,
        device:     B::Device,
    ) -> Self {
        Self {
            optim,
            scheduler,
            checkpoint,
            metrics,
            epochs:       cfg.epochs,
            log_interval: cfg.log_interval.max(1),
            device,
            test_acc_all: Vec::with_capacity(cfg.epochs),
            best:         BestTracker::default(),
            _model:       PhantomData,
        }
    }

    /// Best test accuracy so far (0 before any checkpoint is saved).
    pub fn best_acc(&self) -> f64 {
        self.best.best_acc()
    }

    /// Run all epochs and return the per-epoch test accuracy history.
    pub fn train(
        mut self,
        mut model:         M,
        train_loader:      Arc<dyn DataLoader<ImageBatch<B>>>,
        test_loader:       Arc<dyn DataLoader<ImageBatch<B::InnerBackend>>>,
        num_train_batches: usize,
    ) -> Result<TrainSummary> {
        let progress = ProgressBar::new(self.epochs as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} epochs {msg}")?
                .progress_chars("#>-"),
        );

        for epoch in 0..self.epochs {
            let lr = self.scheduler.current_lr();
            tracing::info!("current lr {}", format_lr(lr));

            let (trained, losses, train_acc) =
                self.train_step(model, train_loader.as_ref(), epoch, lr, num_train_batches);
            model = trained;

            let test_acc = self.validate(&model.valid(), test_loader.as_ref(), epoch);
            self.test_acc_all.push(test_acc);
            self.scheduler.step();

            let row = EpochMetrics {
                epoch: epoch + 1,
                lr,
                train_loss: losses.avg,
                train_acc: train_acc.avg,
                test_acc,
            };
            self.metrics.log(&row)?;

            if let Some(best) = self.best.observe(epoch + 1, test_acc) {
                self.checkpoint.save_best::<B, M>(&model, &best)?;
                tracing::info!("New best Prec@1 {:.3} at epoch {}", best.test_acc, best.epoch);
            }

            progress.set_message(format!("best {:.2}%", self.best_acc()));
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(TrainSummary { test_acc_all: self.test_acc_all, best: self.best.into_best() })
    }

    /// One pass over the training set. Returns the updated model and the
    /// loss / Prec@1 meters for the epoch.
    pub fn train_step(
        &mut self,
        mut model:   M,
        loader:      &dyn DataLoader<ImageBatch<B>>,
        epoch:       usize,
        lr:          f64,
        num_batches: usize,
    ) -> (M, AverageMeter, AverageMeter) {
        let criterion    = CrossEntropyLossConfig::new().init(&self.device);
        let mut losses   = AverageMeter::new();
        let mut top1_acc = AverageMeter::new();

        for (i, batch) in loader.iter().enumerate() {
            let batch_size = batch.targets.dims()[0];

            // ── Forward ───────────────────────────────────────────────────────
            let logits = model.forward(batch.images);
            let loss   = criterion.forward(logits.clone(), batch.targets.clone());

            // ── Backward + SGD step ───────────────────────────────────────────
            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = self.optim.step(lr, model, grads);

            // ── Meters ────────────────────────────────────────────────────────
            losses.update(loss_val, batch_size);
            top1_acc.update(precision_at_1(logits.detach(), batch.targets), batch_size);

            if i % self.log_interval == 0 {
                tracing::info!(
                    "Epoch: [{}][{}/{}]\tLoss {:.4}\tPrec@1 {:.3}",
                    epoch, i, num_batches, losses.avg, top1_acc.avg,
                );
            }
        }

        (model, losses, top1_acc)
    }

    /// Prec@1 of the eval-mode model over the test set.
    pub fn validate(
        &self,
        model:  &M::InnerModule,
        loader: &dyn DataLoader<ImageBatch<B::InnerBackend>>,
        epoch:  usize,
    ) -> f64 {
        let top1_acc = validate_model(model, loader);
        tracing::info!("Epoch[{}] *Validation*: Prec@1 {:.3}", epoch, top1_acc.avg);
        top1_acc.avg
    }
}
