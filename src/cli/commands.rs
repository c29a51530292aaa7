// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Two subcommands:
//   train    - fit a ResNet to CIFAR-10/100, keep the best model
//   evaluate - re-score the best checkpoint of a finished run

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::{
    architecture::{Architecture, ShortcutKind},
    task::Task,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a ResNet on CIFAR-10 or CIFAR-100
    Train(TrainArgs),

    /// Evaluate the best checkpoint of a previous training run
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Dataset to train on
    #[arg(long, value_enum, default_value_t = Task::Cifar10)]
    pub task: Task,

    /// Network to build
    #[arg(long = "arch", value_enum, default_value_t = Architecture::Resnet110)]
    pub architecture: Architecture,

    /// Shortcut used when a block changes resolution or width
    #[arg(long, value_enum, default_value_t = ShortcutKind::A)]
    pub shortcut: ShortcutKind,

    /// Directory holding the extracted CIFAR binary archives
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Where the best model, run config and metrics CSV are written
    #[arg(long, default_value = "res")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    /// 64 follows the "Rethinking" schedule; the ResNet paper used 128
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Initial learning rate
    #[arg(long, default_value_t = 0.1)]
    pub lr: f64,

    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    #[arg(long, default_value_t = 1e-4)]
    pub weight_decay: f64,

    /// Epochs at which the learning rate is multiplied by --gamma
    #[arg(long, value_delimiter = ',', default_values_t = [100, 150])]
    pub milestones: Vec<usize>,

    #[arg(long, default_value_t = 0.1)]
    pub gamma: f64,

    /// Dropout probability inside IC layers (only used by *_ic models)
    #[arg(long, default_value_t = 0.5)]
    pub ic_dropout: f64,

    /// Seed for weight init and data shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Data loader worker threads per split
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    /// Log running loss / Prec@1 every N batches
    #[arg(long, default_value_t = 100)]
    pub log_interval: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            task:           a.task,
            architecture:   a.architecture,
            shortcut:       a.shortcut,
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            momentum:       a.momentum,
            weight_decay:   a.weight_decay,
            milestones:     a.milestones,
            gamma:          a.gamma,
            ic_dropout:     a.ic_dropout,
            seed:           a.seed,
            num_workers:    a.num_workers,
            log_interval:   a.log_interval,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, value_enum)]
    pub task: Task,

    #[arg(long = "arch", value_enum)]
    pub architecture: Architecture,

    /// Directory the training run wrote its checkpoint to
    #[arg(long, default_value = "res")]
    pub checkpoint_dir: String,

    /// Override the data directory recorded in the run config
    #[arg(long)]
    pub data_dir: Option<String>,
}
