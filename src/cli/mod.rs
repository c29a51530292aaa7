// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to a use case.
// This layer only prints results; it never computes them.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "resnet-ic",
    version,
    about = "Train CIFAR ResNet-110/164 models, with or without IC layers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        let summary = TrainUseCase::new(args.into()).execute()?;

        if let Some(last) = summary.test_acc_all.last() {
            println!("Final epoch Prec@1 {:.3}% after {} epochs.", last, summary.test_acc_all.len());
        }

        match summary.best {
            Some(best) => println!(
                "Training complete. Best Prec@1 {:.3}% at epoch {}.",
                best.test_acc, best.epoch
            ),
            None => println!("Training complete. No epoch scored above 0%, nothing saved."),
        }
        Ok(())
    }

    fn run_evaluate(args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let report = EvaluateUseCase::new(
            args.checkpoint_dir,
            args.data_dir,
            args.task,
            args.architecture,
        )
        .execute()?;

        println!(
            "{}: Prec@1 {:.3}% (recorded {:.3}% at epoch {})",
            report.run, report.test_acc, report.recorded.test_acc, report.recorded.epoch,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::domain::architecture::Architecture;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["resnet-ic", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.milestones, vec![100, 150]);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.checkpoint_dir, "res");
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "resnet-ic", "train", "--task", "cifar100", "--arch", "resnet164_ic",
            "--milestones", "80,120", "--shortcut", "b",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(args.architecture, Architecture::Resnet164Ic);
        assert_eq!(args.milestones, vec![80, 120]);
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        assert!(Cli::try_parse_from(["resnet-ic", "train", "--task", "mnist"]).is_err());
    }
}
