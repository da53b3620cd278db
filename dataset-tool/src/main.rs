mod config;

use anyhow::{format_err, Context, Result};
use clap::Parser;
use coco_dataset::{ClassVocabulary, Dataset, VocabularyPreset};
use config::{Config, Split};
use itertools::Itertools;
use prettytable::{cell, row, Table};
use schedule_config::{OptimizerConfig, ParamScheduler, ScheduleConfig, TrainLoopConfig};
use std::{
    env,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
/// Inspect COCO-style datasets and training schedules
enum Opts {
    /// Load and filter a dataset split
    Load {
        /// configuration file
        config_file: PathBuf,
        #[clap(long, arg_enum, default_value = "train")]
        /// dataset split
        split: Split,
        #[clap(long)]
        /// write the records to this JSON file
        output: Option<PathBuf>,
    },
    /// Validate and print the training schedule
    Schedule {
        /// configuration file
        config_file: PathBuf,
    },
    /// Print a class vocabulary
    Classes {
        #[clap(long, default_value = "furniture4")]
        /// vocabulary preset
        preset: VocabularyPreset,
    },
}

fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    match Opts::parse() {
        Opts::Load {
            config_file,
            split,
            output,
        } => {
            load(config_file, split, output)?;
        }
        Opts::Schedule { config_file } => {
            schedule(config_file)?;
        }
        Opts::Classes { preset } => {
            classes(preset);
        }
    }

    Ok(())
}

fn open_config(config_file: &Path) -> Result<Config> {
    Config::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))
}

fn load(config_file: impl AsRef<Path>, split: Split, output: Option<PathBuf>) -> Result<()> {
    let config = open_config(config_file.as_ref())?;
    let dataset_config = config
        .dataset(split)
        .ok_or_else(|| format_err!("the '{}' split is not configured", split.as_str()))?;
    let dataset = dataset_config
        .build()
        .with_context(|| format!("failed to load the '{}' split", split.as_str()))?;

    print_dataset_summary(&dataset, split);

    if let Some(output) = output {
        let writer = BufWriter::new(File::create(&output)?);
        serde_json::to_writer_pretty(writer, dataset.records())?;
        info!("records written to '{}'", output.display());
    }

    Ok(())
}

fn print_dataset_summary(dataset: &Dataset, split: Split) {
    let num_crowd = dataset
        .records()
        .iter()
        .flat_map(|record| &record.instances)
        .filter(|instance| instance.ignore_flag != 0)
        .count();

    {
        let mut table = Table::new();
        table.add_row(row!["split", "source", "images", "instances", "crowd"]);
        table.add_row(row![
            split.as_str(),
            dataset.name,
            dataset.len(),
            dataset.num_instances(),
            num_crowd
        ]);
        table.printstd();
    }

    // per-class instance counts
    {
        let counts = dataset
            .records()
            .iter()
            .flat_map(|record| &record.instances)
            .map(|instance| instance.bbox_label)
            .counts();

        let mut table = Table::new();
        table.add_row(row!["label", "class", "instances"]);
        counts
            .into_iter()
            .sorted()
            .for_each(|(label, count)| {
                let name = dataset.classes.name_of(label).unwrap_or("?");
                table.add_row(row![label, name, count]);
            });
        table.printstd();
    }
}

fn schedule(config_file: impl AsRef<Path>) -> Result<()> {
    let config_file = config_file.as_ref();
    let config = open_config(config_file)?;
    let base_dir = config_file.parent().unwrap_or_else(|| Path::new("."));
    let schedule = config.schedule.load(base_dir)?;

    print_schedule(&schedule);
    Ok(())
}

fn print_schedule(schedule: &ScheduleConfig) {
    // training loop
    {
        let mut table = Table::new();
        table.add_row(row!["loop", "length", "val_interval", "val_begin"]);
        match schedule.train_cfg {
            TrainLoopConfig::EpochBasedTrainLoop {
                max_epochs,
                val_interval,
                val_begin,
            } => {
                table.add_row(row![
                    "EpochBasedTrainLoop",
                    format!("{} epochs", max_epochs),
                    val_interval,
                    val_begin
                ]);
            }
            TrainLoopConfig::IterBasedTrainLoop {
                max_iters,
                val_interval,
                val_begin,
            } => {
                table.add_row(row![
                    "IterBasedTrainLoop",
                    format!("{} iters", max_iters),
                    val_interval,
                    val_begin
                ]);
            }
        }
        table.printstd();
    }

    // learning rate schedulers
    {
        let mut table = Table::new();
        table.add_row(row!["scheduler", "by_epoch", "begin", "end", "params"]);
        schedule.param_scheduler.iter().for_each(|scheduler| {
            let (begin, end) = scheduler.range();
            let params = match scheduler {
                ParamScheduler::Linear { start_factor, .. } => {
                    format!("start_factor={}", start_factor)
                }
                ParamScheduler::MultiStep {
                    milestones, gamma, ..
                } => format!("milestones={:?} gamma={}", milestones, gamma),
            };
            table.add_row(row![
                scheduler.name(),
                scheduler.by_epoch(),
                begin,
                end,
                params
            ]);
        });
        table.printstd();
    }

    // optimizer
    {
        let optim = &schedule.optim_wrapper;
        let momentum = match optim.optimizer {
            OptimizerConfig::Sgd { momentum, .. } => format!("{}", momentum),
            OptimizerConfig::Adam { .. } => "-".to_string(),
        };
        let clip_grad = optim
            .clip_grad
            .map(|clip| format!("max_norm={} norm_type={}", clip.max_norm, clip.norm_type))
            .unwrap_or_else(|| "-".to_string());

        let mut table = Table::new();
        table.add_row(row![
            "wrapper",
            "optimizer",
            "lr",
            "momentum",
            "weight_decay",
            "clip_grad"
        ]);
        table.add_row(row![
            format!("{:?}", optim.kind),
            optim.optimizer.name(),
            optim.optimizer.lr(),
            momentum,
            optim.optimizer.weight_decay(),
            clip_grad
        ]);
        table.printstd();
    }

    let auto_scale = &schedule.auto_scale_lr;
    if auto_scale.enable {
        println!(
            "lr is scaled linearly from base batch size {}",
            auto_scale.base_batch_size
        );
    }

    let epochs = schedule.validation_epochs();
    if epochs.is_empty() {
        println!("validation: disabled");
    } else {
        println!("validation: {}", epochs.iter().join(", "));
    }
}

fn classes(preset: VocabularyPreset) {
    let vocabulary = ClassVocabulary::from_preset(preset);

    let mut table = Table::new();
    table.add_row(row!["label", "class", "color"]);
    vocabulary
        .classes()
        .iter()
        .zip(vocabulary.palette())
        .enumerate()
        .for_each(|(label, (name, color))| {
            table.add_row(row![
                label,
                name,
                format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
            ]);
        });
    table.printstd();
}
