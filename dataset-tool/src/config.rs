//! Tool configuration format.

use anyhow::Result;
use coco_dataset::DatasetConfig;
use schedule_config::{ScheduleConfig, SchedulePreset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The datasets and the schedule of a training setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub train_dataset: DatasetConfig,
    #[serde(default)]
    pub val_dataset: Option<DatasetConfig>,
    #[serde(default)]
    pub test_dataset: Option<DatasetConfig>,
    pub schedule: ScheduleSource,
}

impl Config {
    /// Read the config. Relative dataset paths are resolved against the
    /// directory of the config file, the same as schedule files.
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = json5::from_str(&text)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.train_dataset.rebase(base_dir);
        config
            .val_dataset
            .iter_mut()
            .chain(config.test_dataset.iter_mut())
            .for_each(|dataset| dataset.rebase(base_dir));

        Ok(config)
    }

    pub fn dataset(&self, split: Split) -> Option<&DatasetConfig> {
        match split {
            Split::Train => Some(&self.train_dataset),
            Split::Val => self.val_dataset.as_ref(),
            Split::Test => self.test_dataset.as_ref(),
        }
    }
}

/// Where the training schedule comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleSource {
    Preset { preset: SchedulePreset },
    File { schedule_file: PathBuf },
    Inline(ScheduleConfig),
}

impl ScheduleSource {
    /// Resolve the schedule. Relative files are looked up from `base_dir`.
    pub fn load(&self, base_dir: &Path) -> Result<ScheduleConfig> {
        let schedule = match self {
            Self::Preset { preset } => preset.build(),
            Self::File { schedule_file } => ScheduleConfig::open(base_dir.join(schedule_file))?,
            Self::Inline(schedule) => {
                schedule.validate()?;
                schedule.clone()
            }
        };
        Ok(schedule)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ArgEnum)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Val => "val",
            Self::Test => "test",
        }
    }
}
