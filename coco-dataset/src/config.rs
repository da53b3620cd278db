//! Dataset configuration format.

use crate::{
    common::*,
    filter::{filter_dataset, FilterConfig},
    loader::{load_dataset, DataPrefix, LoadOptions},
    record::Dataset,
    source::CocoStore,
    vocabulary::{ClassVocabulary, Rgb, VocabularyPreset},
};

/// Dataset options, selected by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DatasetConfig {
    /// COCO-style annotation file.
    CocoDataset(CocoDatasetConfig),
}

impl DatasetConfig {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }

    /// Load and filter the dataset.
    pub fn build(&self) -> Result<Dataset> {
        match self {
            Self::CocoDataset(config) => config.build(),
        }
    }

    pub fn test_mode(&self) -> bool {
        match self {
            Self::CocoDataset(config) => config.test_mode,
        }
    }

    /// Resolve relative paths against `base_dir` instead of the working
    /// directory.
    pub fn rebase(&mut self, base_dir: &Path) {
        match self {
            Self::CocoDataset(config) => config.rebase(base_dir),
        }
    }
}

/// Options of a COCO-style dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoDatasetConfig {
    /// Relative `ann_file` and data prefixes are resolved against it.
    #[serde(default)]
    pub data_root: Option<PathBuf>,
    pub ann_file: PathBuf,
    pub classes: ClassesConfig,
    /// Display colors, one per class. Generated when absent.
    #[serde(default)]
    pub palette: Option<Vec<Rgb>>,
    #[serde(default)]
    pub data_prefix: DataPrefix,
    #[serde(default = "default_seg_map_suffix")]
    pub seg_map_suffix: String,
    #[serde(default)]
    pub filter_cfg: Option<FilterConfig>,
    #[serde(default)]
    pub return_classes: bool,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_ann_id_unique")]
    pub ann_id_unique: bool,
    /// If set, keep only this many records after filtering.
    #[serde(default)]
    pub indices: Option<usize>,
}

/// Where the class vocabulary comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassesConfig {
    Preset { preset: VocabularyPreset },
    File { classes_file: PathBuf },
    Inline(Vec<String>),
}

impl CocoDatasetConfig {
    pub fn vocabulary(&self) -> Result<ClassVocabulary> {
        let palette = self.palette.clone();
        let vocabulary = match &self.classes {
            ClassesConfig::Preset { preset } => match palette {
                Some(palette) => ClassVocabulary::new(preset.class_names(), Some(palette))?,
                None => ClassVocabulary::from_preset(*preset),
            },
            ClassesConfig::File { classes_file } => {
                ClassVocabulary::load_classes_file(self.join_root(classes_file), palette)?
            }
            ClassesConfig::Inline(classes) => ClassVocabulary::new(classes.clone(), palette)?,
        };
        Ok(vocabulary)
    }

    /// The annotation file path with `data_root` applied.
    pub fn ann_file(&self) -> PathBuf {
        self.join_root(&self.ann_file)
    }

    /// The data prefixes with `data_root` applied.
    pub fn data_prefix(&self) -> DataPrefix {
        let DataPrefix { img, seg } = &self.data_prefix;
        DataPrefix {
            img: self.join_root(img),
            seg: seg
                .as_ref()
                .filter(|seg| !seg.as_os_str().is_empty())
                .map(|seg| self.join_root(seg)),
        }
    }

    /// Resolve a relative or absent `data_root` against `base_dir`.
    pub fn rebase(&mut self, base_dir: &Path) {
        let data_root = match &self.data_root {
            Some(root) => base_dir.join(root),
            None => base_dir.to_owned(),
        };
        self.data_root = Some(data_root);
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            data_prefix: self.data_prefix(),
            seg_map_suffix: self.seg_map_suffix.clone(),
            return_classes: self.return_classes,
            ann_id_unique: self.ann_id_unique,
        }
    }

    pub fn build(&self) -> Result<Dataset> {
        let classes = Arc::new(self.vocabulary()?);
        let ann_file = self.ann_file();
        let store = CocoStore::open(&ann_file)?;
        let dataset = load_dataset(store, classes, &self.load_options())?;
        let mut dataset = filter_dataset(dataset, self.filter_cfg.as_ref(), self.test_mode);

        if let Some(indices) = self.indices {
            dataset.records.truncate(indices);
        }

        Ok(dataset)
    }

    fn join_root(&self, path: &Path) -> PathBuf {
        match &self.data_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_owned(),
        }
    }
}

fn default_seg_map_suffix() -> String {
    ".png".into()
}

fn default_ann_id_unique() -> bool {
    true
}
