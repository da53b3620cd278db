use crate::{common::*, record::Dataset, source::ObjectId};

/// Image filtering options applied after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Drop images without any instance of the vocabulary.
    #[serde(default)]
    pub filter_empty_gt: bool,
    /// The minimum length of the shorter image side in pixels.
    #[serde(default = "default_min_size")]
    pub min_size: R64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_empty_gt: false,
            min_size: default_min_size(),
        }
    }
}

fn default_min_size() -> R64 {
    r64(0.0)
}

/// Drop whole images by emptiness or size. The order of kept records is
/// preserved.
///
/// Filtering only happens in training, so the dataset is returned unchanged
/// in test mode or without a filter config.
pub fn filter_dataset(
    dataset: Dataset,
    filter_cfg: Option<&FilterConfig>,
    test_mode: bool,
) -> Dataset {
    let filter_cfg = match filter_cfg {
        Some(filter_cfg) if !test_mode => filter_cfg,
        _ => return dataset,
    };
    let FilterConfig {
        filter_empty_gt,
        min_size,
    } = *filter_cfg;

    let ids_with_ann: HashSet<&ObjectId> = dataset
        .records
        .iter()
        .filter(|record| record.has_instances())
        .map(|record| &record.img_id)
        .collect();
    let ids_in_cat: HashSet<&ObjectId> = dataset
        .category_map
        .cat_ids()
        .iter()
        .filter_map(|cat_id| dataset.category_images.get(cat_id))
        .flatten()
        .filter(|img_id| ids_with_ann.contains(img_id))
        .collect();

    let num_images = dataset.records.len();
    let records: Vec<_> = dataset
        .records
        .iter()
        .filter(|record| !filter_empty_gt || ids_in_cat.contains(&record.img_id))
        .filter(|record| r64(record.size().min_side() as f64) >= min_size)
        .cloned()
        .collect();

    info!(
        "filtered '{}': {} of {} images kept",
        dataset.name,
        records.len(),
        num_images
    );

    Dataset {
        records,
        ..dataset
    }
}
