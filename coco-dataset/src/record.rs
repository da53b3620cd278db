use crate::{
    category::CategoryMap,
    common::*,
    source::{ObjectId, Segmentation},
    vocabulary::ClassVocabulary,
};

/// One kept annotation of an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedInstance {
    /// Box corners in pixels, serialized as `[x1, y1, x2, y2]`.
    #[serde(serialize_with = "serialize_xyxy")]
    pub bbox: TLBR<f64>,
    pub bbox_label: usize,
    /// 1 for crowd regions, 0 otherwise.
    pub ignore_flag: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<Segmentation>,
}

impl NormalizedInstance {
    /// Box corners as `[x1, y1, x2, y2]`.
    pub fn bbox_xyxy(&self) -> [f64; 4] {
        self.bbox.xyxy()
    }
}

/// The class names attached to records for open-vocabulary matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassText {
    pub text: Arc<[String]>,
    pub custom_entities: bool,
}

/// The record of an image with its paths and kept instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedImageRecord {
    pub img_id: ObjectId,
    pub img_path: PathBuf,
    pub seg_map_path: Option<PathBuf>,
    pub height: usize,
    pub width: usize,
    pub instances: Vec<NormalizedInstance>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub class_text: Option<ClassText>,
}

impl NormalizedImageRecord {
    pub fn size(&self) -> HW<usize> {
        HW::from_hw([self.height, self.width])
    }

    pub fn has_instances(&self) -> bool {
        !self.instances.is_empty()
    }
}

/// The output of one load pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// The annotation source the records came from.
    pub name: String,
    pub classes: Arc<ClassVocabulary>,
    pub category_map: CategoryMap,
    /// Images annotated with each resolved category.
    pub category_images: HashMap<ObjectId, Vec<ObjectId>>,
    pub records: Vec<Arc<NormalizedImageRecord>>,
}

impl Dataset {
    pub fn records(&self) -> &[Arc<NormalizedImageRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn num_instances(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.instances.len())
            .sum()
    }
}

fn serialize_xyxy<S>(bbox: &TLBR<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    bbox.xyxy().serialize(serializer)
}
