use super::ObjectId;
use crate::common::*;

/// The top level of a COCO annotation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoFile {
    #[serde(default)]
    pub images: Vec<CocoImage>,
    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: ObjectId,
    pub file_name: String,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: ObjectId,
    pub image_id: ObjectId,
    pub bbox: XYWH<f64>,
    pub area: f64,
    pub category_id: ObjectId,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub iscrowd: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub ignore: bool,
    #[serde(default)]
    pub segmentation: Option<Segmentation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub supercategory: Option<String>,
}

/// Instance mask payload, kept as it appears in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    /// Flat `[x, y, x, y, ...]` lists, one per polygon.
    Polygons(Vec<Vec<f64>>),
    Rle { size: [usize; 2], counts: RleCounts },
    /// Any other payload, passed through untouched.
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RleCounts {
    Compressed(String),
    Uncompressed(Vec<u64>),
}

impl Segmentation {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Polygons(polygons) => polygons.is_empty(),
            Self::Rle { counts, .. } => match counts {
                RleCounts::Compressed(counts) => counts.is_empty(),
                RleCounts::Uncompressed(counts) => counts.is_empty(),
            },
            Self::Other(value) => is_falsy(value),
        }
    }
}

/// Null, `false`, zero and empty strings, lists or objects.
fn is_falsy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(num) => num.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(array) => array.is_empty(),
        Value::Object(object) => object.is_empty(),
    }
}

/// Accepts `true`/`false` as well as the `0`/`1` integers COCO writes.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    let flag = Option::<Flag>::deserialize(deserializer)?;
    Ok(match flag {
        Some(Flag::Bool(flag)) => flag,
        Some(Flag::Int(flag)) => flag != 0,
        None => false,
    })
}
