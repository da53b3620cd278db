//! Annotation stores the loader reads from.

mod coco;
mod types;

pub use coco::*;
pub use types::*;

use crate::common::*;

/// Identifier of an image, annotation or category in an annotation file.
///
/// COCO files use non-negative integers, but other producers write negative
/// or fractional numbers and strings. All of them are treated as opaque keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectId {
    Num(u64),
    Int(i64),
    Float(R64),
    Str(String),
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(id) => write!(f, "{}", id),
            Self::Int(id) => write!(f, "{}", id),
            Self::Float(id) => write!(f, "{}", id),
            Self::Str(id) => write!(f, "{}", id),
        }
    }
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        Self::Num(id)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_owned())
    }
}

/// The parsed view of an annotation file.
pub trait DatasetSource {
    /// The name used to refer to the source in logs and errors.
    fn name(&self) -> &str;

    /// Image ids in listing order.
    fn image_ids(&self) -> Vec<ObjectId>;

    fn image(&self, id: &ObjectId) -> Option<&CocoImage>;

    /// Annotations owned by an image, in file order.
    fn annotations_of(&self, id: &ObjectId) -> Vec<&CocoAnnotation>;

    /// Ids of the categories carrying the given name.
    fn category_ids_by_name(&self, name: &str) -> Vec<ObjectId>;

    /// Names of all categories in the source.
    fn category_names(&self) -> Vec<&str>;

    /// Images annotated with the category, once per annotation.
    fn images_of_category(&self, id: &ObjectId) -> &[ObjectId];
}
