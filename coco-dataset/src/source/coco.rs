use super::{CocoAnnotation, CocoCategory, CocoFile, CocoImage, DatasetSource, ObjectId};
use crate::{common::*, error::LoadError};

/// An indexed COCO annotation file.
///
/// Images keep the order of the file. A repeated image id replaces the
/// earlier entry in place.
#[derive(Debug, Clone)]
pub struct CocoStore {
    name: String,
    images: IndexMap<ObjectId, CocoImage>,
    annotations: Vec<CocoAnnotation>,
    categories: Vec<CocoCategory>,
    image_to_annotations: HashMap<ObjectId, Vec<usize>>,
    category_to_images: HashMap<ObjectId, Vec<ObjectId>>,
}

impl CocoStore {
    /// Read and index the annotation file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_reader(path.display().to_string(), BufReader::new(file))
    }

    pub fn from_reader(name: impl Into<String>, reader: impl Read) -> Result<Self> {
        let name = name.into();
        let file: CocoFile = match serde_json::from_reader(reader) {
            Ok(file) => file,
            Err(source) => return Err(LoadError::Parse { name, source }.into()),
        };
        Ok(Self::from_file(name, file))
    }

    pub fn from_json_str(name: impl Into<String>, text: &str) -> Result<Self> {
        Self::from_reader(name, text.as_bytes())
    }

    pub fn from_file(name: impl Into<String>, file: CocoFile) -> Self {
        let CocoFile {
            images,
            annotations,
            categories,
        } = file;

        let images: IndexMap<_, _> = images
            .into_iter()
            .map(|image| (image.id.clone(), image))
            .collect();

        let mut image_to_annotations: HashMap<ObjectId, Vec<usize>> = HashMap::new();
        let mut category_to_images: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();

        annotations.iter().enumerate().for_each(|(index, ann)| {
            image_to_annotations
                .entry(ann.image_id.clone())
                .or_default()
                .push(index);
            category_to_images
                .entry(ann.category_id.clone())
                .or_default()
                .push(ann.image_id.clone());
        });

        let store = Self {
            name: name.into(),
            images,
            annotations,
            categories,
            image_to_annotations,
            category_to_images,
        };

        debug!(
            "indexed '{}': {} images, {} annotations, {} categories",
            store.name,
            store.images.len(),
            store.annotations.len(),
            store.categories.len()
        );

        store
    }

    pub fn num_annotations(&self) -> usize {
        self.annotations.len()
    }
}

impl DatasetSource for CocoStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn image_ids(&self) -> Vec<ObjectId> {
        self.images.keys().cloned().collect()
    }

    fn image(&self, id: &ObjectId) -> Option<&CocoImage> {
        self.images.get(id)
    }

    fn annotations_of(&self, id: &ObjectId) -> Vec<&CocoAnnotation> {
        self.image_to_annotations
            .get(id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&index| &self.annotations[index])
                    .collect()
            })
            .unwrap_or_default()
    }

    fn category_ids_by_name(&self, name: &str) -> Vec<ObjectId> {
        self.categories
            .iter()
            .filter(|cat| cat.name == name)
            .map(|cat| cat.id.clone())
            .collect()
    }

    fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|cat| cat.name.as_str()).collect()
    }

    fn images_of_category(&self, id: &ObjectId) -> &[ObjectId] {
        self.category_to_images
            .get(id)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }
}
