use crate::{
    common::*,
    source::{DatasetSource, ObjectId},
    vocabulary::ClassVocabulary,
};

/// Maps category ids of an annotation source to label indices.
///
/// The label of a category is the position of its name in the class
/// vocabulary. Categories whose names are not in the vocabulary are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    cat_ids: Vec<ObjectId>,
    cat2label: HashMap<ObjectId, usize>,
}

impl CategoryMap {
    pub fn new<S>(source: &S, classes: &ClassVocabulary) -> Self
    where
        S: DatasetSource + ?Sized,
    {
        let mut cat_ids = vec![];
        let mut cat2label = HashMap::new();
        let mut missing_classes = vec![];

        for (label, name) in classes.classes().iter().enumerate() {
            let ids = source.category_ids_by_name(name);
            if ids.is_empty() {
                missing_classes.push(name.as_str());
            }

            for id in ids {
                if cat2label.contains_key(&id) {
                    continue;
                }
                cat2label.insert(id.clone(), label);
                cat_ids.push(id);
            }
        }

        if !missing_classes.is_empty() {
            warn!(
                "these classes are not defined in '{}': {:?}",
                source.name(),
                missing_classes
            );
        }

        let uncovered_categories: Vec<_> = source
            .category_names()
            .into_iter()
            .filter(|name| classes.index_of(name).is_none())
            .collect();
        if !uncovered_categories.is_empty() {
            debug!(
                "annotations of these categories in '{}' will be dropped: {:?}",
                source.name(),
                uncovered_categories
            );
        }

        Self { cat_ids, cat2label }
    }

    /// The resolved category ids, in vocabulary order.
    pub fn cat_ids(&self) -> &[ObjectId] {
        &self.cat_ids
    }

    pub fn label_of(&self, id: &ObjectId) -> Option<usize> {
        self.cat2label.get(id).copied()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.cat2label.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cat_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cat_ids.is_empty()
    }
}
