use crate::{
    category::CategoryMap,
    common::*,
    error::LoadError,
    record::{ClassText, Dataset, NormalizedImageRecord, NormalizedInstance},
    source::{CocoAnnotation, CocoImage, DatasetSource},
    vocabulary::ClassVocabulary,
};

/// Directories that image and segmentation map paths are resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataPrefix {
    /// The image directory.
    #[serde(default)]
    pub img: PathBuf,
    /// The segmentation map directory.
    #[serde(default)]
    pub seg: Option<PathBuf>,
}

/// Options of a load pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub data_prefix: DataPrefix,
    /// Appended to the image file stem to name the segmentation map.
    pub seg_map_suffix: String,
    /// Attach the class names to every record.
    pub return_classes: bool,
    /// Fail when an annotation id appears more than once.
    pub ann_id_unique: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            data_prefix: DataPrefix::default(),
            seg_map_suffix: ".png".into(),
            return_classes: false,
            ann_id_unique: true,
        }
    }
}

/// Convert every image of `source` into a normalized record.
///
/// The source is consumed and dropped when the pass finishes.
pub fn load_dataset<S>(
    source: S,
    classes: Arc<ClassVocabulary>,
    options: &LoadOptions,
) -> Result<Dataset>
where
    S: DatasetSource,
{
    let name = source.name().to_owned();
    let category_map = CategoryMap::new(&source, &classes);
    let category_images: HashMap<_, _> = category_map
        .cat_ids()
        .iter()
        .map(|cat_id| (cat_id.clone(), source.images_of_category(cat_id).to_vec()))
        .collect();
    let class_text = options.return_classes.then(|| ClassText {
        text: classes.classes().iter().cloned().collect(),
        custom_entities: true,
    });

    let mut total_ann_ids = vec![];
    let records: Vec<_> = source
        .image_ids()
        .into_iter()
        .map(|img_id| -> Result<_> {
            let image = source
                .image(&img_id)
                .ok_or_else(|| format_err!("image '{}' is listed but not found", img_id))?;
            let annotations = source.annotations_of(&img_id);
            total_ann_ids.extend(annotations.iter().map(|ann| ann.id.clone()));

            let record = parse_image(
                image,
                &annotations,
                &category_map,
                class_text.as_ref(),
                options,
            );
            Ok(Arc::new(record))
        })
        .try_collect()?;

    if options.ann_id_unique {
        let unique_ids: HashSet<_> = total_ann_ids.iter().collect();
        if unique_ids.len() != total_ann_ids.len() {
            return Err(LoadError::DuplicateAnnotationIds { name }.into());
        }
    }

    drop(source);

    let dataset = Dataset {
        name,
        classes,
        category_map,
        category_images,
        records,
    };

    info!(
        "loaded '{}': {} images, {} of {} annotations kept",
        dataset.name,
        dataset.len(),
        dataset.num_instances(),
        total_ann_ids.len()
    );

    Ok(dataset)
}

/// Build the record of one image.
pub fn parse_image(
    image: &CocoImage,
    annotations: &[&CocoAnnotation],
    category_map: &CategoryMap,
    class_text: Option<&ClassText>,
    options: &LoadOptions,
) -> NormalizedImageRecord {
    let CocoImage {
        ref id,
        ref file_name,
        width,
        height,
    } = *image;
    let DataPrefix {
        img: ref img_prefix,
        seg: ref seg_prefix,
    } = options.data_prefix;

    let img_path = img_prefix.join(file_name);
    let seg_map_path = seg_prefix
        .as_ref()
        .filter(|prefix| !prefix.as_os_str().is_empty())
        .map(|prefix| {
            let stem = file_name
                .rsplit_once('.')
                .map(|(stem, _ext)| stem)
                .unwrap_or(file_name);
            prefix.join(format!("{}{}", stem, options.seg_map_suffix))
        });

    let size: HW<f64> = HW::from_hw([height, width]).cast();
    let instances: Vec<_> = annotations
        .iter()
        .filter_map(|ann| convert_annotation(ann, &size, category_map))
        .collect();

    NormalizedImageRecord {
        img_id: id.clone(),
        img_path,
        seg_map_path,
        height,
        width,
        instances,
        class_text: class_text.cloned(),
    }
}

/// Convert one annotation, or return `None` if it is dropped.
///
/// The box must overlap the image, but the kept box is the declared one,
/// not the clipped overlap.
pub fn convert_annotation(
    ann: &CocoAnnotation,
    size: &HW<f64>,
    category_map: &CategoryMap,
) -> Option<NormalizedInstance> {
    if ann.ignore {
        debug!("drop annotation {}: marked as ignored", ann.id);
        return None;
    }

    if ann.bbox.overlap_area_within(size) <= 0.0 {
        debug!("drop annotation {}: box lies outside the image", ann.id);
        return None;
    }

    let XYWH { w, h, .. } = ann.bbox;
    if ann.area <= 0.0 || w < 1.0 || h < 1.0 {
        debug!(
            "drop annotation {}: degenerate box (area={}, w={}, h={})",
            ann.id, ann.area, w, h
        );
        return None;
    }

    let bbox_label = match category_map.label_of(&ann.category_id) {
        Some(label) => label,
        None => {
            debug!(
                "drop annotation {}: category {} is not in the vocabulary",
                ann.id, ann.category_id
            );
            return None;
        }
    };
    let bbox = ann.bbox.try_to_tlbr().ok()?;

    Some(NormalizedInstance {
        bbox,
        bbox_label,
        ignore_flag: ann.iscrowd as u8,
        mask: ann
            .segmentation
            .as_ref()
            .filter(|segmentation| !segmentation.is_empty())
            .cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{CocoStore, ObjectId, Segmentation};
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn sample_store(annotations: serde_json::Value) -> CocoStore {
        let file = json!({
            "images": [
                {"id": 1, "file_name": "scene/0001.jpg", "width": 100, "height": 100},
                {"id": 2, "file_name": "scene/0002.rgb.jpg", "width": 200, "height": 50}
            ],
            "annotations": annotations,
            "categories": [
                {"id": 5, "name": "Sofa0"},
                {"id": 3, "name": "Chair0"},
                {"id": 9, "name": "Plant"}
            ]
        });
        CocoStore::from_json_str("sample.json", &file.to_string()).unwrap()
    }

    fn vocabulary() -> Arc<ClassVocabulary> {
        Arc::new(ClassVocabulary::new(["Floor", "Chair0", "Sofa0"], None).unwrap())
    }

    fn ann(id: u64, image_id: u64, bbox: [f64; 4], category_id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "image_id": image_id,
            "bbox": bbox,
            "area": bbox[2] * bbox[3],
            "category_id": category_id,
            "iscrowd": 0
        })
    }

    fn load(annotations: serde_json::Value, options: &LoadOptions) -> Result<Dataset> {
        load_dataset(sample_store(annotations), vocabulary(), options)
    }

    #[test]
    fn kept_box_is_not_clipped() {
        let dataset = load(
            json!([ann(1, 1, [90.0, 80.0, 30.0, 40.0], 3)]),
            &LoadOptions::default(),
        )
        .unwrap();
        let instance = &dataset.records[0].instances[0];
        assert_eq!(instance.bbox.xyxy(), [90.0, 80.0, 120.0, 120.0]);
        assert_eq!(instance.bbox_label, 1);
        assert_eq!(instance.ignore_flag, 0);
        assert_eq!(instance.mask, None);
    }

    #[test]
    fn fractional_box() {
        let dataset = load(
            json!([ann(1, 2, [-0.5, 10.25, 20.1, 30.3], 5)]),
            &LoadOptions::default(),
        )
        .unwrap();
        let instance = &dataset.records[1].instances[0];
        instance
            .bbox
            .xyxy()
            .iter()
            .zip([-0.5, 10.25, 19.6, 40.55])
            .for_each(|(&lhs, rhs)| assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-9));
    }

    #[test]
    fn labels_follow_vocabulary_positions() {
        let dataset = load(
            json!([
                ann(1, 1, [0.0, 0.0, 10.0, 10.0], 5),
                ann(2, 1, [0.0, 0.0, 10.0, 10.0], 3)
            ]),
            &LoadOptions::default(),
        )
        .unwrap();
        let labels: Vec<_> = dataset.records[0]
            .instances
            .iter()
            .map(|instance| instance.bbox_label)
            .collect();
        assert_eq!(labels, vec![2, 1]);
    }

    #[test]
    fn dropped_annotations() {
        let mut ignored = ann(1, 1, [10.0, 10.0, 10.0, 10.0], 3);
        ignored["ignore"] = json!(true);
        let mut zero_area = ann(2, 1, [10.0, 10.0, 10.0, 10.0], 3);
        zero_area["area"] = json!(0);
        let outside = ann(3, 1, [150.0, 150.0, 10.0, 10.0], 3);
        let thin = ann(4, 1, [10.0, 10.0, 0.0, 5.0], 3);
        let flat = ann(5, 1, [10.0, 10.0, 5.0, 0.5], 3);
        let out_of_vocabulary = ann(6, 1, [10.0, 10.0, 10.0, 10.0], 9);
        let unknown_category = ann(7, 1, [10.0, 10.0, 10.0, 10.0], 42);
        let kept = ann(8, 1, [10.0, 10.0, 10.0, 10.0], 3);

        let dataset = load(
            json!([
                ignored,
                zero_area,
                outside,
                thin,
                flat,
                out_of_vocabulary,
                unknown_category,
                kept
            ]),
            &LoadOptions::default(),
        )
        .unwrap();

        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.records[0].instances.len(), 1);
        assert_eq!(
            dataset.records[0].instances[0].bbox.xyxy(),
            [10.0, 10.0, 20.0, 20.0]
        );
        assert!(dataset.records[1].instances.is_empty());
    }

    #[test]
    fn crowd_and_mask() {
        let mut crowd = ann(1, 2, [0.0, 0.0, 10.0, 10.0], 5);
        crowd["iscrowd"] = json!(1);
        crowd["segmentation"] = json!({"size": [50, 200], "counts": "abc"});
        let mut empty_mask = ann(2, 2, [0.0, 0.0, 10.0, 10.0], 5);
        empty_mask["segmentation"] = json!([]);
        let mut polygon = ann(3, 2, [0.0, 0.0, 10.0, 10.0], 5);
        polygon["segmentation"] = json!([[0, 0, 10, 0, 10, 10]]);

        let dataset = load(json!([crowd, empty_mask, polygon]), &LoadOptions::default()).unwrap();
        let instances = &dataset.records[1].instances;
        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].ignore_flag, 1);
        assert!(matches!(instances[0].mask, Some(Segmentation::Rle { .. })));
        assert_eq!(instances[1].ignore_flag, 0);
        assert_eq!(instances[1].mask, None);
        assert_eq!(
            instances[2].mask,
            Some(Segmentation::Polygons(vec![vec![
                0.0, 0.0, 10.0, 0.0, 10.0, 10.0
            ]]))
        );
    }

    #[test]
    fn loose_mask_payloads() {
        let mut flat = ann(1, 1, [0.0, 0.0, 8.0, 8.0], 3);
        flat["segmentation"] = json!([0, 0, 8, 0, 8, 8]);
        let mut empty_object = ann(2, 1, [0.0, 0.0, 8.0, 8.0], 3);
        empty_object["segmentation"] = json!({});
        let mut empty_string = ann(3, 1, [0.0, 0.0, 8.0, 8.0], 3);
        empty_string["segmentation"] = json!("");
        let mut null_seg = ann(4, 1, [0.0, 0.0, 8.0, 8.0], 3);
        null_seg["segmentation"] = json!(null);

        let dataset = load(
            json!([flat, empty_object, empty_string, null_seg]),
            &LoadOptions::default(),
        )
        .unwrap();
        let instances = &dataset.records[0].instances;
        assert_eq!(instances.len(), 4);
        assert_eq!(
            instances[0].mask,
            Some(Segmentation::Other(json!([0, 0, 8, 0, 8, 8])))
        );
        assert!(instances[1..].iter().all(|instance| instance.mask.is_none()));
    }

    #[test]
    fn negative_and_fractional_ids() {
        let file = json!({
            "images": [{"id": -1, "file_name": "neg.jpg", "width": 50, "height": 50}],
            "annotations": [
                {"id": 1.5, "image_id": -1, "bbox": [0, 0, 8, 8], "area": 64, "category_id": -7}
            ],
            "categories": [{"id": -7, "name": "Chair0"}]
        });
        let store = CocoStore::from_json_str("ids.json", &file.to_string()).unwrap();
        let dataset = load_dataset(store, vocabulary(), &LoadOptions::default()).unwrap();

        assert_eq!(dataset.records[0].img_id, ObjectId::Int(-1));
        assert_eq!(dataset.records[0].instances[0].bbox_label, 1);
    }

    #[test]
    fn image_paths() {
        let options = LoadOptions {
            data_prefix: DataPrefix {
                img: "data/images".into(),
                seg: Some("data/seg".into()),
            },
            ..LoadOptions::default()
        };
        let dataset = load(json!([]), &options).unwrap();

        let first = &dataset.records[0];
        assert_eq!(first.img_id, ObjectId::Num(1));
        assert_eq!(first.img_path, Path::new("data/images/scene/0001.jpg"));
        assert_eq!(
            first.seg_map_path.as_deref(),
            Some(Path::new("data/seg/scene/0001.png"))
        );
        assert_eq!((first.width, first.height), (100, 100));

        let second = &dataset.records[1];
        assert_eq!(
            second.seg_map_path.as_deref(),
            Some(Path::new("data/seg/scene/0002.rgb.png"))
        );
        assert_eq!(first.class_text, None);

        let without_seg = load(json!([]), &LoadOptions::default()).unwrap();
        assert_eq!(without_seg.records[0].seg_map_path, None);
        assert_eq!(
            without_seg.records[0].img_path,
            Path::new("scene/0001.jpg")
        );
    }

    #[test]
    fn return_classes_attaches_vocabulary() {
        let options = LoadOptions {
            return_classes: true,
            ..LoadOptions::default()
        };
        let dataset = load(json!([]), &options).unwrap();
        dataset.records.iter().for_each(|record| {
            let class_text = record.class_text.as_ref().unwrap();
            assert!(class_text.custom_entities);
            assert_eq!(&*class_text.text, &["Floor", "Chair0", "Sofa0"]);
        });
    }

    #[test]
    fn duplicate_annotation_ids() {
        let annotations = json!([
            ann(7, 1, [0.0, 0.0, 10.0, 10.0], 3),
            ann(7, 2, [0.0, 0.0, 10.0, 10.0], 5)
        ]);

        let err = load(annotations.clone(), &LoadOptions::default()).unwrap_err();
        match err.downcast_ref::<LoadError>() {
            Some(LoadError::DuplicateAnnotationIds { name }) => assert_eq!(name, "sample.json"),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.to_string().contains("sample.json"));

        let options = LoadOptions {
            ann_id_unique: false,
            ..LoadOptions::default()
        };
        let dataset = load(annotations, &options).unwrap();
        assert_eq!(dataset.num_instances(), 2);
    }

    #[test]
    fn load_is_deterministic() {
        let annotations = json!([
            ann(1, 1, [0.0, 0.0, 10.0, 10.0], 3),
            ann(2, 2, [5.0, 5.0, 20.0, 20.0], 5),
            ann(3, 2, [1.0, 1.0, 2.0, 2.0], 9)
        ]);
        let first = load(annotations.clone(), &LoadOptions::default()).unwrap();
        let second = load(annotations, &LoadOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn category_images_cover_resolved_categories() {
        let dataset = load(
            json!([
                ann(1, 1, [0.0, 0.0, 10.0, 10.0], 3),
                ann(2, 2, [0.0, 0.0, 10.0, 10.0], 9)
            ]),
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(
            dataset.category_images[&ObjectId::Num(3)],
            vec![ObjectId::Num(1)]
        );
        assert!(dataset.category_images[&ObjectId::Num(5)].is_empty());
        assert!(!dataset.category_images.contains_key(&ObjectId::Num(9)));
    }
}
