use crate::common::*;

/// Room elements heading every furniture vocabulary.
const ROOM_ELEMENTS: &[&str] = &[
    "Void",
    "Floor",
    "Wall",
    "Door",
    "Ceiling",
    "Decor",
    "Lighting",
    "Furniture",
    "Construction",
    "Miscellaneous",
    "Plumbing",
    "Storage",
    "Customized",
];

/// Furniture families, each expanded into one class per size variant.
const FURNITURE_FAMILIES: &[&str] = &[
    "Cabinet",
    "Table",
    "Sofa",
    "Electronics",
    "Chair",
    "ArmChair",
    "Bed",
    "KidsBed",
    "Stool",
    "Platform",
    "Sideboard",
    "Bathroom",
    "Window",
    "Appliance",
    "DiningTable",
    "DeskCabinet",
    "SingleBed",
    "ClassicChair",
    "CornerSideTable",
    "Shelf",
    "Nightstand",
    "ComputerChair",
    "DressingTable",
    "Desk",
    "DressingChair",
    "Wardrobe",
    "BunkBed",
    "BookcaseCabinet",
    "CafeChair",
    "CoffeTable",
    "KingSizedBed",
    "MultiSeatSofa",
    "SideCabinet",
    "ShoeCabinet",
    "BedSofa",
];

/// A display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Convert from hue, saturation and value, all in `[0, 1]`.
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let hue = hue.rem_euclid(1.0) * 6.0;
        let sector = hue.floor();
        let frac = hue - sector;
        let p = value * (1.0 - saturation);
        let q = value * (1.0 - saturation * frac);
        let t = value * (1.0 - saturation * (1.0 - frac));

        let (r, g, b) = match sector as usize {
            0 => (value, t, p),
            1 => (q, value, p),
            2 => (p, value, t),
            3 => (p, q, value),
            4 => (t, p, value),
            _ => (value, p, q),
        };
        let to_u8 = |channel: f64| (channel * 255.0).round().clamp(0.0, 255.0) as u8;
        Self(to_u8(r), to_u8(g), to_u8(b))
    }
}

/// Generate `len` well separated colors by walking the hue circle with the
/// golden ratio. The output only depends on `len`.
pub fn generate_palette(len: usize) -> Vec<Rgb> {
    const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;
    const SATURATIONS: [f64; 3] = [0.85, 0.65, 0.45];
    const VALUES: [f64; 2] = [0.95, 0.7];

    (0..len)
        .map(|index| {
            let hue = (0.1 + index as f64 * GOLDEN_RATIO_CONJUGATE).fract();
            let saturation = SATURATIONS[index % SATURATIONS.len()];
            let value = VALUES[(index / SATURATIONS.len()) % VALUES.len()];
            Rgb::from_hsv(hue, saturation, value)
        })
        .collect()
}

/// The furniture taxonomies shipped with the project. They differ only in
/// the number of size variants per furniture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyPreset {
    Furniture4,
    Furniture8,
}

impl VocabularyPreset {
    pub fn size_variants(&self) -> usize {
        match self {
            Self::Furniture4 => 4,
            Self::Furniture8 => 8,
        }
    }

    pub fn class_names(&self) -> Vec<String> {
        let variants = self.size_variants();
        let furniture = FURNITURE_FAMILIES.iter().flat_map(|family| {
            (0..variants).map(move |variant| format!("{}{}", family, variant))
        });

        ROOM_ELEMENTS
            .iter()
            .map(|name| name.to_string())
            .chain(furniture)
            .collect()
    }
}

impl FromStr for VocabularyPreset {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let preset = match text {
            "furniture4" => Self::Furniture4,
            "furniture8" => Self::Furniture8,
            _ => bail!(
                "unknown vocabulary preset '{}', expect 'furniture4' or 'furniture8'",
                text
            ),
        };
        Ok(preset)
    }
}

/// The ordered class names and their display colors.
///
/// The position of a name is the label index models see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassVocabulary {
    classes: IndexSet<String>,
    palette: Vec<Rgb>,
}

impl ClassVocabulary {
    /// Build a vocabulary. A palette is generated when none is given.
    pub fn new<I, S>(classes: I, palette: Option<Vec<Rgb>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = classes.into_iter().map(Into::into).collect();
        let classes: IndexSet<String> = names.iter().cloned().collect();
        ensure!(!classes.is_empty(), "the class vocabulary must not be empty");
        ensure!(
            names.len() == classes.len(),
            "duplicated class names found in the class vocabulary"
        );
        ensure!(
            classes.iter().all(|name| !name.is_empty()),
            "class names must not be empty"
        );

        let palette = match palette {
            Some(palette) => {
                if palette.len() != classes.len() {
                    warn!(
                        "the palette has {} colors but there are {} classes",
                        palette.len(),
                        classes.len()
                    );
                }
                palette
            }
            None => generate_palette(classes.len()),
        };

        Ok(Self { classes, palette })
    }

    pub fn from_preset(preset: VocabularyPreset) -> Self {
        let classes: IndexSet<_> = preset.class_names().into_iter().collect();
        let palette = generate_palette(classes.len());
        Self { classes, palette }
    }

    /// Read a classes file with one class name per line.
    pub fn load_classes_file(path: impl AsRef<Path>, palette: Option<Vec<Rgb>>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read classes file '{}'", path.display()))?;
        let lines: Vec<_> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self::new(lines, palette)
            .with_context(|| format!("invalid classes file '{}'", path.display()))
    }

    pub fn classes(&self) -> &IndexSet<String> {
        &self.classes
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.classes.get_index_of(name)
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.classes.get_index(index).map(|name| name.as_str())
    }

    pub fn color_of(&self, index: usize) -> Option<Rgb> {
        self.palette.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_sizes() {
        let small = ClassVocabulary::from_preset(VocabularyPreset::Furniture4);
        let large = ClassVocabulary::from_preset(VocabularyPreset::Furniture8);
        assert_eq!(small.len(), ROOM_ELEMENTS.len() + FURNITURE_FAMILIES.len() * 4);
        assert_eq!(large.len(), ROOM_ELEMENTS.len() + FURNITURE_FAMILIES.len() * 8);
        assert!(large.len() > 200);
        assert_eq!(small.palette().len(), small.len());
        assert_eq!(large.palette().len(), large.len());
    }

    #[test]
    fn preset_order() {
        let vocab = ClassVocabulary::from_preset(VocabularyPreset::Furniture4);
        assert_eq!(vocab.name_of(0), Some("Void"));
        assert_eq!(vocab.index_of("Customized"), Some(12));
        assert_eq!(vocab.index_of("Cabinet0"), Some(13));
        assert_eq!(vocab.index_of("Cabinet3"), Some(16));
        assert_eq!(vocab.index_of("Table0"), Some(17));
        assert_eq!(vocab.index_of("Cabinet4"), None);
        assert_eq!(vocab.name_of(vocab.len() - 1), Some("BedSofa3"));
    }

    #[test]
    fn preset_from_str() {
        assert_eq!(
            "furniture8".parse::<VocabularyPreset>().unwrap(),
            VocabularyPreset::Furniture8
        );
        assert!("furniture5".parse::<VocabularyPreset>().is_err());
    }

    #[test]
    fn vocabulary_validation() {
        assert!(ClassVocabulary::new(Vec::<String>::new(), None).is_err());
        assert!(ClassVocabulary::new(["Chair", "Chair"], None).is_err());
        assert!(ClassVocabulary::new(["Chair", ""], None).is_err());

        let vocab = ClassVocabulary::new(["Chair", "Table"], Some(vec![Rgb(1, 2, 3)])).unwrap();
        assert_eq!(vocab.color_of(0), Some(Rgb(1, 2, 3)));
        assert_eq!(vocab.color_of(1), None);
    }

    #[test]
    fn palette_is_deterministic() {
        let palette = generate_palette(64);
        assert_eq!(palette, generate_palette(64));
        assert_eq!(palette.len(), 64);
        assert!(palette.iter().tuple_windows().all(|(lhs, rhs)| lhs != rhs));
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb(255, 0, 0));
        assert_eq!(Rgb::from_hsv(1.0 / 3.0, 1.0, 1.0), Rgb(0, 255, 0));
        assert_eq!(Rgb::from_hsv(2.0 / 3.0, 1.0, 1.0), Rgb(0, 0, 255));
        assert_eq!(Rgb::from_hsv(0.5, 0.0, 0.5), Rgb(128, 128, 128));
    }
}
