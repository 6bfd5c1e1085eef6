#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WasteCategory {
    NonBiodegradable,
    Biodegradable,
    Recyclable,
}

const NON_BIODEGRADABLE_TIPS: [&str; 4] = [
    "Pollutes land and water: These wastes accumulate in dumpsites, rivers, and oceans.",
    "Increases carbon emissions: From burning nonbiodegradable waste.",
    "Harms wildlife: Animals may mistake plastic for food.",
    "Contributes to flooding: When trash blocks waterways.",
];

const BIODEGRADABLE_TIPS: [&str; 4] = [
    "Enriches the soil: Decomposition adds nutrients that help plants grow.",
    "Promotes balance in nature: Helps maintain healthy ecosystems.",
    "Supports composting: Can be turned into natural fertilizer.",
    "Reduces pollution: Less waste goes to landfills.",
];

const RECYCLABLE_TIPS: [&str; 4] = [
    "Reduces landfill waste: Less garbage ends up in dumpsites.",
    "Saves energy and resources: Recycling uses less energy than producing new materials.",
    "Decreases pollution: Less burning and waste disposal mean cleaner air and water.",
    "Encourages creativity: Recycled materials can be used in art and innovation projects.",
];

impl WasteCategory {
    pub const ALL: [WasteCategory; 3] = [
        WasteCategory::NonBiodegradable,
        WasteCategory::Biodegradable,
        WasteCategory::Recyclable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WasteCategory::NonBiodegradable => "nonbiodegradable",
            WasteCategory::Biodegradable => "biodegradable",
            WasteCategory::Recyclable => "recyclable",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WasteCategory::NonBiodegradable => "Nonbiodegradable",
            WasteCategory::Biodegradable => "Biodegradable",
            WasteCategory::Recyclable => "Recyclable",
        }
    }

    pub fn announcement(self) -> &'static str {
        match self {
            WasteCategory::NonBiodegradable => "Non biodegradable",
            WasteCategory::Biodegradable => "Biodegradable",
            WasteCategory::Recyclable => "Recyclable",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            WasteCategory::NonBiodegradable => "😡",
            WasteCategory::Biodegradable => "🙂",
            WasteCategory::Recyclable => "🔄",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            WasteCategory::NonBiodegradable => "red",
            WasteCategory::Biodegradable => "green",
            WasteCategory::Recyclable => "blue",
        }
    }

    pub fn tips(self) -> &'static [&'static str; 4] {
        match self {
            WasteCategory::NonBiodegradable => &NON_BIODEGRADABLE_TIPS,
            WasteCategory::Biodegradable => &BIODEGRADABLE_TIPS,
            WasteCategory::Recyclable => &RECYCLABLE_TIPS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub category: WasteCategory,
    pub tip: &'static str,
}

impl Classification {
    pub fn result_text(&self) -> String {
        format!("Scanned: {}", self.category.display_name())
    }
}

pub fn pick_index(roll: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let idx = (roll.max(0.0) * len as f64) as usize;
    idx.min(len - 1)
}

pub fn classify(random: &mut impl FnMut() -> f64) -> Classification {
    let category = WasteCategory::ALL[pick_index(random(), WasteCategory::ALL.len())];
    let tips = category.tips();
    let tip = tips[pick_index(random(), tips.len())];
    Classification { category, tip }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rolls(values: &[f64]) -> impl FnMut() -> f64 + '_ {
        let mut iter = values.iter().copied().cycle();
        move || iter.next().unwrap_or(0.0)
    }

    #[test]
    fn rolls_partition_categories_evenly() {
        assert_eq!(pick_index(0.0, 3), 0);
        assert_eq!(pick_index(0.33, 3), 0);
        assert_eq!(pick_index(0.34, 3), 1);
        assert_eq!(pick_index(0.66, 3), 1);
        assert_eq!(pick_index(0.67, 3), 2);
        assert_eq!(pick_index(0.999_999, 3), 2);
    }

    #[test]
    fn out_of_range_rolls_are_clamped() {
        assert_eq!(pick_index(1.0, 4), 3);
        assert_eq!(pick_index(-0.5, 4), 0);
        assert_eq!(pick_index(0.5, 0), 0);
    }

    #[test]
    fn tip_comes_from_the_chosen_category() {
        let mut random = rolls(&[0.9, 0.0]);
        let picked = classify(&mut random);
        assert_eq!(picked.category, WasteCategory::Recyclable);
        assert_eq!(picked.tip, RECYCLABLE_TIPS[0]);
        assert_eq!(picked.result_text(), "Scanned: Recyclable");

        let mut random = rolls(&[0.1, 0.8]);
        let picked = classify(&mut random);
        assert_eq!(picked.category, WasteCategory::NonBiodegradable);
        assert_eq!(picked.tip, NON_BIODEGRADABLE_TIPS[3]);
        assert_eq!(picked.result_text(), "Scanned: Nonbiodegradable");
    }

    #[test]
    fn repeated_tips_are_allowed() {
        let mut random = rolls(&[0.5, 0.3]);
        let first = classify(&mut random);
        let second = classify(&mut random);
        assert_eq!(first, second);
        assert_eq!(first.category, WasteCategory::Biodegradable);
    }

    #[test]
    fn every_category_has_four_distinct_tips() {
        for category in WasteCategory::ALL {
            let tips = category.tips();
            for (i, tip) in tips.iter().enumerate() {
                assert!(!tip.is_empty());
                assert!(!tips[i + 1..].contains(tip));
            }
        }
    }
}
