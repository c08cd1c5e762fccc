//! Alchemy placement -> 34-feature vector.
//!
//! Alchemy slots are sequential, so ingredient order carries meaning: the
//! first six ingredients get positional features and tier changes between
//! neighbors are counted.
//!
//! Feature layout:
//!   [0]      ingredient count
//!   [1]      total quantity
//!   [2]      mean quantity per ingredient
//!   [3:21]   first six ingredients: (tier, quantity, category index)
//!   [21]     distinct materials
//!   [22:27]  category counts: [elemental, metal, monster_drop, stone, wood]
//!   [27]     basic-refinement count
//!   [28:31]  tier mean, max, population std
//!   [31]     tier increases between neighbors
//!   [32]     tier decreases between neighbors
//!   [33]     station tier

use super::{
    basic_count, category_counts, category_index, max, mean, population_std, quantity_sum,
    resolve_slots, tiers, unique_materials, write, SlotItem,
};
use crate::material::MaterialLookup;

pub const ALCHEMY_FEATURE_COUNT: usize = 34;

/// A 34-element alchemy feature vector.
pub type AlchemyFeatures = [f32; ALCHEMY_FEATURE_COUNT];

/// Number of ingredients with positional features.
pub const POSITIONAL_INGREDIENTS: usize = 6;

const FEAT_COUNT: usize = 0;
const FEAT_TOTAL_QTY: usize = 1;
const FEAT_MEAN_QTY: usize = 2;
const FEAT_POSITIONAL: usize = 3;
const FEAT_UNIQUE: usize = 21;
const FEAT_CATEGORIES: usize = 22;
const FEAT_BASIC: usize = 27;
const FEAT_TIER_STATS: usize = 28;
const FEAT_TIER_UP: usize = 31;
const FEAT_TIER_DOWN: usize = 32;
const FEAT_STATION_TIER: usize = 33;

/// Extracts alchemy features through an injected material lookup.
pub struct AlchemyFeatureExtractor<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L: MaterialLookup + ?Sized> AlchemyFeatureExtractor<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        AlchemyFeatureExtractor { lookup }
    }

    /// Extracts features from ordered slots; empty slots are skipped but the
    /// relative order of filled ones is kept.
    pub fn extract(&self, slots: &[Option<SlotItem>], station_tier: u8) -> AlchemyFeatures {
        let mut f = [0.0f32; ALCHEMY_FEATURE_COUNT];
        let ingredients = resolve_slots(self.lookup, slots);
        let count = ingredients.len() as f64;
        let total_qty = quantity_sum(&ingredients);

        write(&mut f, FEAT_COUNT, &[count]);
        write(&mut f, FEAT_TOTAL_QTY, &[total_qty]);
        let mean_qty = if ingredients.is_empty() {
            0.0
        } else {
            total_qty / count
        };
        write(&mut f, FEAT_MEAN_QTY, &[mean_qty]);

        for (i, ing) in ingredients.iter().take(POSITIONAL_INGREDIENTS).enumerate() {
            write(
                &mut f,
                FEAT_POSITIONAL + i * 3,
                &[ing.tier, ing.quantity, category_index(ing.category)],
            );
        }

        write(&mut f, FEAT_UNIQUE, &[unique_materials(&ingredients)]);
        write(
            &mut f,
            FEAT_CATEGORIES,
            &category_counts(ingredients.iter().map(|i| i.category)),
        );
        write(&mut f, FEAT_BASIC, &[basic_count(&ingredients)]);

        let tier_values = tiers(&ingredients);
        write(
            &mut f,
            FEAT_TIER_STATS,
            &[
                mean(&tier_values),
                max(&tier_values),
                population_std(&tier_values),
            ],
        );

        let (mut up, mut down) = (0.0, 0.0);
        for pair in tier_values.windows(2) {
            if pair[1] > pair[0] {
                up += 1.0;
            } else if pair[1] < pair[0] {
                down += 1.0;
            }
        }
        write(&mut f, FEAT_TIER_UP, &[up]);
        write(&mut f, FEAT_TIER_DOWN, &[down]);
        write(&mut f, FEAT_STATION_TIER, &[f64::from(station_tier)]);

        tracing::trace!(ingredients = ingredients.len(), station_tier, "extracted alchemy features");
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialInfo;
    use std::collections::HashMap;

    fn fixture() -> HashMap<String, MaterialInfo> {
        let mut m = HashMap::new();
        m.insert("copper_ore".into(), MaterialInfo::new("metal", 1, ["raw"]));
        m.insert("iron_ore".into(), MaterialInfo::new("metal", 1, Vec::<String>::new()));
        m.insert("fire_crystal".into(), MaterialInfo::new("elemental", 3, ["fire", "refined"]));
        m.insert("slime_gel".into(), MaterialInfo::new("monster_drop", 2, ["basic"]));
        m.insert("sage".into(), MaterialInfo::new("herb", 2, ["processed"]));
        m
    }

    fn slot(id: &str, qty: u32) -> Option<SlotItem> {
        Some(SlotItem::new(id, qty))
    }

    #[test]
    fn empty_placement() {
        let db = fixture();
        let f = AlchemyFeatureExtractor::new(&db).extract(&[], 3);
        assert_eq!(f.len(), 34);
        assert!(f[..33].iter().all(|&v| v == 0.0));
        assert_eq!(f[33], 3.0);

        let all_empty = AlchemyFeatureExtractor::new(&db).extract(&[None, None, None, None, None, None], 3);
        assert_eq!(f, all_empty);
    }

    #[test]
    fn copper_and_iron_scenario() {
        let db = fixture();
        let slots = vec![slot("copper_ore", 2), None, slot("iron_ore", 1), None, None, None];
        let f = AlchemyFeatureExtractor::new(&db).extract(&slots, 2);
        assert_eq!(f[0], 2.0);
        assert_eq!(f[1], 3.0);
        assert_eq!(f[2], 1.5);
        // Positional features follow ingredient order, not slot index.
        assert_eq!(&f[3..6], &[1.0, 2.0, 1.0]);
        assert_eq!(&f[6..9], &[1.0, 1.0, 1.0]);
        assert!(f[9..21].iter().all(|&v| v == 0.0));
        assert_eq!(f[21], 2.0);
        assert_eq!(f[22], 0.0);
        assert_eq!(f[23], 2.0);
        // copper is raw, iron has no refinement tag -> basic.
        assert_eq!(f[27], 1.0);
        assert_eq!(&f[28..31], &[1.0, 1.0, 0.0]);
        assert_eq!(&f[31..33], &[0.0, 0.0]);
        assert_eq!(f[33], 2.0);
    }

    #[test]
    fn tier_trend_and_stats() {
        let db = fixture();
        let slots = vec![
            slot("copper_ore", 1),
            slot("fire_crystal", 1),
            slot("slime_gel", 1),
            slot("slime_gel", 2),
            slot("fire_crystal", 1),
        ];
        let f = AlchemyFeatureExtractor::new(&db).extract(&slots, 1);
        // Tiers: 1, 3, 2, 2, 3
        assert_eq!(f[31], 2.0);
        assert_eq!(f[32], 1.0);
        assert_eq!(f[28], 2.2);
        assert_eq!(f[29], 3.0);
        let expected_std = ((1.2f64 * 1.2 + 0.8 * 0.8 + 0.2 * 0.2 * 2.0 + 0.8 * 0.8) / 5.0).sqrt();
        assert!((f64::from(f[30]) - expected_std).abs() < 1e-6);
        assert_eq!(f[21], 3.0);
        // elemental x2, metal x1, monster_drop x2
        assert_eq!(&f[22..27], &[2.0, 1.0, 2.0, 0.0, 0.0]);
        // basic: slime_gel x2 only
        assert_eq!(f[27], 2.0);
    }

    #[test]
    fn only_first_six_ingredients_are_positional() {
        let db = fixture();
        let slots: Vec<_> = (1..=8).map(|q| slot("sage", q)).collect();
        let f = AlchemyFeatureExtractor::new(&db).extract(&slots, 4);
        assert_eq!(f[0], 8.0);
        assert_eq!(f[1], 36.0);
        // Sixth ingredient occupies [18..21].
        assert_eq!(&f[18..21], &[2.0, 6.0, -1.0]);
        assert_eq!(f[21], 1.0);
        assert!(f[22..27].iter().all(|&v| v == 0.0));
        assert_eq!(f[27], 0.0);
    }

    #[test]
    fn unknown_material_uses_fallbacks() {
        let db = fixture();
        let f = AlchemyFeatureExtractor::new(&db).extract(&[slot("mystery", 5)], 1);
        assert_eq!(&f[3..6], &[1.0, 5.0, -1.0]);
        assert!(f[22..27].iter().all(|&v| v == 0.0));
        assert_eq!(f[27], 1.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let db = fixture();
        let ext = AlchemyFeatureExtractor::new(&db);
        let slots = vec![slot("fire_crystal", 3), None, slot("sage", 1), slot("copper_ore", 2)];
        let a = ext.extract(&slots, 2);
        let b = ext.extract(&slots, 2);
        assert_eq!(
            a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }
}
