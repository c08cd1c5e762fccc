//! Refining placement -> 19-feature vector.
//!
//! Refining stations are hub-and-spoke: one or more core slots in the
//! middle, surrounded by spoke slots. Category and refinement features
//! describe the core only; diversity spans both sides.
//!
//! Feature layout:
//!   [0]      core count
//!   [1]      spoke count
//!   [2]      core quantity
//!   [3]      spoke quantity
//!   [4]      spoke / core count (denominator floored at 1)
//!   [5]      spoke / core quantity (denominator floored at 1)
//!   [6]      distinct materials, core and spokes
//!   [7:12]   core category counts: [elemental, metal, monster_drop, stone, wood]
//!   [12]     core basic-refinement count
//!   [13:15]  core tier mean, max
//!   [15:17]  spoke tier mean, max
//!   [17]     |core tier mean - spoke tier mean|, 0 unless both sides are used
//!   [18]     station tier

use super::{
    basic_count, category_counts, max, mean, quantity_sum, resolve_slots, tiers,
    unique_materials, write, SlotItem,
};
use crate::material::MaterialLookup;

pub const REFINING_FEATURE_COUNT: usize = 19;

/// A 19-element refining feature vector.
pub type RefiningFeatures = [f32; REFINING_FEATURE_COUNT];

const FEAT_COUNTS: usize = 0;
const FEAT_QUANTITIES: usize = 2;
const FEAT_RATIOS: usize = 4;
const FEAT_UNIQUE: usize = 6;
const FEAT_CORE_CATEGORIES: usize = 7;
const FEAT_CORE_BASIC: usize = 12;
const FEAT_CORE_TIER: usize = 13;
const FEAT_SPOKE_TIER: usize = 15;
const FEAT_TIER_MISMATCH: usize = 17;
const FEAT_STATION_TIER: usize = 18;

/// Extracts refining features through an injected material lookup.
pub struct RefiningFeatureExtractor<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L: MaterialLookup + ?Sized> RefiningFeatureExtractor<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        RefiningFeatureExtractor { lookup }
    }

    pub fn extract(
        &self,
        core: &[Option<SlotItem>],
        spokes: &[Option<SlotItem>],
        station_tier: u8,
    ) -> RefiningFeatures {
        let mut f = [0.0f32; REFINING_FEATURE_COUNT];
        let core = resolve_slots(self.lookup, core);
        let spokes = resolve_slots(self.lookup, spokes);

        let core_count = core.len() as f64;
        let spoke_count = spokes.len() as f64;
        let core_qty = quantity_sum(&core);
        let spoke_qty = quantity_sum(&spokes);

        write(&mut f, FEAT_COUNTS, &[core_count, spoke_count]);
        write(&mut f, FEAT_QUANTITIES, &[core_qty, spoke_qty]);
        write(
            &mut f,
            FEAT_RATIOS,
            &[
                spoke_count / core_count.max(1.0),
                spoke_qty / core_qty.max(1.0),
            ],
        );

        let all: Vec<_> = core.iter().chain(spokes.iter()).cloned().collect();
        write(&mut f, FEAT_UNIQUE, &[unique_materials(&all)]);

        write(
            &mut f,
            FEAT_CORE_CATEGORIES,
            &category_counts(core.iter().map(|i| i.category)),
        );
        write(&mut f, FEAT_CORE_BASIC, &[basic_count(&core)]);

        let core_tiers = tiers(&core);
        let spoke_tiers = tiers(&spokes);
        let core_mean = mean(&core_tiers);
        let spoke_mean = mean(&spoke_tiers);
        write(&mut f, FEAT_CORE_TIER, &[core_mean, max(&core_tiers)]);
        write(&mut f, FEAT_SPOKE_TIER, &[spoke_mean, max(&spoke_tiers)]);

        let mismatch = if !core.is_empty() && !spokes.is_empty() {
            (core_mean - spoke_mean).abs()
        } else {
            0.0
        };
        write(&mut f, FEAT_TIER_MISMATCH, &[mismatch]);
        write(&mut f, FEAT_STATION_TIER, &[f64::from(station_tier)]);

        tracing::trace!(
            core = core.len(),
            spokes = spokes.len(),
            station_tier,
            "extracted refining features"
        );
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
        m.insert("iron".into(), MaterialInfo::new("metal", 1, ["raw"]));
        m.insert("mithril".into(), MaterialInfo::new("metal", 4, ["basic"]));
        m.insert("coal".into(), MaterialInfo::new("stone", 1, Vec::<String>::new()));
        m.insert("flux".into(), MaterialInfo::new("elemental", 2, ["fire"]));
        m
    }

    fn slot(id: &str, qty: u32) -> Option<SlotItem> {
        Some(SlotItem::new(id, qty))
    }

    #[test]
    fn core_only_has_no_tier_mismatch() {
        let db = fixture();
        let f = RefiningFeatureExtractor::new(&db).extract(&[slot("iron", 1)], &[], 1);
        assert_eq!(f.len(), 19);
        assert_eq!(f[0], 1.0);
        assert_eq!(f[1], 0.0);
        assert_eq!(&f[13..15], &[1.0, 1.0]);
        assert_eq!(&f[15..17], &[0.0, 0.0]);
        assert_eq!(f[17], 0.0);
        assert_eq!(f[18], 1.0);
    }

    #[test]
    fn empty_station() {
        let db = fixture();
        let f = RefiningFeatureExtractor::new(&db).extract(&[None], &[None, None], 2);
        assert!(f[..18].iter().all(|&v| v == 0.0));
        assert_eq!(f[18], 2.0);
    }

    #[test]
    fn hub_and_spoke() {
        let db = fixture();
        let core = vec![slot("mithril", 2), None];
        let spokes = vec![slot("coal", 3), None, slot("flux", 1), slot("mithril", 2)];
        let f = RefiningFeatureExtractor::new(&db).extract(&core, &spokes, 3);

        assert_eq!(&f[0..4], &[1.0, 3.0, 2.0, 6.0]);
        assert_eq!(&f[4..6], &[3.0, 3.0]);
        assert_eq!(f[6], 3.0);
        // Core categories only: one metal.
        assert_eq!(&f[7..12], &[0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(f[12], 1.0);
        assert_eq!(&f[13..15], &[4.0, 4.0]);
        // Spoke tiers: 1, 2, 4
        assert!((f64::from(f[15]) - 7.0 / 3.0).abs() < 1e-6);
        assert_eq!(f[16], 4.0);
        assert!((f64::from(f[17]) - 5.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn ratios_floor_denominator_at_one() {
        let db = fixture();
        let f = RefiningFeatureExtractor::new(&db).extract(&[], &[slot("coal", 4), slot("iron", 1)], 1);
        assert_eq!(&f[4..6], &[2.0, 5.0]);
        assert_eq!(f[17], 0.0);
        // Basic count is core-only.
        assert_eq!(f[12], 0.0);
    }
}
