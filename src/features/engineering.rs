//! Engineering placement -> 28-feature vector.
//!
//! Engineering devices are assembled from typed slots. The slot type
//! vocabulary is fixed and ordered; per-type features follow that order.
//!
//! Feature layout:
//!   [0]      filled slots
//!   [1]      total quantity
//!   [2:10]   filled slots per type, vocabulary order
//!   [10]     distinct slot types used
//!   [11:14]  has FRAME, has FUNCTION, has POWER
//!   [14]     distinct materials
//!   [15:20]  category counts: [elemental, metal, monster_drop, stone, wood]
//!   [20]     basic-refinement count
//!   [21:24]  tier mean, max, population std
//!   [24:27]  quantity in FRAME, POWER, FUNCTION slots
//!   [27]     station tier

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    basic_count, category_counts, max, mean, population_std, quantity_sum, resolve_slots,
    tiers, unique_materials, write, Ingredient, SlotItem,
};
use crate::material::MaterialLookup;

pub const ENGINEERING_FEATURE_COUNT: usize = 28;

/// A 28-element engineering feature vector.
pub type EngineeringFeatures = [f32; ENGINEERING_FEATURE_COUNT];

const FEAT_FILLED: usize = 0;
const FEAT_TOTAL_QTY: usize = 1;
const FEAT_PER_TYPE: usize = 2;
const FEAT_TYPES_USED: usize = 10;
const FEAT_HAS_CORE_TYPES: usize = 11;
const FEAT_UNIQUE: usize = 14;
const FEAT_CATEGORIES: usize = 15;
const FEAT_BASIC: usize = 20;
const FEAT_TIER_STATS: usize = 21;
const FEAT_TYPE_QTY: usize = 24;
const FEAT_STATION_TIER: usize = 27;

/// Compartment types of an engineering station, in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotType {
    Frame,
    Function,
    Power,
    Modifier,
    Utility,
    Enhancement,
    Core,
    Catalyst,
}

/// All slot types in feature order.
pub const ALL_SLOT_TYPES: [SlotType; 8] = [
    SlotType::Frame,
    SlotType::Function,
    SlotType::Power,
    SlotType::Modifier,
    SlotType::Utility,
    SlotType::Enhancement,
    SlotType::Core,
    SlotType::Catalyst,
];

impl SlotType {
    /// Index in [`ALL_SLOT_TYPES`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlotType::Frame => "FRAME",
            SlotType::Function => "FUNCTION",
            SlotType::Power => "POWER",
            SlotType::Modifier => "MODIFIER",
            SlotType::Utility => "UTILITY",
            SlotType::Enhancement => "ENHANCEMENT",
            SlotType::Core => "CORE",
            SlotType::Catalyst => "CATALYST",
        }
    }
}

/// Error for a slot type name outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown slot type: '{0}'")]
pub struct UnknownSlotType(pub String);

impl FromStr for SlotType {
    type Err = UnknownSlotType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_SLOT_TYPES
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSlotType(s.to_string()))
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slots grouped by type. Iteration follows the vocabulary order, which
/// fixes the order materials enter the summary statistics.
pub type EngineeringSlots = BTreeMap<SlotType, Vec<Option<SlotItem>>>;

/// Extracts engineering features through an injected material lookup.
pub struct EngineeringFeatureExtractor<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L: MaterialLookup + ?Sized> EngineeringFeatureExtractor<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        EngineeringFeatureExtractor { lookup }
    }

    pub fn extract(&self, slots: &EngineeringSlots, station_tier: u8) -> EngineeringFeatures {
        let mut f = [0.0f32; ENGINEERING_FEATURE_COUNT];

        let mut per_type: [Vec<Ingredient<'_>>; 8] = Default::default();
        for (slot_type, type_slots) in slots {
            per_type[slot_type.index()] = resolve_slots(self.lookup, type_slots);
        }
        let all: Vec<Ingredient<'_>> = per_type.iter().flatten().cloned().collect();

        write(&mut f, FEAT_FILLED, &[all.len() as f64]);
        write(&mut f, FEAT_TOTAL_QTY, &[quantity_sum(&all)]);

        let counts: Vec<f64> = per_type.iter().map(|v| v.len() as f64).collect();
        write(&mut f, FEAT_PER_TYPE, &counts);
        let used = per_type.iter().filter(|v| !v.is_empty()).count() as f64;
        write(&mut f, FEAT_TYPES_USED, &[used]);

        let present = |t: SlotType| {
            if per_type[t.index()].is_empty() {
                0.0
            } else {
                1.0
            }
        };
        write(
            &mut f,
            FEAT_HAS_CORE_TYPES,
            &[
                present(SlotType::Frame),
                present(SlotType::Function),
                present(SlotType::Power),
            ],
        );

        write(&mut f, FEAT_UNIQUE, &[unique_materials(&all)]);
        write(
            &mut f,
            FEAT_CATEGORIES,
            &category_counts(all.iter().map(|i| i.category)),
        );
        write(&mut f, FEAT_BASIC, &[basic_count(&all)]);

        let tier_values = tiers(&all);
        write(
            &mut f,
            FEAT_TIER_STATS,
            &[
                mean(&tier_values),
                max(&tier_values),
                population_std(&tier_values),
            ],
        );

        // POWER comes before FUNCTION here, unlike the presence flags.
        write(
            &mut f,
            FEAT_TYPE_QTY,
            &[
                quantity_sum(&per_type[SlotType::Frame.index()]),
                quantity_sum(&per_type[SlotType::Power.index()]),
                quantity_sum(&per_type[SlotType::Function.index()]),
            ],
        );
        write(&mut f, FEAT_STATION_TIER, &[f64::from(station_tier)]);

        tracing::trace!(filled = all.len(), station_tier, "extracted engineering features");
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
        m.insert("iron_plate".into(), MaterialInfo::new("metal", 2, ["refined"]));
        m.insert("oak_beam".into(), MaterialInfo::new("wood", 1, Vec::<String>::new()));
        m.insert("spark_core".into(), MaterialInfo::new("elemental", 3, ["lightning"]));
        m.insert("gear".into(), MaterialInfo::new("metal", 4, ["basic"]));
        m
    }

    fn slot(id: &str, qty: u32) -> Option<SlotItem> {
        Some(SlotItem::new(id, qty))
    }

    fn turret() -> EngineeringSlots {
        let mut slots = EngineeringSlots::new();
        slots.insert(SlotType::Frame, vec![slot("iron_plate", 2), slot("oak_beam", 3), None]);
        slots.insert(SlotType::Power, vec![slot("spark_core", 1)]);
        slots.insert(SlotType::Modifier, vec![None, slot("gear", 1)]);
        slots.insert(SlotType::Catalyst, vec![None]);
        slots
    }

    #[test]
    fn slot_type_vocabulary() {
        assert_eq!(ALL_SLOT_TYPES.len(), 8);
        for (i, t) in ALL_SLOT_TYPES.iter().enumerate() {
            assert_eq!(t.index(), i);
            assert_eq!(t.as_str().parse::<SlotType>(), Ok(*t));
        }
        assert_eq!("power".parse::<SlotType>(), Ok(SlotType::Power));
        assert!("ARMOR".parse::<SlotType>().is_err());
    }

    #[test]
    fn turret_features() {
        let db = fixture();
        let f = EngineeringFeatureExtractor::new(&db).extract(&turret(), 2);
        assert_eq!(f.len(), 28);
        assert_eq!(f[0], 4.0);
        assert_eq!(f[1], 7.0);
        assert_eq!(&f[2..10], &[2.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(f[10], 3.0);
        assert_eq!(&f[11..14], &[1.0, 0.0, 1.0]);
        assert_eq!(f[14], 4.0);
        assert_eq!(&f[15..20], &[1.0, 2.0, 0.0, 0.0, 1.0]);
        // oak_beam and spark_core carry no refinement tag; gear is basic.
        assert_eq!(f[20], 3.0);
        assert_eq!(f[21], 2.5);
        assert_eq!(f[22], 4.0);
        assert!((f64::from(f[23]) - 1.25f64.sqrt()).abs() < 1e-6);
        assert_eq!(&f[24..27], &[5.0, 1.0, 0.0]);
        assert_eq!(f[27], 2.0);
    }

    #[test]
    fn per_type_counts_sum_to_total() {
        let db = fixture();
        let ext = EngineeringFeatureExtractor::new(&db);
        let mut slots = turret();
        slots.insert(SlotType::Utility, vec![slot("unknown_widget", 9), slot("gear", 1)]);
        for s in [EngineeringSlots::new(), turret(), slots] {
            let f = ext.extract(&s, 1);
            assert_eq!(f[2..10].iter().sum::<f32>(), f[0]);
        }
    }

    #[test]
    fn empty_station() {
        let db = fixture();
        let f = EngineeringFeatureExtractor::new(&db).extract(&EngineeringSlots::new(), 4);
        assert!(f[..27].iter().all(|&v| v == 0.0));
        assert_eq!(f[27], 4.0);
    }

    #[test]
    fn slots_deserialize_by_type_name() {
        let json = r#"{"POWER": [{"material": "spark_core", "quantity": 1}], "FRAME": [null]}"#;
        let slots: EngineeringSlots = serde_json::from_str(json).unwrap();
        // BTreeMap orders by vocabulary, not by JSON order.
        let keys: Vec<_> = slots.keys().copied().collect();
        assert_eq!(keys, vec![SlotType::Frame, SlotType::Power]);
    }
}
