//! Fixed-length feature vectors for the tree-model crafting disciplines.
//!
//! All three extractors share the helpers in this module so that category
//! ordering, refinement detection and summary statistics can never diverge
//! between disciplines. Arithmetic is done in `f64` and each feature is
//! rounded to `f32` once, when written.

pub mod alchemy;
pub mod engineering;
pub mod refining;

pub use alchemy::{AlchemyFeatureExtractor, AlchemyFeatures, ALCHEMY_FEATURE_COUNT};
pub use engineering::{
    EngineeringFeatureExtractor, EngineeringFeatures, EngineeringSlots, SlotType, ALL_SLOT_TYPES,
    ENGINEERING_FEATURE_COUNT,
};
pub use refining::{RefiningFeatureExtractor, RefiningFeatures, REFINING_FEATURE_COUNT};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::material::{MaterialLookup, UNKNOWN_CATEGORY};

/// Categories with a dedicated distribution bucket, alphabetical.
///
/// This order is baked into every trained tree model.
pub const CATEGORY_ORDER: [&str; 5] = ["elemental", "metal", "monster_drop", "stone", "wood"];

/// Index feature for a category outside [`CATEGORY_ORDER`].
pub const OTHER_CATEGORY_INDEX: f64 = -1.0;

/// Tier assumed for a material the lookup does not know.
pub const UNKNOWN_TIER: u8 = 1;

/// Position of a category in [`CATEGORY_ORDER`], or -1.
pub fn category_index(category: &str) -> f64 {
    CATEGORY_ORDER
        .iter()
        .position(|c| *c == category)
        .map(|i| i as f64)
        .unwrap_or(OTHER_CATEGORY_INDEX)
}

/// Per-bucket counts over [`CATEGORY_ORDER`]; other categories are ignored.
pub fn category_counts<'a>(categories: impl IntoIterator<Item = &'a str>) -> [f64; 5] {
    let mut counts = [0.0; 5];
    for category in categories {
        if let Some(i) = CATEGORY_ORDER.iter().position(|c| *c == category) {
            counts[i] += 1.0;
        }
    }
    counts
}

/// Processing state of a material, read from its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    Basic,
    Refined,
    Raw,
    Processed,
}

impl Refinement {
    /// Scans for `basic`, `refined`, `raw`, `processed` in that priority;
    /// a material with none of them is basic.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let has = |name: &str| tags.iter().any(|t| t.as_ref() == name);
        if has("basic") {
            Refinement::Basic
        } else if has("refined") {
            Refinement::Refined
        } else if has("raw") {
            Refinement::Raw
        } else if has("processed") {
            Refinement::Processed
        } else {
            Refinement::Basic
        }
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Maximum; 0 for an empty slice.
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Population standard deviation (divides by N); 0 for fewer than 2 values.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// A material placed in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotItem {
    pub material: String,
    pub quantity: u32,
}

impl SlotItem {
    pub fn new(material: impl Into<String>, quantity: u32) -> Self {
        SlotItem {
            material: material.into(),
            quantity,
        }
    }
}

/// An ordered list of slots, each empty or holding one item.
pub type SlotPlacement = Vec<Option<SlotItem>>;

/// A placed item with its material data resolved (or defaulted).
#[derive(Debug, Clone)]
pub(crate) struct Ingredient<'a> {
    pub id: &'a str,
    pub quantity: f64,
    pub tier: f64,
    pub category: &'a str,
    pub refinement: Refinement,
}

impl<'a> Ingredient<'a> {
    /// Resolves an item; unknown ids get tier 1, category `unknown`, no tags.
    pub fn resolve<L: MaterialLookup + ?Sized>(lookup: &'a L, item: &'a SlotItem) -> Self {
        match lookup.get_material(&item.material) {
            Some(info) => Ingredient {
                id: &item.material,
                quantity: f64::from(item.quantity),
                tier: f64::from(info.tier),
                category: &info.category,
                refinement: Refinement::from_tags(&info.tags),
            },
            None => Ingredient {
                id: &item.material,
                quantity: f64::from(item.quantity),
                tier: f64::from(UNKNOWN_TIER),
                category: UNKNOWN_CATEGORY,
                refinement: Refinement::Basic,
            },
        }
    }

    pub fn is_basic(&self) -> bool {
        self.refinement == Refinement::Basic
    }
}

/// Resolves the non-empty slots, preserving slot order.
pub(crate) fn resolve_slots<'a, L: MaterialLookup + ?Sized>(
    lookup: &'a L,
    slots: &'a [Option<SlotItem>],
) -> Vec<Ingredient<'a>> {
    slots
        .iter()
        .flatten()
        .map(|item| Ingredient::resolve(lookup, item))
        .collect()
}

/// Number of distinct material ids.
pub(crate) fn unique_materials(ingredients: &[Ingredient<'_>]) -> f64 {
    ingredients.iter().map(|i| i.id).collect::<HashSet<_>>().len() as f64
}

pub(crate) fn tiers(ingredients: &[Ingredient<'_>]) -> Vec<f64> {
    ingredients.iter().map(|i| i.tier).collect()
}

pub(crate) fn quantity_sum(ingredients: &[Ingredient<'_>]) -> f64 {
    ingredients.iter().map(|i| i.quantity).sum()
}

pub(crate) fn basic_count(ingredients: &[Ingredient<'_>]) -> f64 {
    ingredients.iter().filter(|i| i.is_basic()).count() as f64
}

/// Writes `f64` features into an `f32` vector at consecutive offsets.
pub(crate) fn write(out: &mut [f32], offset: usize, values: &[f64]) {
    for (slot, v) in out[offset..offset + values.len()].iter_mut().zip(values) {
        *slot = *v as f32;
    }
}
