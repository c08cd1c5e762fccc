//! Material -> RGB color encoding shared by the image preprocessors.
//!
//! Category picks the hue, tier picks the brightness (HSV value), tags adjust
//! the saturation. The resulting HSV triple is converted with the classic
//! six-sector formula. These tables are part of the trained CNN's input
//! contract and must not drift.

use super::lookup::{MaterialId, MaterialInfo, MaterialLookup};

/// An RGB triple with channels in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Color of an empty cell or a vertex with no material.
pub const EMPTY_COLOR: Rgb = [0.0, 0.0, 0.0];

/// Color of a material id that is not in the lookup.
pub const UNKNOWN_COLOR: Rgb = [0.3, 0.3, 0.3];

/// Hue (degrees) per material category.
const CATEGORY_HUES: [(&str, f64); 7] = [
    ("metal", 210.0),
    ("wood", 30.0),
    ("stone", 0.0),
    ("monster_drop", 300.0),
    ("gem", 280.0),
    ("herb", 120.0),
    ("fabric", 45.0),
];

/// Hue (degrees) per element tag, consulted for `elemental` materials.
const ELEMENT_HUES: [(&str, f64); 10] = [
    ("fire", 0.0),
    ("water", 210.0),
    ("earth", 120.0),
    ("air", 60.0),
    ("lightning", 270.0),
    ("ice", 180.0),
    ("light", 45.0),
    ("dark", 280.0),
    ("void", 290.0),
    ("chaos", 330.0),
];

/// Hue for an elemental material with no recognized element tag.
const DEFAULT_ELEMENT_HUE: f64 = 280.0;

/// HSV value (brightness) per tier 1..=4.
const TIER_VALUES: [f64; 4] = [0.50, 0.65, 0.80, 0.95];

const BASE_SATURATION: f64 = 0.6;
const STONE_SATURATION: f64 = 0.2;

/// Returns the hue in degrees for a material.
fn material_hue(info: &MaterialInfo) -> f64 {
    if info.category == "elemental" {
        // First tag in the material's own order wins, not the table order.
        return info
            .tags
            .iter()
            .find_map(|tag| {
                ELEMENT_HUES
                    .iter()
                    .find(|(element, _)| *element == tag.as_str())
                    .map(|&(_, hue)| hue)
            })
            .unwrap_or(DEFAULT_ELEMENT_HUE);
    }
    CATEGORY_HUES
        .iter()
        .find(|(category, _)| *category == info.category)
        .map(|&(_, hue)| hue)
        .unwrap_or(0.0)
}

/// Returns the HSV value for a tier; unknown tiers read as tier 1.
fn tier_value(tier: u8) -> f64 {
    match tier {
        1..=4 => TIER_VALUES[tier as usize - 1],
        _ => TIER_VALUES[0],
    }
}

/// Returns the saturation for a material.
fn material_saturation(info: &MaterialInfo) -> f64 {
    let base = if info.category == "stone" {
        STONE_SATURATION
    } else {
        BASE_SATURATION
    };
    if info.has_any_tag(&["legendary", "mythical"]) {
        (base + 0.2).min(1.0)
    } else if info.has_any_tag(&["magical", "ancient"]) {
        (base + 0.1).min(1.0)
    } else {
        base
    }
}

/// Converts HSV to RGB using the classic six-sector formula.
///
/// `h` is a fraction of a full turn (`degrees / 360`), `s` and `v` are in
/// `[0, 1]`. Zero saturation yields a gray `(v, v, v)`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    if s == 0.0 {
        return [v, v, v];
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Maps material ids to RGB colors through an injected lookup.
pub struct MaterialColorEncoder<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L: MaterialLookup + ?Sized> MaterialColorEncoder<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        MaterialColorEncoder { lookup }
    }

    /// Encodes a material (or the absence of one) as an RGB triple.
    ///
    /// `None` is black; an id missing from the lookup is flat gray.
    pub fn encode(&self, material: Option<&MaterialId>) -> Rgb {
        let Some(id) = material else {
            return EMPTY_COLOR;
        };
        match self.lookup.get_material(id) {
            Some(info) => encode_info(info),
            None => UNKNOWN_COLOR,
        }
    }

    /// Raw material data for mask and tier lookups.
    pub fn material_data(&self, id: &MaterialId) -> Option<&'a MaterialInfo> {
        self.lookup.get_material(id)
    }
}

/// Encodes known material data as an RGB triple.
pub fn encode_info(info: &MaterialInfo) -> Rgb {
    let hue = material_hue(info);
    let saturation = material_saturation(info);
    let value = tier_value(info.tier);
    hsv_to_rgb(hue / 360.0, saturation, value)
}
