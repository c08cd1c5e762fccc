//! The read-only material lookup capability consumed by every encoder.
//!
//! Encoders never load material data themselves; they receive something that
//! implements [`MaterialLookup`] and treat it as an immutable snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a material in the content database (e.g. `"iron_ore"`).
pub type MaterialId = str;

/// Category name used for materials that are absent from the lookup.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Every category the content database is expected to use.
pub const KNOWN_CATEGORIES: [&str; 8] = [
    "metal",
    "wood",
    "stone",
    "monster_drop",
    "gem",
    "herb",
    "fabric",
    "elemental",
];

/// The subset of material data the encoders depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub category: String,
    pub tier: u8,
    /// Ordered, de-duplicated tags. Order matters for elemental hue lookup.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MaterialInfo {
    /// Creates a material entry, dropping repeated tags while keeping the
    /// first occurrence of each.
    pub fn new<C, I, T>(category: C, tier: u8, tags: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !ordered.contains(&tag) {
                ordered.push(tag);
            }
        }
        MaterialInfo {
            category: category.into(),
            tier,
            tags: ordered,
        }
    }

    /// Returns true if the material carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns true if the material carries any of the given tags.
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|t| self.has_tag(t))
    }
}

/// Read-only access to material data by id.
///
/// Implementations must behave as an immutable snapshot for the lifetime of
/// any encoder borrowing them. Hot reload is done by building a new snapshot
/// and swapping it in, never by mutating one that encoders can see.
pub trait MaterialLookup {
    /// Returns the material, or `None` if the id is unknown.
    fn get_material(&self, id: &MaterialId) -> Option<&MaterialInfo>;
}

impl<T: MaterialLookup + ?Sized> MaterialLookup for &T {
    fn get_material(&self, id: &MaterialId) -> Option<&MaterialInfo> {
        (**self).get_material(id)
    }
}

impl<T: MaterialLookup + ?Sized> MaterialLookup for Arc<T> {
    fn get_material(&self, id: &MaterialId) -> Option<&MaterialInfo> {
        (**self).get_material(id)
    }
}

impl MaterialLookup for HashMap<String, MaterialInfo> {
    fn get_material(&self, id: &MaterialId) -> Option<&MaterialInfo> {
        self.get(id)
    }
}
