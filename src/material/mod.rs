//! Material data access and material -> color encoding.
//!
//! The lookup is an injected, read-only capability; nothing in this crate
//! keeps a process-wide material table.

pub mod color;
pub mod database;
pub mod lookup;

pub use color::{hsv_to_rgb, MaterialColorEncoder, Rgb, EMPTY_COLOR, UNKNOWN_COLOR};
pub use database::{resolve_tags, MaterialDatabase, MaterialDbError, MaterialRecord};
pub use lookup::{MaterialId, MaterialInfo, MaterialLookup, KNOWN_CATEGORIES, UNKNOWN_CATEGORY};
