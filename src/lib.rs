//! Crafting classifier preprocessing.
//!
//! Deterministic encoders that turn an in-progress crafting placement into
//! the fixed-shape numeric input a pretrained classifier expects: 36x36x3
//! and 56x56x3 images for the smithing and adornment CNNs, and 34/19/28
//! float feature vectors for the alchemy, refining and engineering tree
//! models. Every encoder is a pure function of its input and a read-only
//! material lookup, so calls can run concurrently without locking.

pub mod batch;
pub mod classifier;
pub mod contract;
pub mod features;
pub mod image;
pub mod material;
pub mod request;
pub mod synth;

pub use contract::Discipline;
pub use material::{MaterialDatabase, MaterialInfo, MaterialLookup};
pub use request::{EncodeRequest, EncodeResponse};
