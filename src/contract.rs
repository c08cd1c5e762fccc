//! Output shapes shared with the trained models.
//!
//! A length mismatch between an encoder's output and what a caller expects
//! means code and model disagree. That is a programming error, so the
//! checks here panic instead of returning an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::features::{ALCHEMY_FEATURE_COUNT, ENGINEERING_FEATURE_COUNT, REFINING_FEATURE_COUNT};
use crate::image::{ADORNMENT_IMAGE_LEN, ADORNMENT_IMAGE_SIZE, SMITHING_IMAGE_LEN, SMITHING_IMAGE_SIZE};

/// A crafting discipline with its own classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Smithing,
    Adornment,
    Alchemy,
    Refining,
    Engineering,
}

pub const ALL_DISCIPLINES: [Discipline; 5] = [
    Discipline::Smithing,
    Discipline::Adornment,
    Discipline::Alchemy,
    Discipline::Refining,
    Discipline::Engineering,
];

impl Discipline {
    /// Number of floats the discipline's encoder produces.
    pub const fn output_len(self) -> usize {
        match self {
            Discipline::Smithing => SMITHING_IMAGE_LEN,
            Discipline::Adornment => ADORNMENT_IMAGE_LEN,
            Discipline::Alchemy => ALCHEMY_FEATURE_COUNT,
            Discipline::Refining => REFINING_FEATURE_COUNT,
            Discipline::Engineering => ENGINEERING_FEATURE_COUNT,
        }
    }

    /// Model input shape without the batch axis: `[H, W, 3]` or `[N]`.
    pub fn input_shape(self) -> Vec<usize> {
        match self {
            Discipline::Smithing => vec![SMITHING_IMAGE_SIZE, SMITHING_IMAGE_SIZE, 3],
            Discipline::Adornment => vec![ADORNMENT_IMAGE_SIZE, ADORNMENT_IMAGE_SIZE, 3],
            other => vec![other.output_len()],
        }
    }

    /// True for the CNN-backed disciplines.
    pub fn is_image(self) -> bool {
        matches!(self, Discipline::Smithing | Discipline::Adornment)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Discipline::Smithing => "smithing",
            Discipline::Adornment => "adornment",
            Discipline::Alchemy => "alchemy",
            Discipline::Refining => "refining",
            Discipline::Engineering => "engineering",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized discipline name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown discipline: '{0}'")]
pub struct UnknownDiscipline(pub String);

impl FromStr for Discipline {
    type Err = UnknownDiscipline;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_DISCIPLINES
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDiscipline(s.to_string()))
    }
}

/// Returns `values` unchanged if its length matches the discipline.
///
/// # Panics
///
/// Panics on a length mismatch.
pub fn expect_len(discipline: Discipline, values: &[f32]) -> &[f32] {
    let expected = discipline.output_len();
    assert!(
        values.len() == expected,
        "{} input contract violated: expected {} values, got {}",
        discipline,
        expected,
        values.len()
    );
    values
}
