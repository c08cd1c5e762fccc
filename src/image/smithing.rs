//! Smithing grid -> 36x36x3 image encoding for the smithing CNN.
//!
//! The station's active grid (3, 5, 7 or 9 cells wide) is centered on a
//! fixed 9x9 canvas. Every cell becomes a 4x4 pixel block whose colored
//! pixels are selected by two masks: a shape mask keyed by the material's
//! category and a centered square fill mask keyed by its tier.
//!
//! Layout is row-major, channel-last: `index = (row * 36 + col) * 3 + channel`.

use serde::{Deserialize, Serialize};

use super::{pixel_index, Canvas};
use crate::material::{MaterialColorEncoder, MaterialInfo, MaterialLookup};

/// Cells per side of the canvas every grid is centered on.
pub const CANVAS_CELLS: usize = 9;

/// Pixels per side of one cell.
pub const CELL_PIXELS: usize = 4;

/// Pixels per side of the output image.
pub const SMITHING_IMAGE_SIZE: usize = CANVAS_CELLS * CELL_PIXELS;

/// Length of the flattened output image.
pub const SMITHING_IMAGE_LEN: usize = SMITHING_IMAGE_SIZE * SMITHING_IMAGE_SIZE * 3;

/// A flattened 36x36x3 smithing image.
pub type SmithingImage = [f32; SMITHING_IMAGE_LEN];

type Mask = [[u8; CELL_PIXELS]; CELL_PIXELS];

const SOLID: Mask = [[1, 1, 1, 1], [1, 1, 1, 1], [1, 1, 1, 1], [1, 1, 1, 1]];
const HORIZONTAL_STRIPES: Mask = [[1, 1, 1, 1], [0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0]];
const X_PATTERN: Mask = [[1, 0, 0, 1], [0, 1, 1, 0], [0, 1, 1, 0], [1, 0, 0, 1]];
const DIAMOND: Mask = [[0, 1, 1, 0], [1, 1, 1, 1], [1, 1, 1, 1], [0, 1, 1, 0]];
const EMPTY_MASK: Mask = [[0; CELL_PIXELS]; CELL_PIXELS];

/// A single material placed on the smithing grid.
///
/// Coordinates are zero-based and relative to the active grid size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPlacement {
    pub col: i32,
    pub row: i32,
    pub material: String,
}

impl GridPlacement {
    pub fn new(col: i32, row: i32, material: impl Into<String>) -> Self {
        GridPlacement {
            col,
            row,
            material: material.into(),
        }
    }
}

/// Sparse placement state of a smithing station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmithingGrid {
    /// Active station width in cells: 3, 5, 7 or 9.
    pub grid_size: u8,
    #[serde(default)]
    pub placements: Vec<GridPlacement>,
}

/// Shape mask for a material category.
fn shape_mask(category: &str) -> &'static Mask {
    match category {
        "metal" => &SOLID,
        "wood" => &HORIZONTAL_STRIPES,
        "stone" => &X_PATTERN,
        "monster_drop" | "elemental" => &DIAMOND,
        _ => &SOLID,
    }
}

/// Centered square fill mask whose side equals the tier.
fn tier_mask(tier: u8) -> Mask {
    let side = match tier {
        1..=4 => tier as usize,
        _ => CELL_PIXELS,
    };
    let start = (CELL_PIXELS - side) / 2;
    let mut mask = EMPTY_MASK;
    for row in mask.iter_mut().skip(start).take(side) {
        for px in row.iter_mut().skip(start).take(side) {
            *px = 1;
        }
    }
    mask
}

/// Places sparse grid coordinates on the dense 9x9 canvas.
///
/// Positions that land outside the canvas after centering are dropped.
/// Later placements at the same cell replace earlier ones.
fn center_on_canvas<'p>(
    placements: &'p [GridPlacement],
    active_grid_size: u8,
) -> [[Option<&'p str>; CANVAS_CELLS]; CANVAS_CELLS] {
    let offset = (CANVAS_CELLS as i32 - active_grid_size as i32).div_euclid(2);
    let mut dense = [[None; CANVAS_CELLS]; CANVAS_CELLS];

    let on_canvas = |v: i32| {
        offset
            .checked_add(v)
            .filter(|c| (0..CANVAS_CELLS as i32).contains(c))
            .map(|c| c as usize)
    };

    for p in placements {
        if let (Some(col), Some(row)) = (on_canvas(p.col), on_canvas(p.row)) {
            dense[row][col] = Some(p.material.as_str());
        } else {
            tracing::debug!(
                col = p.col,
                row = p.row,
                active_grid_size,
                material = %p.material,
                "smithing placement outside canvas, dropped"
            );
        }
    }
    dense
}

/// Renders smithing grids through an injected material lookup.
pub struct SmithingPreprocessor<'a, L: ?Sized> {
    colors: MaterialColorEncoder<'a, L>,
}

impl<'a, L: MaterialLookup + ?Sized> SmithingPreprocessor<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        SmithingPreprocessor {
            colors: MaterialColorEncoder::new(lookup),
        }
    }

    /// Renders a grid into a flat 36x36x3 image.
    pub fn preprocess_grid(&self, grid: &SmithingGrid) -> SmithingImage {
        self.preprocess(&grid.placements, grid.grid_size)
    }

    /// Renders sparse placements for the given active grid size.
    ///
    /// An empty grid yields an all-zero image.
    pub fn preprocess(&self, placements: &[GridPlacement], active_grid_size: u8) -> SmithingImage {
        let dense = center_on_canvas(placements, active_grid_size);
        let mut canvas = Canvas::<SMITHING_IMAGE_LEN>::new(SMITHING_IMAGE_SIZE);

        for (row, cells) in dense.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(material) = cell {
                    self.draw_cell(&mut canvas, row, col, material);
                }
            }
        }

        tracing::trace!(
            placements = placements.len(),
            active_grid_size,
            "encoded smithing grid"
        );
        canvas.into_pixels()
    }

    fn draw_cell(&self, canvas: &mut Canvas<SMITHING_IMAGE_LEN>, row: usize, col: usize, material: &str) {
        let color = self.colors.encode(Some(material));
        let info: Option<&MaterialInfo> = self.colors.material_data(material);
        let (shape, fill) = match info {
            Some(info) => (shape_mask(&info.category), tier_mask(info.tier)),
            // Unknown materials keep the default shape but fill nothing.
            None => (&SOLID, EMPTY_MASK),
        };

        for py in 0..CELL_PIXELS {
            for px in 0..CELL_PIXELS {
                let weight = f64::from(shape[py][px] * fill[py][px]);
                let y = row * CELL_PIXELS + py;
                let x = col * CELL_PIXELS + px;
                canvas.set(x, y, [color[0] * weight, color[1] * weight, color[2] * weight]);
            }
        }
    }
}

/// Flat offset of channel 0 of pixel (`x`, `y`) in a smithing image.
pub fn smithing_pixel_index(x: usize, y: usize) -> usize {
    pixel_index(SMITHING_IMAGE_SIZE, x, y)
}
