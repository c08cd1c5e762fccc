//! Image encoders for the CNN-backed crafting disciplines.
//!
//! Both encoders write into a square, row-major, channel-last `f32` buffer.
//! Colors are computed in `f64` and rounded once when stored.

pub mod adornment;
pub mod smithing;

pub use adornment::{
    AdornmentGraph, AdornmentImage, AdornmentPreprocessor, AdornmentShape, Coord, VertexPlacement,
    ADORNMENT_IMAGE_LEN, ADORNMENT_IMAGE_SIZE,
};
pub use smithing::{
    GridPlacement, SmithingGrid, SmithingImage, SmithingPreprocessor, SMITHING_IMAGE_LEN,
    SMITHING_IMAGE_SIZE,
};

use crate::material::Rgb;

/// Flat offset of channel 0 of pixel (`x`, `y`) in a square image.
#[inline]
pub fn pixel_index(width: usize, x: usize, y: usize) -> usize {
    (y * width + x) * 3
}

/// A square RGB pixel buffer of `N` floats.
pub(crate) struct Canvas<const N: usize> {
    pixels: [f32; N],
    width: usize,
}

impl<const N: usize> Canvas<N> {
    pub(crate) fn new(width: usize) -> Self {
        debug_assert_eq!(width * width * 3, N);
        Canvas {
            pixels: [0.0; N],
            width,
        }
    }

    /// Returns the in-bounds pixel position for signed coordinates.
    pub(crate) fn clip(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let w = self.width as i32;
        if x >= 0 && y >= 0 && x < w && y < w {
            Some((x as usize, y as usize))
        } else {
            None
        }
    }

    pub(crate) fn get(&self, x: usize, y: usize) -> [f32; 3] {
        let i = pixel_index(self.width, x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Overwrites a pixel.
    pub(crate) fn set(&mut self, x: usize, y: usize, color: Rgb) {
        let i = pixel_index(self.width, x, y);
        for c in 0..3 {
            self.pixels[i + c] = color[c] as f32;
        }
    }

    /// Averages with the existing color if the pixel is already painted,
    /// otherwise overwrites.
    pub(crate) fn blend(&mut self, x: usize, y: usize, color: Rgb) {
        let old = self.get(x, y);
        if old.iter().any(|&c| c != 0.0) {
            let mixed = [
                (f64::from(old[0]) + color[0]) / 2.0,
                (f64::from(old[1]) + color[1]) / 2.0,
                (f64::from(old[2]) + color[2]) / 2.0,
            ];
            self.set(x, y, mixed);
        } else {
            self.set(x, y, color);
        }
    }

    pub(crate) fn into_pixels(self) -> [f32; N] {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_overwrites_black_and_averages_color() {
        let mut canvas = Canvas::<12>::new(2);
        canvas.blend(1, 0, [0.4, 0.0, 0.2]);
        assert_eq!(canvas.get(1, 0), [0.4, 0.0, 0.2]);
        canvas.blend(1, 0, [0.0, 0.6, 0.2]);
        assert_eq!(canvas.get(1, 0), [0.2, 0.3, 0.2]);
        assert_eq!(canvas.get(0, 1), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn clip_rejects_outside() {
        let canvas = Canvas::<12>::new(2);
        assert_eq!(canvas.clip(1, 1), Some((1, 1)));
        assert_eq!(canvas.clip(-1, 0), None);
        assert_eq!(canvas.clip(0, 2), None);
    }
}
