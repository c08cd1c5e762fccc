//! Adornment graph -> 56x56x3 image encoding for the adornment CNN.
//!
//! Vertices live on an integer Cartesian plane `[-7, 7]^2` and map to pixels
//! at a scale of 4 with the y axis flipped. Shape edges are drawn first as
//! 3-pixel-wide Bresenham lines that blend where they cross; vertices are
//! drawn last as filled circles that overwrite whatever is beneath them.
//! Keys that are malformed or off the plane are skipped, as are the edges
//! that touch them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{pixel_index, Canvas};
use crate::material::{MaterialColorEncoder, MaterialLookup, Rgb, UNKNOWN_COLOR};

/// Pixels per side of the output image.
pub const ADORNMENT_IMAGE_SIZE: usize = 56;

/// Length of the flattened output image.
pub const ADORNMENT_IMAGE_LEN: usize = ADORNMENT_IMAGE_SIZE * ADORNMENT_IMAGE_SIZE * 3;

/// A flattened 56x56x3 adornment image.
pub type AdornmentImage = [f32; ADORNMENT_IMAGE_LEN];

/// Largest coordinate magnitude on the placement plane.
pub const COORD_EXTENT: i32 = 7;

/// Pixels per coordinate unit.
const COORD_SCALE: i32 = 4;

/// Brush half-width for edges: a 3x3 stamp.
const EDGE_BRUSH_RADIUS: i32 = 1;

const VERTEX_RADIUS: i32 = 3;

/// Color of an edge whose endpoints both lack a material.
const BARE_EDGE_COLOR: Rgb = UNKNOWN_COLOR;

/// A vertex position on the placement plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Maps to image pixels: `((x + 7) * 4, (7 - y) * 4)`.
    pub fn to_pixel(self) -> (i32, i32) {
        (
            (self.x + COORD_EXTENT) * COORD_SCALE,
            (COORD_EXTENT - self.y) * COORD_SCALE,
        )
    }
}

/// Errors that can occur while parsing a `"x,y"` coordinate key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordKeyError {
    #[error("invalid coordinate key: '{0}'")]
    Malformed(String),

    #[error("coordinate key '{0}' outside [-7, 7]")]
    OutOfRange(String),
}

impl FromStr for Coord {
    type Err = CoordKeyError;

    /// Parses `"x,y"`. Both components must lie in `[-7, 7]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordKeyError::Malformed(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(malformed)?;
        let x: i32 = x.trim().parse().map_err(|_| malformed())?;
        let y: i32 = y.trim().parse().map_err(|_| malformed())?;
        let extent = -COORD_EXTENT..=COORD_EXTENT;
        if !extent.contains(&x) || !extent.contains(&y) {
            return Err(CoordKeyError::OutOfRange(s.to_string()));
        }
        Ok(Coord { x, y })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A vertex keyed by its `"x,y"` coordinate, optionally holding a material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexPlacement {
    pub key: String,
    #[serde(default)]
    pub material: Option<String>,
}

impl VertexPlacement {
    pub fn new(key: impl Into<String>, material: Option<&str>) -> Self {
        VertexPlacement {
            key: key.into(),
            material: material.map(str::to_string),
        }
    }
}

/// A closed polygon over vertex keys; edges join consecutive keys and wrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdornmentShape {
    #[serde(rename = "type", default)]
    pub shape_type: String,
    pub vertices: Vec<String>,
}

impl AdornmentShape {
    pub fn new<I, S>(shape_type: impl Into<String>, vertices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AdornmentShape {
            shape_type: shape_type.into(),
            vertices: vertices.into_iter().map(Into::into).collect(),
        }
    }

    /// Consecutive vertex pairs, including the closing pair.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        let n = self.vertices.len();
        (0..n).map(move |i| {
            (
                self.vertices[i].as_str(),
                self.vertices[(i + 1) % n].as_str(),
            )
        })
    }
}

/// Placement state of an adornment station.
///
/// `vertices` is ordered: circles are drawn in this order, so when two
/// vertices overlap the later one is on top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdornmentGraph {
    #[serde(default)]
    pub vertices: Vec<VertexPlacement>,
    #[serde(default)]
    pub shapes: Vec<AdornmentShape>,
}

/// Calls `plot` for every point of the Bresenham line from `from` to `to`,
/// endpoints included.
pub fn bresenham_line(from: (i32, i32), to: (i32, i32), mut plot: impl FnMut(i32, i32)) {
    let (mut x, mut y) = from;
    let dx = (to.0 - from.0).abs();
    let dy = (to.1 - from.1).abs();
    let sx = if from.0 < to.0 { 1 } else { -1 };
    let sy = if from.1 < to.1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        plot(x, y);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Renders adornment graphs through an injected material lookup.
pub struct AdornmentPreprocessor<'a, L: ?Sized> {
    colors: MaterialColorEncoder<'a, L>,
}

impl<'a, L: MaterialLookup + ?Sized> AdornmentPreprocessor<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        AdornmentPreprocessor {
            colors: MaterialColorEncoder::new(lookup),
        }
    }

    /// Renders a graph into a flat 56x56x3 image.
    pub fn preprocess_graph(&self, graph: &AdornmentGraph) -> AdornmentImage {
        self.preprocess(&graph.vertices, &graph.shapes)
    }

    /// Renders ordered vertices and shapes. Edges go down first, in shape
    /// order; vertex circles follow, in vertex order.
    pub fn preprocess(&self, vertices: &[VertexPlacement], shapes: &[AdornmentShape]) -> AdornmentImage {
        let mut canvas = Canvas::<ADORNMENT_IMAGE_LEN>::new(ADORNMENT_IMAGE_SIZE);

        let mut parsed: Vec<(Coord, Option<&str>)> = Vec::with_capacity(vertices.len());
        let mut materials: HashMap<Coord, Option<&str>> = HashMap::with_capacity(vertices.len());
        for v in vertices {
            match v.key.parse::<Coord>() {
                Ok(coord) => {
                    parsed.push((coord, v.material.as_deref()));
                    materials.insert(coord, v.material.as_deref());
                }
                Err(e) => tracing::debug!(error = %e, "adornment vertex skipped"),
            }
        }

        for shape in shapes {
            for (a, b) in shape.edges() {
                let (Ok(start), Ok(end)) = (a.parse::<Coord>(), b.parse::<Coord>()) else {
                    tracing::debug!(from = a, to = b, "adornment edge with bad key skipped");
                    continue;
                };
                let mat_a = materials.get(&start).copied().flatten();
                let mat_b = materials.get(&end).copied().flatten();
                let color = self.edge_color(mat_a, mat_b);
                draw_edge(&mut canvas, start.to_pixel(), end.to_pixel(), color);
            }
        }

        for (coord, material) in parsed {
            if let Some(material) = material {
                let color = self.colors.encode(Some(material));
                draw_vertex(&mut canvas, coord.to_pixel(), color);
            }
        }

        tracing::trace!(
            vertices = vertices.len(),
            shapes = shapes.len(),
            "encoded adornment graph"
        );
        canvas.into_pixels()
    }

    /// Average of the placed endpoint colors, or gray for a bare edge.
    fn edge_color(&self, a: Option<&str>, b: Option<&str>) -> Rgb {
        match (a, b) {
            (Some(a), Some(b)) => {
                let ca = self.colors.encode(Some(a));
                let cb = self.colors.encode(Some(b));
                [
                    (ca[0] + cb[0]) / 2.0,
                    (ca[1] + cb[1]) / 2.0,
                    (ca[2] + cb[2]) / 2.0,
                ]
            }
            (Some(m), None) | (None, Some(m)) => self.colors.encode(Some(m)),
            (None, None) => BARE_EDGE_COLOR,
        }
    }
}

/// Stamps a 3x3 brush along the line, blending each stamped pixel.
fn draw_edge(canvas: &mut Canvas<ADORNMENT_IMAGE_LEN>, from: (i32, i32), to: (i32, i32), color: Rgb) {
    bresenham_line(from, to, |x, y| {
        for dy in -EDGE_BRUSH_RADIUS..=EDGE_BRUSH_RADIUS {
            for dx in -EDGE_BRUSH_RADIUS..=EDGE_BRUSH_RADIUS {
                if let Some((px, py)) = canvas.clip(x + dx, y + dy) {
                    canvas.blend(px, py, color);
                }
            }
        }
    });
}

/// Fills a radius-3 disc (`dx^2 + dy^2 <= 9`), overwriting.
fn draw_vertex(canvas: &mut Canvas<ADORNMENT_IMAGE_LEN>, center: (i32, i32), color: Rgb) {
    let r = VERTEX_RADIUS;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                if let Some((px, py)) = canvas.clip(center.0 + dx, center.1 + dy) {
                    canvas.set(px, py, color);
                }
            }
        }
    }
}

/// Flat offset of channel 0 of pixel (`x`, `y`) in an adornment image.
pub fn adornment_pixel_index(x: usize, y: usize) -> usize {
    pixel_index(ADORNMENT_IMAGE_SIZE, x, y)
}
