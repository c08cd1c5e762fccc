//! Seeded random placements for parity dumps and benchmarks.
//!
//! Feeding the same generated placements through this crate and through the
//! training pipeline is how encoder parity is checked. A fixed seed always
//! yields the same sequence of requests for the same material id list.

use std::io::Write;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::contract::Discipline;
use crate::features::{EngineeringSlots, SlotItem, SlotPlacement, ALL_SLOT_TYPES};
use crate::image::adornment::COORD_EXTENT;
use crate::image::{AdornmentGraph, AdornmentShape, GridPlacement, SmithingGrid, VertexPlacement};
use crate::request::EncodeRequest;

const GRID_SIZES: [u8; 4] = [3, 5, 7, 9];

/// Chance that a generated slot is left empty.
const EMPTY_SLOT_CHANCE: f64 = 0.3;

/// Chance that a generated id is not in the material list.
const UNKNOWN_ID_CHANCE: f64 = 0.05;

const UNKNOWN_ID: &str = "__unknown_material__";

/// Random placement generator over a fixed list of material ids.
pub struct Generator {
    rng: SmallRng,
    ids: Vec<String>,
}

impl Generator {
    /// Creates a generator. A seed of 0 draws from entropy.
    pub fn new<I, S>(ids: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rng = if seed != 0 {
            SmallRng::seed_from_u64(seed)
        } else {
            SmallRng::from_entropy()
        };
        Generator {
            rng,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    fn material(&mut self) -> String {
        if self.ids.is_empty() || self.rng.gen_bool(UNKNOWN_ID_CHANCE) {
            return UNKNOWN_ID.to_string();
        }
        self.ids
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_ID.to_string())
    }

    fn slots(&mut self, len: usize) -> SlotPlacement {
        (0..len)
            .map(|_| {
                if self.rng.gen_bool(EMPTY_SLOT_CHANCE) {
                    None
                } else {
                    let quantity = self.rng.gen_range(1..=5);
                    Some(SlotItem::new(self.material(), quantity))
                }
            })
            .collect()
    }

    fn station_tier(&mut self) -> u8 {
        self.rng.gen_range(1..=4)
    }

    pub fn smithing(&mut self) -> SmithingGrid {
        let grid_size = *GRID_SIZES.choose(&mut self.rng).unwrap_or(&9);
        let n = self.rng.gen_range(0..=usize::from(grid_size) * 2);
        let placements = (0..n)
            .map(|_| {
                let col = self.rng.gen_range(0..i32::from(grid_size));
                let row = self.rng.gen_range(0..i32::from(grid_size));
                GridPlacement::new(col, row, self.material())
            })
            .collect();
        SmithingGrid {
            grid_size,
            placements,
        }
    }

    pub fn adornment(&mut self) -> AdornmentGraph {
        let mut vertices: Vec<VertexPlacement> = Vec::new();
        let n = self.rng.gen_range(2..=8);
        while vertices.len() < n {
            let x = self.rng.gen_range(-COORD_EXTENT..=COORD_EXTENT);
            let y = self.rng.gen_range(-COORD_EXTENT..=COORD_EXTENT);
            let key = format!("{},{}", x, y);
            if vertices.iter().any(|v| v.key == key) {
                continue;
            }
            let material = if self.rng.gen_bool(EMPTY_SLOT_CHANCE) {
                None
            } else {
                Some(self.material())
            };
            vertices.push(VertexPlacement { key, material });
        }

        let shape_count = self.rng.gen_range(1..=2);
        let mut shapes = Vec::with_capacity(shape_count);
        for _ in 0..shape_count {
            let len = self.rng.gen_range(2..=vertices.len().min(4));
            let cycle: Vec<String> = vertices
                .choose_multiple(&mut self.rng, len)
                .map(|v| v.key.clone())
                .collect();
            let kind = match cycle.len() {
                2 => "line",
                3 => "triangle",
                _ => "square",
            };
            shapes.push(AdornmentShape::new(kind, cycle));
        }
        AdornmentGraph { vertices, shapes }
    }

    pub fn engineering(&mut self) -> EngineeringSlots {
        let mut slots = EngineeringSlots::new();
        for slot_type in ALL_SLOT_TYPES {
            if self.rng.gen_bool(0.5) {
                let len = self.rng.gen_range(1..=3);
                slots.insert(slot_type, self.slots(len));
            }
        }
        slots
    }

    /// Generates one request for the discipline.
    pub fn request(&mut self, discipline: Discipline) -> EncodeRequest {
        match discipline {
            Discipline::Smithing => EncodeRequest::Smithing(self.smithing()),
            Discipline::Adornment => EncodeRequest::Adornment(self.adornment()),
            Discipline::Alchemy => {
                let len = self.rng.gen_range(2..=8);
                EncodeRequest::Alchemy {
                    slots: self.slots(len),
                    station_tier: self.station_tier(),
                }
            }
            Discipline::Refining => {
                let core_len = self.rng.gen_range(1..=2);
                let spoke_len = self.rng.gen_range(0..=8);
                EncodeRequest::Refining {
                    core: self.slots(core_len),
                    spokes: self.slots(spoke_len),
                    station_tier: self.station_tier(),
                }
            }
            Discipline::Engineering => EncodeRequest::Engineering {
                slots: self.engineering(),
                station_tier: self.station_tier(),
            },
        }
    }
}

/// Writes requests as JSONL (one request object per line).
pub fn write_jsonl<W: Write>(requests: &[EncodeRequest], out: &mut W) -> std::io::Result<()> {
    for req in requests {
        serde_json::to_writer(&mut *out, req)?;
        writeln!(out)?;
    }
    out.flush()
}
