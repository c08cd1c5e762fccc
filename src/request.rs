//! JSON request/response envelopes for out-of-process encoding.
//!
//! One request per line, tagged by discipline:
//!
//! ```json
//! {"discipline": "smithing", "grid_size": 3, "placements": [{"col": 0, "row": 1, "material": "iron_ingot"}]}
//! {"discipline": "alchemy", "slots": [{"material": "sage", "quantity": 2}, null], "station_tier": 2}
//! ```

use serde::{Deserialize, Serialize};

use crate::contract::{expect_len, Discipline};
use crate::features::{
    AlchemyFeatureExtractor, EngineeringFeatureExtractor, EngineeringSlots,
    RefiningFeatureExtractor, SlotPlacement,
};
use crate::image::{AdornmentGraph, AdornmentPreprocessor, SmithingGrid, SmithingPreprocessor};
use crate::material::MaterialLookup;

/// Errors that can occur while reading a request line.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),
}

/// A placement to encode, tagged by discipline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "discipline", rename_all = "lowercase")]
pub enum EncodeRequest {
    Smithing(SmithingGrid),
    Adornment(AdornmentGraph),
    Alchemy {
        slots: SlotPlacement,
        station_tier: u8,
    },
    Refining {
        #[serde(default)]
        core: SlotPlacement,
        #[serde(default)]
        spokes: SlotPlacement,
        station_tier: u8,
    },
    Engineering {
        slots: EngineeringSlots,
        station_tier: u8,
    },
}

/// Encoder output for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub discipline: Discipline,
    pub values: Vec<f32>,
}

impl EncodeRequest {
    /// Parses a single JSON request line.
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn discipline(&self) -> Discipline {
        match self {
            EncodeRequest::Smithing(_) => Discipline::Smithing,
            EncodeRequest::Adornment(_) => Discipline::Adornment,
            EncodeRequest::Alchemy { .. } => Discipline::Alchemy,
            EncodeRequest::Refining { .. } => Discipline::Refining,
            EncodeRequest::Engineering { .. } => Discipline::Engineering,
        }
    }

    /// Runs the discipline's encoder against a lookup snapshot.
    pub fn encode<L: MaterialLookup + ?Sized>(&self, lookup: &L) -> EncodeResponse {
        let values: Vec<f32> = match self {
            EncodeRequest::Smithing(grid) => {
                SmithingPreprocessor::new(lookup).preprocess_grid(grid).to_vec()
            }
            EncodeRequest::Adornment(graph) => {
                AdornmentPreprocessor::new(lookup).preprocess_graph(graph).to_vec()
            }
            EncodeRequest::Alchemy {
                slots,
                station_tier,
            } => AlchemyFeatureExtractor::new(lookup)
                .extract(slots, *station_tier)
                .to_vec(),
            EncodeRequest::Refining {
                core,
                spokes,
                station_tier,
            } => RefiningFeatureExtractor::new(lookup)
                .extract(core, spokes, *station_tier)
                .to_vec(),
            EncodeRequest::Engineering {
                slots,
                station_tier,
            } => EngineeringFeatureExtractor::new(lookup)
                .extract(slots, *station_tier)
                .to_vec(),
        };
        let discipline = self.discipline();
        expect_len(discipline, &values);
        EncodeResponse { discipline, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{SlotItem, SlotType};
    use crate::material::MaterialInfo;
    use std::collections::HashMap;

    fn fixture() -> HashMap<String, MaterialInfo> {
        let mut m = HashMap::new();
        m.insert("iron_ingot".into(), MaterialInfo::new("metal", 2, ["refined"]));
        m.insert("sage".into(), MaterialInfo::new("herb", 1, Vec::<String>::new()));
        m
    }

    #[test]
    fn parses_each_discipline() {
        let lines = [
            r#"{"discipline": "smithing", "grid_size": 3, "placements": [{"col": 0, "row": 1, "material": "iron_ingot"}]}"#,
            r#"{"discipline": "adornment", "vertices": [{"key": "0,0", "material": "iron_ingot"}], "shapes": []}"#,
            r#"{"discipline": "alchemy", "slots": [{"material": "sage", "quantity": 2}, null], "station_tier": 2}"#,
            r#"{"discipline": "refining", "core": [{"material": "iron_ingot", "quantity": 1}], "station_tier": 1}"#,
            r#"{"discipline": "engineering", "slots": {"FRAME": [{"material": "iron_ingot", "quantity": 3}]}, "station_tier": 3}"#,
        ];
        let db = fixture();
        for (line, expected) in lines.iter().zip([
            Discipline::Smithing,
            Discipline::Adornment,
            Discipline::Alchemy,
            Discipline::Refining,
            Discipline::Engineering,
        ]) {
            let req = EncodeRequest::parse(line).unwrap();
            assert_eq!(req.discipline(), expected);
            let resp = req.encode(&db);
            assert_eq!(resp.discipline, expected);
            assert_eq!(resp.values.len(), expected.output_len());
        }
    }

    #[test]
    fn refining_sides_default_to_empty() {
        let req = EncodeRequest::parse(r#"{"discipline": "refining", "station_tier": 4}"#).unwrap();
        assert_eq!(
            req,
            EncodeRequest::Refining {
                core: vec![],
                spokes: vec![],
                station_tier: 4
            }
        );
    }

    #[test]
    fn rejects_unknown_discipline_and_slot_type() {
        assert!(EncodeRequest::parse(r#"{"discipline": "cooking"}"#).is_err());
        assert!(EncodeRequest::parse(
            r#"{"discipline": "engineering", "slots": {"ARMOR": []}, "station_tier": 1}"#
        )
        .is_err());
        assert!(EncodeRequest::parse("not json").is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let mut slots = EngineeringSlots::new();
        slots.insert(SlotType::Core, vec![Some(SlotItem::new("iron_ingot", 1)), None]);
        let req = EncodeRequest::Engineering {
            slots,
            station_tier: 2,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""discipline":"engineering""#));
        assert_eq!(EncodeRequest::parse(&json).unwrap(), req);
    }

    #[test]
    fn response_serializes_values() {
        let db = fixture();
        let req = EncodeRequest::Alchemy {
            slots: vec![Some(SlotItem::new("sage", 2))],
            station_tier: 1,
        };
        let json = serde_json::to_string(&req.encode(&db)).unwrap();
        assert!(json.starts_with(r#"{"discipline":"alchemy","values":[1.0,2.0,2.0,1.0,2.0,-1.0"#));
    }
}
