//! Integration tests for the crafting-preprocess binary.
//!
//! Spawns the encode server against the fixture material database, sends
//! request lines via stdin, and checks the JSON lines on stdout.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use serde_json::Value;

const MATERIALS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/materials.json");

/// Sends request lines to the server and collects stdout lines.
fn run_server(lines: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_crafting-preprocess");
    let mut child = Command::new(exe)
        .args(["--materials", MATERIALS])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start crafting-preprocess");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for line in lines {
        writeln!(stdin, "{}", line).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let out: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    out
}

fn values(line: &str) -> Vec<f64> {
    let v: Value = serde_json::from_str(line).unwrap();
    v["values"]
        .as_array()
        .unwrap_or_else(|| panic!("no values in {}", line))
        .iter()
        .map(|x| x.as_f64().unwrap())
        .collect()
}

#[test]
fn alchemy_copper_and_iron() {
    let lines = run_server(&[
        r#"{"discipline": "alchemy", "slots": [{"material": "copper_ore", "quantity": 2}, null, {"material": "iron_ore", "quantity": 1}, null, null, null], "station_tier": 2}"#,
        "quit",
    ]);
    assert_eq!(lines.len(), 1);
    let f = values(&lines[0]);
    assert_eq!(f.len(), 34);
    assert_eq!(f[0], 2.0);
    assert_eq!(f[1], 3.0);
    assert_eq!(f[2], 1.5);
    assert_eq!(f[22], 0.0);
    assert_eq!(f[23], 2.0);
    assert_eq!(f[33], 2.0);
}

#[test]
fn every_discipline_has_its_output_length() {
    let lines = run_server(&[
        r#"{"discipline": "smithing", "grid_size": 3, "placements": [{"col": 1, "row": 1, "material": "iron_ingot"}]}"#,
        r#"{"discipline": "adornment", "vertices": [{"key": "0,0", "material": "fire_crystal"}, {"key": "3,3", "material": null}], "shapes": [{"type": "line", "vertices": ["0,0", "3,3"]}]}"#,
        r#"{"discipline": "alchemy", "slots": [{"material": "sage", "quantity": 3}], "station_tier": 1}"#,
        r#"{"discipline": "refining", "core": [{"material": "iron_ore", "quantity": 2}], "spokes": [{"material": "oak_log", "quantity": 1}], "station_tier": 2}"#,
        r#"{"discipline": "engineering", "slots": {"FRAME": [{"material": "iron_ingot", "quantity": 2}], "POWER": [{"material": "fire_crystal", "quantity": 1}]}, "station_tier": 3}"#,
        "quit",
    ]);
    let expected = [
        ("smithing", 3888),
        ("adornment", 9408),
        ("alchemy", 34),
        ("refining", 19),
        ("engineering", 28),
    ];
    assert_eq!(lines.len(), expected.len());
    for (line, (name, len)) in lines.iter().zip(expected) {
        let v: Value = serde_json::from_str(line).unwrap();
        assert_eq!(v["discipline"], name);
        assert_eq!(values(line).len(), len, "{}", name);
    }
}

#[test]
fn smithing_image_is_centered() {
    let lines = run_server(&[
        r#"{"discipline": "smithing", "grid_size": 3, "placements": [{"col": 0, "row": 0, "material": "iron_ingot"}]}"#,
        "quit",
    ]);
    let img = values(&lines[0]);
    // A 3x3 grid starts at canvas cell (3, 3); the cell's top-left pixel
    // is (12, 12).
    let lit: Vec<usize> = (0..img.len() / 3)
        .filter(|&p| img[p * 3..p * 3 + 3].iter().any(|&c| c != 0.0))
        .collect();
    assert!(!lit.is_empty());
    for p in lit {
        let (y, x) = (p / 36, p % 36);
        assert!((12..16).contains(&y) && (12..16).contains(&x), "pixel ({}, {})", x, y);
    }
}

#[test]
fn unknown_material_encodes_as_zero_cell() {
    let lines = run_server(&[
        r#"{"discipline": "smithing", "grid_size": 9, "placements": [{"col": 4, "row": 4, "material": "unobtainium"}]}"#,
        "quit",
    ]);
    assert!(values(&lines[0]).iter().all(|&v| v == 0.0));
}

#[test]
fn malformed_lines_get_error_responses() {
    let lines = run_server(&[
        "not json",
        r#"{"discipline": "cooking"}"#,
        r#"{"discipline": "refining", "station_tier": 1}"#,
        "quit",
    ]);
    assert_eq!(lines.len(), 3);
    for line in &lines[..2] {
        let v: Value = serde_json::from_str(line).unwrap();
        assert!(v["error"].is_string(), "expected error, got {}", line);
    }
    assert_eq!(values(&lines[2]).len(), 19);
}

#[test]
fn blank_lines_are_skipped_and_quit_ends_session() {
    let lines = run_server(&[
        "",
        "   ",
        r#"{"discipline": "alchemy", "slots": [], "station_tier": 4}"#,
        "quit",
        r#"{"discipline": "alchemy", "slots": [], "station_tier": 4}"#,
    ]);
    assert_eq!(lines.len(), 1);
    let f = values(&lines[0]);
    assert!(f[..33].iter().all(|&v| v == 0.0));
    assert_eq!(f[33], 4.0);
}

#[test]
fn eof_without_quit_exits_cleanly() {
    let lines = run_server(&[r#"{"discipline": "refining", "station_tier": 3}"#]);
    assert_eq!(lines.len(), 1);
}

#[test]
fn missing_materials_flag_fails() {
    let exe = env!("CARGO_BIN_EXE_crafting-preprocess");
    let status = Command::new(exe)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("failed to start crafting-preprocess");
    assert!(!status.success());
}

#[test]
fn synth_output_is_accepted_by_server() {
    let exe = env!("CARGO_BIN_EXE_synth");
    let out = Command::new(exe)
        .args(["--materials", MATERIALS, "--count", "3", "--seed", "17"])
        .stderr(Stdio::null())
        .output()
        .expect("failed to start synth");
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let requests: Vec<&str> = text.lines().collect();
    assert_eq!(requests.len(), 15);

    let responses = run_server(&requests);
    assert_eq!(responses.len(), 15);
    for line in &responses {
        let v: Value = serde_json::from_str(line).unwrap();
        assert!(v["values"].is_array(), "unexpected response {}", line);
    }
}
