//! Synthetic request generation CLI.
//!
//! Generates random placements from a material database and writes them
//! as encode-request JSONL, for parity dumps against the training pipeline.
//!
//! Usage:
//!   cargo run --release --bin synth -- --materials PATH [OPTIONS]
//!
//! Options:
//!   --materials PATH  Material database JSON (required)
//!   --count N         Requests per discipline (default: 100)
//!   --seed N          Random seed, 0 for entropy (default: 0)
//!   --discipline D    One discipline, or "all" (default: all)
//!   --output FILE     Output file path (default: stdout)

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::str::FromStr;

use crafting_preprocess::contract::ALL_DISCIPLINES;
use crafting_preprocess::synth::{self, Generator};
use crafting_preprocess::{Discipline, EncodeRequest, MaterialDatabase};

fn next_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|a| a.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut materials: Option<PathBuf> = None;
    let mut count: usize = 100;
    let mut seed: u64 = 0;
    let mut disciplines: Vec<Discipline> = ALL_DISCIPLINES.to_vec();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--materials" => {
                i += 1;
                materials = Some(next_value(&args, i, "--materials"));
            }
            "--count" => {
                i += 1;
                count = next_value(&args, i, "--count");
            }
            "--seed" => {
                i += 1;
                seed = next_value(&args, i, "--seed");
            }
            "--discipline" => {
                i += 1;
                let name: String = next_value(&args, i, "--discipline");
                if name != "all" {
                    match name.parse::<Discipline>() {
                        Ok(d) => disciplines = vec![d],
                        Err(e) => {
                            eprintln!("{}", e);
                            std::process::exit(1);
                        }
                    }
                }
            }
            "--output" => {
                i += 1;
                output_path = Some(next_value(&args, i, "--output"));
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(path) = materials else {
        print_usage();
        std::process::exit(1);
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let db = match MaterialDatabase::load(&path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut generator = Generator::new(db.ids().map(str::to_string), seed);
    let requests: Vec<EncodeRequest> = disciplines
        .iter()
        .flat_map(|&d| (0..count).map(move |_| d))
        .map(|d| generator.request(d))
        .collect();

    let result = match &output_path {
        Some(path) => File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            synth::write_jsonl(&requests, &mut writer)
        }),
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            synth::write_jsonl(&requests, &mut writer)
        }
    };

    match result {
        Ok(()) => tracing::info!(
            requests = requests.len(),
            output = output_path.as_deref().unwrap_or("stdout"),
            "wrote synthetic requests"
        ),
        Err(e) => {
            eprintln!("failed to write output: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: synth --materials PATH [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --materials PATH  Material database JSON (required)");
    eprintln!("  --count N         Requests per discipline (default: 100)");
    eprintln!("  --seed N          Random seed, 0 for entropy (default: 0)");
    eprintln!("  --discipline D    One discipline, or \"all\" (default: all)");
    eprintln!("  --output FILE     Output file path (default: stdout)");
    eprintln!("  --help            Show this help");
}
