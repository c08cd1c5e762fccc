//! Crafting preprocess -- a line-oriented encode server.
//!
//! Reads one JSON encode request per stdin line and writes one JSON
//! response per stdout line. `quit` ends the session.
//!
//! Usage:
//!   crafting-preprocess --materials PATH

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crafting_preprocess::{EncodeRequest, MaterialDatabase};

fn print_usage() {
    eprintln!("Usage: crafting-preprocess --materials PATH");
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();
}

/// Writes an error line in place of a response.
fn write_error(out: &mut impl Write, message: &str) -> io::Result<()> {
    let line = serde_json::json!({ "error": message });
    writeln!(out, "{}", line)
}

/// Runs the request loop against one material snapshot.
fn serve(db: &MaterialDatabase) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut served = 0usize;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" {
            break;
        }

        match EncodeRequest::parse(trimmed) {
            Ok(req) => {
                let resp = req.encode(db);
                match serde_json::to_string(&resp) {
                    Ok(json) => writeln!(out, "{}", json)?,
                    Err(e) => write_error(&mut out, &e.to_string())?,
                }
                served += 1;
            }
            Err(e) => {
                tracing::debug!(error = %e, "rejected request line");
                write_error(&mut out, &e.to_string())?;
            }
        }
        out.flush()?;
    }

    tracing::info!(served, "session ended");
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut materials: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--materials" => {
                i += 1;
                match args.get(i) {
                    Some(p) => materials = Some(PathBuf::from(p)),
                    None => {
                        eprintln!("--materials needs a path");
                        std::process::exit(1);
                    }
                }
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

    init_tracing();

    let db = match MaterialDatabase::load(&path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = serve(&db) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
