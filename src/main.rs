// Command-line runner for the flydentify engine: feeds an ordered image
// sequence through the analyzer and prints the per-fly summary table.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flydentify::{Analyzer, DetectorConfig};

/// Detects dark blobs in an ordered image sequence and tracks each one as a
/// persistent fly across frames.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Image files or directories of images. Directories are expanded and
    /// sorted by file name; files are analyzed in the order given.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Minimum pixel count for a dark region to count as a fly.
    #[arg(long, default_value_t = 10)]
    size_threshold: usize,

    /// Luminance cutoff separating dark objects from the light background.
    #[arg(long, default_value_t = 200)]
    contrast_threshold: u8,

    /// First frame of the report range.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Last frame of the report range (defaults to the final frame).
    #[arg(long)]
    end: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut paths: Vec<PathBuf> = Vec::new();
    for input in &args.inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("reading directory {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file())
                .collect();
            entries.sort();
            paths.extend(entries);
        } else {
            paths.push(input.clone());
        }
    }
    if paths.is_empty() {
        bail!("no input images found");
    }

    let mut analyzer = Analyzer::new(DetectorConfig {
        size_threshold: args.size_threshold,
        contrast_threshold: args.contrast_threshold,
    });
    for path in &paths {
        analyzer
            .analyze_file(path)
            .with_context(|| format!("analyzing {}", path.display()))?;
    }

    let last_frame = analyzer.total_frames() - 1;
    let end = args.end.unwrap_or(last_frame);

    println!(
        "{:<8}, {:<14}, {:<14}, {:<14}",
        "fly", "avg vel x", "avg vel y", "total distance"
    );
    for row in analyzer.data_rows(args.start, end) {
        println!("{row}");
    }

    Ok(())
}
