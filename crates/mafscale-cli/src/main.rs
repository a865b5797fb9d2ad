//! MafScale console front-end
//!
//! Reads one or more engine datalogs, feeds them through a [`MafScaler`],
//! and prints the adjusted calibration curve.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum, ValueHint};
use tracing_subscriber::EnvFilter;

use mafscale_core::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rescale a MAF calibration curve from engine datalogs", long_about = None)]
struct Cli {
    /// Datalog files to ingest
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    logs: Vec<PathBuf>,

    /// Starting calibration curve
    #[arg(long, value_enum, default_value_t = CurveArg::Stock)]
    curve: CurveArg,

    /// Target-AFR table for open-loop records without a commanded AFR
    #[arg(long, value_hint = ValueHint::FilePath)]
    afr_table: Option<PathBuf>,

    /// Ignore closed-loop records
    #[arg(long)]
    no_closed_loop: bool,

    /// Ignore open-loop records
    #[arg(long)]
    no_open_loop: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CurveArg {
    Stock,
    CaiSmall,
    CaiLarge,
}

impl From<CurveArg> for CurvePreset {
    fn from(arg: CurveArg) -> Self {
        match arg {
            CurveArg::Stock => CurvePreset::Stock,
            CurveArg::CaiSmall => CurvePreset::CaiSmall,
            CurveArg::CaiLarge => CurvePreset::CaiLarge,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let afr_table = match &cli.afr_table {
        Some(path) => Some(
            AfrTable::from_file(path)
                .with_context(|| format!("loading AFR table '{}'", path.display()))?,
        ),
        None => None,
    };

    let preset: CurvePreset = cli.curve.into();
    let mut scaler = MafScaler::new(preset.bins(), afr_table)?;

    let options = IngestOptions {
        include_closed_loop: !cli.no_closed_loop,
        include_open_loop: !cli.no_open_loop,
    };

    for path in &cli.logs {
        // A failed file contributes nothing; keep going with the rest.
        match apply_log(&mut scaler, path, &options) {
            Ok(summary) => println!(
                "Read {} records from '{}'. Keeping {} CL and {} OL records with an IAT between {:.1} and {:.1}, averaging {:.1}.",
                summary.loaded_records,
                stem(path),
                summary.closed_loop_kept,
                summary.open_loop_kept,
                summary.iat_min,
                summary.iat_max,
                summary.iat_avg
            ),
            Err(err) => eprintln!("skipping '{}': {err}", path.display()),
        }
    }

    println!();

    for bin in scaler.adjusted_bins() {
        println!(
            "{} ({:.2} samples over {:.2} seconds)",
            format_volume(bin.volume),
            bin.sample_count,
            bin.sample_seconds
        );
    }

    Ok(())
}

fn apply_log(
    scaler: &mut MafScaler,
    path: &Path,
    options: &IngestOptions,
) -> std::result::Result<IngestSummary, ScaleError> {
    let records = read_log(path)?;
    scaler.ingest(records, options)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a volume to 6 significant digits, padded with a decimal point
/// and trailing zeros to a minimum width of 7 characters.
fn format_volume(volume: f64) -> String {
    let mut text = if volume == 0.0 {
        "0".to_string()
    } else {
        let magnitude = volume.abs().log10().floor() as i32;
        let decimals = (5 - magnitude).max(0) as usize;
        let rounded = format!("{volume:.decimals$}");

        if rounded.contains('.') {
            rounded
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        } else {
            rounded
        }
    };

    if !text.contains('.') {
        text.push('.');
    }
    while text.len() < 7 {
        text.push('0');
    }

    text
}
