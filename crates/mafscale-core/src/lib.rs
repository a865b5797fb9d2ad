//! # MafScale Core Library
//!
//! Rescales a MAF sensor's voltage-to-airflow-volume calibration curve
//! from logged engine telemetry.
//!
//! This library provides:
//! - Datalog parsing (tablet and generic OBD schemas)
//! - Target-AFR table loading with bilinear lookup
//! - Weighted per-bin curve scaling with transient and heat-soak filtering
//! - Built-in factory calibration curves
//!
//! ## Example
//!
//! ```rust,ignore
//! use mafscale_core::prelude::*;
//!
//! let mut scaler = MafScaler::new(CurvePreset::Stock.bins(), None)?;
//! let records = read_log("drive.tsv")?;
//! let summary = scaler.ingest(records, &IngestOptions::default())?;
//! for bin in scaler.adjusted_bins() {
//!     println!("{} -> {}", bin.volts, bin.volume);
//! }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logfile;
pub mod presets;
pub mod scaler;
pub mod table;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ScaleError;
    pub use crate::logfile::{parse_log, read_log, FuelState, LogFormat, LogRecord};
    pub use crate::presets::CurvePreset;
    pub use crate::scaler::{AdjustedMafBin, IngestOptions, IngestSummary, MafBin, MafScaler};
    pub use crate::table::AfrTable;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
