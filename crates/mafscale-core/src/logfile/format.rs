//! Log schema detection
//!
//! The two supported schemas are distinguished by their headers: tablet
//! logs open with a device banner and firmware version ahead of the
//! column header, OBD exports put the column header on the first line.

use serde::{Deserialize, Serialize};

use super::{obd, tablet};

/// Supported datalog schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Tablet datalogger TSV with a two-line device preamble.
    Tablet,
    /// Generic OBD export with a single header row.
    Obd,
}

impl LogFormat {
    /// Detect the schema from the first lines of a log, `None` when the
    /// content matches neither.
    pub fn sniff(content: &str) -> Option<Self> {
        let mut lines = content.lines();

        let first = lines.next()?;
        if first.contains('\t') && first.contains(obd::FUEL_STATE) {
            return Some(LogFormat::Obd);
        }

        // Skip the version line; the tablet column header is line three.
        lines.next()?;
        let header = lines.next()?;
        if header.contains('\t') && header.contains(tablet::FUEL_STATE) {
            return Some(LogFormat::Tablet);
        }

        None
    }
}
