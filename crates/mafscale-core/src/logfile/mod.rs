//! Engine datalog parsing
//!
//! Reads logged telemetry into flat records for the scaler. Two schemas
//! are supported, chosen by header sniffing: the tablet datalogger's
//! tab-separated format and a generic OBD export. The schemas disagree on
//! column tags, fuel-system status codes, and the open-loop correction
//! formula, so each record keeps its source format.

mod format;
mod obd;
mod tablet;

pub use format::LogFormat;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScaleError;
use crate::table::AfrTable;

/// Normalized fuel-system state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelState {
    /// The controller is actively correcting fueling from the O2 sensor.
    ClosedLoop,
    /// Fueling follows the commanded target without feedback.
    OpenLoop,
    /// Any status code the schema does not recognize.
    Unknown,
}

/// One time-stamped telemetry sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Schema this record was parsed from.
    pub format: LogFormat,
    /// Sample time in seconds from the start of the log.
    pub time: f64,
    /// Engine speed in rpm.
    pub engine_speed: f64,
    /// Engine load in g/rev.
    pub engine_load: f64,
    /// MAF sensor output voltage.
    pub maf_voltage: f64,
    /// Measured AFR, when the log carries a wideband channel.
    pub current_afr: Option<f64>,
    /// Commanded AFR, when logged.
    pub commanded_afr: Option<f64>,
    /// Short-term fuel trim in percent, when logged.
    pub st_fuel_trim: Option<f64>,
    /// Long-term fuel trim in percent.
    pub lt_fuel_trim: f64,
    /// Fuel-system state decoded from the schema's status code.
    pub fuel_state: FuelState,
    /// Intake air temperature in degrees Fahrenheit.
    pub intake_air_temp: f64,
}

impl LogRecord {
    /// The fractional airflow-volume correction this sample implies, or
    /// `None` when the record carries no usable correction signal.
    ///
    /// Closed-loop records derive the correction from the fuel trims.
    /// Open-loop records compare measured AFR against the target; the
    /// target falls back to `target_afr` when the log has no commanded
    /// AFR. The two schemas use structurally different open-loop formulas
    /// and they are intentionally not unified.
    pub fn volume_adjustment(&self, target_afr: Option<&AfrTable>) -> Option<f64> {
        match (self.fuel_state, self.format) {
            (FuelState::ClosedLoop, _) => {
                let st = self.st_fuel_trim?;
                Some((st + self.lt_fuel_trim) / 100.0)
            }
            (FuelState::OpenLoop, LogFormat::Tablet) => {
                let target = match self.commanded_afr {
                    Some(afr) => afr,
                    None => target_afr?.lookup(self.engine_load, self.engine_speed),
                };
                let current = self.current_afr?;
                Some((current - target) / target)
            }
            (FuelState::OpenLoop, LogFormat::Obd) => {
                let commanded = self.commanded_afr?;
                let current = self.current_afr?;
                Some(commanded / (current * (self.lt_fuel_trim + 100.0)) * 100.0)
            }
            (FuelState::Unknown, _) => None,
        }
    }
}

/// Read a datalog file, detecting the schema from its header.
pub fn read_log<P: AsRef<Path>>(path: P) -> Result<Vec<LogRecord>, ScaleError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let format = LogFormat::sniff(&content).ok_or_else(|| {
        ScaleError::FormatMismatch(format!(
            "'{}' matches no known datalog schema",
            path.display()
        ))
    })?;
    tracing::debug!("parsing '{}' as {:?}", path.display(), format);

    parse_log(&content, format)
}

/// Parse datalog text with an explicitly chosen schema.
pub fn parse_log(content: &str, format: LogFormat) -> Result<Vec<LogRecord>, ScaleError> {
    match format {
        LogFormat::Tablet => tablet::parse(content),
        LogFormat::Obd => obd::parse(content),
    }
}

fn column_index(header: &str, name: &str) -> Option<usize> {
    header.split('\t').position(|tag| tag.trim() == name)
}

fn required_column(header: &str, name: &str) -> Result<usize, ScaleError> {
    column_index(header, name)
        .ok_or_else(|| ScaleError::FormatMismatch(format!("missing required column '{name}'")))
}

fn required_cell(
    fields: &[&str],
    index: usize,
    name: &str,
    line_no: usize,
) -> Result<f64, ScaleError> {
    let cell = fields
        .get(index)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ScaleError::ParseError {
            line: line_no,
            message: format!("column '{name}' is empty"),
        })?;

    cell.parse::<f64>().map_err(|_| ScaleError::ParseError {
        line: line_no,
        message: format!("column '{name}': '{cell}' is not a number"),
    })
}

/// An absent column or empty cell is `None`; a present but malformed cell
/// is still an error.
fn optional_cell(
    fields: &[&str],
    index: Option<usize>,
    name: &str,
    line_no: usize,
) -> Result<Option<f64>, ScaleError> {
    let Some(index) = index else {
        return Ok(None);
    };
    let Some(cell) = fields.get(index).map(|c| c.trim()).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| ScaleError::ParseError {
            line: line_no,
            message: format!("column '{name}': '{cell}' is not a number"),
        })
}
