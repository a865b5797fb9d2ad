//! Target AFR table
//!
//! A two-dimensional lookup table giving the target air-fuel ratio as a
//! function of engine load (columns) and engine speed (rows). Used to
//! estimate the commanded AFR for open-loop records that do not log one.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScaleError;

/// A 2D target-AFR table with bilinear cell lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfrTable {
    column_ref: Vec<f64>,
    row_ref: Vec<f64>,
    cells: Vec<Vec<f64>>,
}

impl AfrTable {
    /// Create a table from reference axes and a cell grid.
    ///
    /// The grid must have one row per row reference and every row must be
    /// exactly as wide as the column reference list.
    pub fn new(
        column_ref: Vec<f64>,
        row_ref: Vec<f64>,
        cells: Vec<Vec<f64>>,
    ) -> Result<Self, ScaleError> {
        if column_ref.is_empty() || row_ref.is_empty() {
            return Err(ScaleError::InvalidInput(
                "AFR table needs at least one row and one column".into(),
            ));
        }
        if cells.len() != row_ref.len() {
            return Err(ScaleError::InvalidInput(format!(
                "AFR table has {} row references but {} data rows",
                row_ref.len(),
                cells.len()
            )));
        }
        for (i, row) in cells.iter().enumerate() {
            if row.len() != column_ref.len() {
                return Err(ScaleError::InvalidInput(format!(
                    "AFR table row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    column_ref.len()
                )));
            }
        }

        Ok(Self {
            column_ref,
            row_ref,
            cells,
        })
    }

    /// Load a table from a tab-delimited file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScaleError> {
        let content = fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a table from tab-delimited text.
    ///
    /// The first line is a title and is ignored. The second line holds the
    /// ascending column references. Each following line is one row: a row
    /// reference followed by its cells, or cells only (row reference taken
    /// as 0) when the line is exactly as wide as the column reference
    /// list. A blank line ends the table.
    pub fn from_str(content: &str) -> Result<Self, ScaleError> {
        let mut lines = content.lines().enumerate();

        lines.next();
        let (header_idx, header) = lines.next().ok_or_else(|| {
            ScaleError::InvalidInput("AFR table has no column reference line".into())
        })?;
        let column_ref = parse_values(header, header_idx + 1)?;

        let mut row_ref = Vec::new();
        let mut cells = Vec::new();

        for (idx, line) in lines {
            if line.trim().is_empty() {
                break;
            }

            let mut values = parse_values(line, idx + 1)?;

            if values.len() == column_ref.len() {
                row_ref.push(0.0);
            } else {
                row_ref.push(values.remove(0));
            }
            cells.push(values);
        }

        Self::new(column_ref, row_ref, cells)
    }

    /// Look up the table value at `(x, y)`.
    ///
    /// `x` selects along the column references, `y` along the row
    /// references. Values between references are blended bilinearly;
    /// values beyond the top or right edge hold the edge flat. Never
    /// fails for out-of-range input.
    pub fn lookup(&self, x: f64, y: f64) -> f64 {
        let c1 = floor_index(x, &self.column_ref);
        let r1 = floor_index(y, &self.row_ref);

        let c2 = if self.column_ref.len() > c1 + 1 {
            c1 + 1
        } else {
            c1
        };
        let r2 = if self.row_ref.len() > r1 + 1 { r1 + 1 } else { r1 };

        let q11 = self.cells[r1][c1];
        let q21 = self.cells[r1][c2];
        let q12 = self.cells[r2][c1];
        let q22 = self.cells[r2][c2];

        let x1 = self.column_ref[c1];
        let x2 = self.column_ref[c2];
        let y1 = self.row_ref[r1];
        let y2 = self.row_ref[r2];

        if x1 != x2 && y1 != y2 {
            let lo = ((x2 - x) / (x2 - x1)) * q11 + ((x - x1) / (x2 - x1)) * q21;
            let hi = ((x2 - x) / (x2 - x1)) * q12 + ((x - x1) / (x2 - x1)) * q22;

            ((y2 - y) / (y2 - y1)) * lo + ((y - y1) / (y2 - y1)) * hi
        } else if y1 != y2 && q12 != q11 {
            // Degenerate column axis: solve for the row coordinate whose
            // cell value matches y instead.
            y1 + (y2 - y1) / (q12 - q11) * (y - q11)
        } else if x1 != x2 && q21 != q11 {
            // Same inverse lookup along the column axis.
            x1 + (x2 - x1) / (q21 - q11) * (x - q11)
        } else {
            q11
        }
    }
}

/// Greatest index whose reference value is `<= value`, 0 when `value` is
/// below every reference.
fn floor_index(value: f64, refs: &[f64]) -> usize {
    let mut index = 0;
    for (i, r) in refs.iter().enumerate() {
        if value >= *r {
            index = i;
        } else {
            break;
        }
    }
    index
}

fn parse_values(line: &str, line_no: usize) -> Result<Vec<f64>, ScaleError> {
    line.split('\t')
        .map(|cell| {
            cell.trim()
                .parse::<f64>()
                .map_err(|_| ScaleError::ParseError {
                    line: line_no,
                    message: format!("'{}' is not a number", cell.trim()),
                })
        })
        .collect()
}
