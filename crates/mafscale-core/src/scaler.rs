//! MAF curve scaling
//!
//! Owns the voltage/volume calibration bins and accumulates weighted
//! per-bin corrections from a stream of datalog records. Each retained
//! sample's correction is split between the two bins bracketing its
//! voltage, weighted by both sample count and elapsed drive time, and the
//! adjusted curve is the weighted average once a bin has seen enough
//! time.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::ScaleError;
use crate::logfile::{FuelState, LogRecord};
use crate::table::AfrTable;

/// Weighted seconds of drive time a bin needs before its adjustment is
/// trusted.
const MIN_SAMPLE_SECONDS: f64 = 20.0;

/// Voltage slew (V/s) above which a sample pair is discarded as a sensor
/// transient.
const MAX_VOLTAGE_CHANGE_RATE: f64 = 0.2;

/// Engine load above which a record counts toward the IAT envelope.
/// Loads under ~0.25 are idle, where intake temperatures climb.
const IAT_LOAD_FLOOR: f64 = 0.3;

/// One point of a voltage/volume calibration curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MafBin {
    /// Sensor voltage at this calibration point.
    pub volts: f64,
    /// Airflow volume reported at this voltage.
    pub volume: f64,
}

/// A calibration point after scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedMafBin {
    /// Sensor voltage, copied from the source bin.
    pub volts: f64,
    /// Recalculated airflow volume.
    pub volume: f64,
    /// Effective weighted number of samples behind the adjustment.
    pub sample_count: f64,
    /// Effective weighted seconds of drive time behind the adjustment.
    pub sample_seconds: f64,
}

/// Which fuel-system states contribute to scaling
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Keep closed-loop records.
    pub include_closed_loop: bool,
    /// Keep open-loop records.
    pub include_open_loop: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            include_closed_loop: true,
            include_open_loop: true,
        }
    }
}

/// Statistics from one ingested log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Records loaded from the log before filtering.
    pub loaded_records: usize,
    /// Closed-loop records that contributed to the curve.
    pub closed_loop_kept: usize,
    /// Open-loop records that contributed to the curve.
    pub open_loop_kept: usize,
    /// Lowest loaded-operation intake air temperature.
    pub iat_min: f64,
    /// Heat-soak cutoff: the top-quartile loaded-operation temperature.
    pub iat_max: f64,
    /// Mean of the loaded-operation temperatures below the cutoff.
    pub iat_avg: f64,
}

/// Accumulates per-bin corrections and produces the adjusted curve
pub struct MafScaler {
    // The original bins being scaled, sorted by voltage.
    orig_volts: Vec<f64>,
    orig_volume: Vec<f64>,

    // Weighted accumulations, one slot per bin, averaged on read.
    adjustments: Vec<f64>,
    adjustment_times: Vec<f64>,
    adjustment_weights: Vec<f64>,

    target_afr: Option<AfrTable>,
}

impl MafScaler {
    /// Create a scaler over `bins`, optionally with a target-AFR table
    /// for open-loop records that lack a commanded AFR.
    ///
    /// Bins may arrive in any order; they are sorted by voltage. An empty
    /// bin set fails with [`ScaleError::InvalidInput`].
    pub fn new(mut bins: Vec<MafBin>, target_afr: Option<AfrTable>) -> Result<Self, ScaleError> {
        if bins.is_empty() {
            return Err(ScaleError::InvalidInput(
                "there must be at least one bin to scale".into(),
            ));
        }

        bins.sort_by(|a, b| a.volts.partial_cmp(&b.volts).unwrap_or(Ordering::Equal));

        let orig_volts: Vec<f64> = bins.iter().map(|b| b.volts).collect();
        let orig_volume: Vec<f64> = bins.iter().map(|b| b.volume).collect();
        let len = orig_volts.len();

        Ok(Self {
            orig_volts,
            orig_volume,
            adjustments: vec![0.0; len],
            adjustment_times: vec![0.0; len],
            adjustment_weights: vec![0.0; len],
            target_afr,
        })
    }

    /// Number of bins in the curve.
    pub fn bin_count(&self) -> usize {
        self.orig_volts.len()
    }

    /// Feed one log's records into the accumulators.
    ///
    /// Records are sorted by timestamp, then consecutive pairs are walked:
    /// pairs slewing faster than 0.2 V/s are dropped as transients,
    /// records above the heat-soak IAT cutoff or without a usable
    /// correction signal are skipped, and the rest are blended into the
    /// bins bracketing their voltage.
    ///
    /// Fails with [`ScaleError::InsufficientData`] when the log has too
    /// few loaded-operation records to establish the IAT envelope; the
    /// accumulators are untouched in that case.
    pub fn ingest(
        &mut self,
        mut records: Vec<LogRecord>,
        options: &IngestOptions,
    ) -> Result<IngestSummary, ScaleError> {
        // IAT cutoff: collect loaded-operation temperatures and take the
        // top quartile as the heat-soak limit for every record.
        let mut loaded_temps: Vec<f64> = records
            .iter()
            .filter(|r| r.engine_load > IAT_LOAD_FLOOR)
            .map(|r| r.intake_air_temp)
            .collect();
        loaded_temps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let top_quartile = loaded_temps.len() * 3 / 4;
        if top_quartile == 0 {
            return Err(ScaleError::InsufficientData(format!(
                "too few records with engine load above {IAT_LOAD_FLOOR} to establish an IAT envelope"
            )));
        }

        let iat_min = loaded_temps[0];
        let iat_max = loaded_temps[top_quartile];
        let iat_avg = loaded_temps[..top_quartile].iter().sum::<f64>() / top_quartile as f64;

        // Sort by time so pairwise change rates are meaningful. The sort
        // is stable, so same-timestamp records keep their log order.
        records.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(Ordering::Equal));

        let mut closed_kept = 0usize;
        let mut open_kept = 0usize;

        for i in 1..records.len() {
            let (prev, cur) = (&records[i - 1], &records[i]);

            let dt = cur.time - prev.time;

            let change_rate = ((cur.maf_voltage - prev.maf_voltage) / dt).abs();
            if change_rate > MAX_VOLTAGE_CHANGE_RATE {
                continue;
            }

            let adjustment = match cur.volume_adjustment(self.target_afr.as_ref()) {
                Some(adj) => adj,
                None => continue,
            };

            // Heat-soak filter.
            if cur.intake_air_temp > iat_max {
                continue;
            }

            match cur.fuel_state {
                FuelState::ClosedLoop => {
                    if !options.include_closed_loop {
                        continue;
                    }
                    closed_kept += 1;
                }
                FuelState::OpenLoop => {
                    if !options.include_open_loop {
                        continue;
                    }
                    open_kept += 1;
                }
                FuelState::Unknown => continue,
            }

            self.blend(cur.maf_voltage, dt, adjustment);
        }

        tracing::debug!(
            "kept {closed_kept} closed-loop and {open_kept} open-loop of {} records",
            records.len()
        );

        Ok(IngestSummary {
            loaded_records: records.len(),
            closed_loop_kept: closed_kept,
            open_loop_kept: open_kept,
            iat_min,
            iat_max,
            iat_avg,
        })
    }

    /// Distribute one sample across the bins bracketing its voltage.
    fn blend(&mut self, voltage: f64, dt: f64, adj: f64) {
        let last = self.orig_volts.len() - 1;

        if voltage <= self.orig_volts[0] {
            self.adjustments[0] += adj;
            self.adjustment_times[0] += dt;
            self.adjustment_weights[0] += 1.0;
            return;
        }

        if voltage >= self.orig_volts[last] {
            self.adjustments[last] += adj;
            self.adjustment_times[last] += dt;
            self.adjustment_weights[last] += 1.0;
            return;
        }

        // bin_a is the lower voltage, bin_b the higher.
        let (bin_a, bin_b) = match self
            .orig_volts
            .binary_search_by(|v| v.partial_cmp(&voltage).unwrap_or(Ordering::Equal))
        {
            Ok(hit) => (hit, hit + 1),
            Err(insertion) => (insertion - 1, insertion),
        };

        let volts_a = self.orig_volts[bin_a];
        let dist = (voltage - volts_a) / (self.orig_volts[bin_b] - volts_a);
        let weight_a = 1.0 - dist;
        let weight_b = dist;

        self.adjustments[bin_a] += adj * weight_a;
        self.adjustment_times[bin_a] += dt * weight_a;
        self.adjustment_weights[bin_a] += weight_a;

        self.adjustments[bin_b] += adj * weight_b;
        self.adjustment_times[bin_b] += dt * weight_b;
        self.adjustment_weights[bin_b] += weight_b;
    }

    /// Bins after scaling, in ascending voltage order.
    ///
    /// A bin that has accumulated at least 20 weighted seconds reports
    /// its weighted-average adjustment; below that it keeps the original
    /// volume and reports zero sample statistics. Reading does not mutate
    /// the accumulators, so repeated reads yield identical results.
    pub fn adjusted_bins(&self) -> impl Iterator<Item = AdjustedMafBin> + '_ {
        (0..self.orig_volts.len()).map(move |i| {
            if self.adjustment_times[i] >= MIN_SAMPLE_SECONDS {
                let weight = self.adjustment_weights[i];
                let adj = self.adjustments[i] / weight;

                AdjustedMafBin {
                    volts: self.orig_volts[i],
                    volume: self.orig_volume[i] * (1.0 + adj),
                    sample_count: weight,
                    sample_seconds: self.adjustment_times[i],
                }
            } else {
                AdjustedMafBin {
                    volts: self.orig_volts[i],
                    volume: self.orig_volume[i],
                    sample_count: 0.0,
                    sample_seconds: 0.0,
                }
            }
        })
    }
}
