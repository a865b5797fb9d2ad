//! Built-in calibration curves
//!
//! Factory voltage/volume curves for the stock MAF housing and two
//! cold-air-intake housings, all sampled at the same 54 voltage points.

use serde::{Deserialize, Serialize};

use crate::scaler::MafBin;

/// Voltage axis shared by every built-in curve.
const CURVE_VOLTS: [f64; 54] = [
    0.8984375, 0.9375, 0.9765625, 1.015625, 1.0546875, 1.09375, 1.1328125,
    1.171875, 1.2109375, 1.25, 1.2890625, 1.328125, 1.3671875, 1.40625,
    1.4453125, 1.484375, 1.5234375, 1.5625, 1.6015625, 1.640625, 1.6796875,
    1.71875, 1.7578125, 1.796875, 1.8359375, 1.875, 1.9140625, 1.953125,
    1.9921875, 2.03125, 2.0703125, 2.109375, 2.1484375, 2.1875, 2.2265625,
    2.265625, 2.3046875, 2.34375, 2.3828125, 2.421875, 2.4609375, 2.5,
    2.578125, 2.7734375, 2.96875, 3.203125, 3.4375, 3.7109375, 3.90625,
    4.0625, 4.296875, 4.4921875, 4.7265625, 5.0,
];

/// Stock housing airflow volumes.
const STOCK_VOLUME: [f64; 54] = [
    0.85, 1.0, 1.16, 1.43, 1.59, 1.82, 2.02, 2.29, 2.57, 2.87, 3.12, 3.43,
    3.79, 4.22, 4.62, 5.02, 5.48, 6.02, 6.57, 7.21, 7.76, 8.51, 9.26, 9.97,
    10.73, 11.53, 12.62, 13.48, 14.31, 15.27, 16.28, 17.33, 18.41, 19.51,
    20.66, 21.85, 23.09, 24.51, 26.09, 27.62, 29.09, 30.95, 34.56, 43.67,
    53.83, 70.21, 87.74, 112.57, 134.75, 153.59, 183.68, 213.71, 254.12,
    314.87,
];

/// 2.75 in cold-air-intake airflow volumes.
const CAI_SMALL_VOLUME: [f64; 54] = [
    0.850342095, 0.996084631, 1.157039523, 1.328069568, 1.51230371,
    1.715627432, 1.940551281, 2.183871508, 2.443892956, 2.71843648,
    3.009068012, 3.324135065, 3.678965569, 4.083361626, 4.497094631,
    4.941109657, 5.422593594, 5.909182072, 6.465194225, 7.056956768,
    7.66237402, 8.33317852, 9.030407906, 9.752721787, 10.50780869,
    11.30331898, 12.1346674, 12.99447823, 13.88854027, 14.82530975,
    15.80683517, 16.82523537, 17.86863327, 18.94257545, 20.05467606,
    21.21268654, 22.41743088, 23.66580391, 24.95509529, 26.28763771,
    27.66790962, 29.0982666, 32.12263489, 40.76900482, 50.85312271,
    63.4164505, 77.59732819, 97.07341003, 115.995491, 131.9366608,
    161.8807068, 187.7812805, 223.0933533, 269.73349,
];

/// 3 in cold-air-intake airflow volumes.
const CAI_LARGE_VOLUME: [f64; 54] = [
    1.04, 1.22, 1.41, 1.62, 1.85, 1.99, 2.13, 2.58, 2.94, 3.43, 3.92, 4.25,
    4.73, 5.38, 5.98, 6.70, 7.53, 8.46, 8.93, 9.91, 10.26, 11.40, 12.30,
    13.69, 14.38, 15.75, 16.89, 17.80, 19.08, 20.18, 21.67, 23.15, 24.33,
    25.43, 26.75, 28.07, 29.55, 31.03, 31.45, 33.69, 35.07, 36.46, 39.84,
    49.46, 60.21, 73.50, 90.64, 119.91, 140.62, 157.50, 189.56, 219.89,
    261.25, 315.86,
];

/// Built-in starting curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurvePreset {
    /// Stock MAF housing.
    Stock,
    /// 2.75 in cold-air intake.
    CaiSmall,
    /// 3 in cold-air intake.
    CaiLarge,
}

impl CurvePreset {
    /// Bins for this preset, pairing the shared voltage axis with the
    /// preset's volumes.
    pub fn bins(&self) -> Vec<MafBin> {
        let volume: &[f64] = match self {
            CurvePreset::Stock => &STOCK_VOLUME,
            CurvePreset::CaiSmall => &CAI_SMALL_VOLUME,
            CurvePreset::CaiLarge => &CAI_LARGE_VOLUME,
        };

        build_bins(&CURVE_VOLTS, volume)
    }
}

/// Merge parallel voltage/volume arrays into bins.
pub fn build_bins(volts: &[f64], volume: &[f64]) -> Vec<MafBin> {
    debug_assert_eq!(volts.len(), volume.len());

    volts
        .iter()
        .zip(volume)
        .map(|(&volts, &volume)| MafBin { volts, volume })
        .collect()
}
