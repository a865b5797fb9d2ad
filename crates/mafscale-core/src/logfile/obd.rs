//! Generic OBD export schema
//!
//! Tab-separated logs with the column header on the first line. Status
//! codes follow the OBD-II fuel-system status: 2 = closed loop, 1 and
//! 4 = open loop (cold start and load/decel respectively).

use super::{column_index, optional_cell, required_cell, required_column};
use super::{FuelState, LogFormat, LogRecord};
use crate::error::ScaleError;

const TIME: &str = "Time (sec)";
const ENGINE_SPEED: &str = "Engine Speed (rpm)";
const ENGINE_LOAD: &str = "Calculated Load (g/rev)";
const MAF_VOLTAGE: &str = "Mass Airflow Voltage (V)";
const CURRENT_AFR: &str = "AFR Sensor (AFR)";
const COMMANDED_AFR: &str = "Fuel Final Base (AFR)";
const ST_FUEL_TRIM: &str = "Short Term FT (%)";
const LT_FUEL_TRIM: &str = "Long Term FT (%)";
pub(super) const FUEL_STATE: &str = "Fuel System Status";
const INTAKE_AIR_TEMP: &str = "Intake Air Temperature (F)";

pub(super) fn parse(content: &str) -> Result<Vec<LogRecord>, ScaleError> {
    let mut lines = content.lines().enumerate();

    let (_, header) = lines
        .next()
        .ok_or_else(|| ScaleError::FormatMismatch("log is empty".into()))?;

    let time = required_column(header, TIME)?;
    let engine_speed = required_column(header, ENGINE_SPEED)?;
    let engine_load = required_column(header, ENGINE_LOAD)?;
    let maf_voltage = required_column(header, MAF_VOLTAGE)?;
    let lt_fuel_trim = required_column(header, LT_FUEL_TRIM)?;
    let fuel_state = required_column(header, FUEL_STATE)?;
    let intake_air_temp = required_column(header, INTAKE_AIR_TEMP)?;

    let current_afr = column_index(header, CURRENT_AFR);
    let commanded_afr = column_index(header, COMMANDED_AFR);
    let st_fuel_trim = column_index(header, ST_FUEL_TRIM);

    let mut records = Vec::new();

    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split('\t').collect();

        records.push(LogRecord {
            format: LogFormat::Obd,
            time: required_cell(&fields, time, TIME, line_no)?,
            engine_speed: required_cell(&fields, engine_speed, ENGINE_SPEED, line_no)?,
            engine_load: required_cell(&fields, engine_load, ENGINE_LOAD, line_no)?,
            maf_voltage: required_cell(&fields, maf_voltage, MAF_VOLTAGE, line_no)?,
            current_afr: optional_cell(&fields, current_afr, CURRENT_AFR, line_no)?,
            commanded_afr: optional_cell(&fields, commanded_afr, COMMANDED_AFR, line_no)?,
            st_fuel_trim: optional_cell(&fields, st_fuel_trim, ST_FUEL_TRIM, line_no)?,
            lt_fuel_trim: required_cell(&fields, lt_fuel_trim, LT_FUEL_TRIM, line_no)?,
            fuel_state: decode_state(required_cell(&fields, fuel_state, FUEL_STATE, line_no)?),
            intake_air_temp: required_cell(&fields, intake_air_temp, INTAKE_AIR_TEMP, line_no)?,
        });
    }

    Ok(records)
}

fn decode_state(code: f64) -> FuelState {
    if code == 2.0 {
        FuelState::ClosedLoop
    } else if code == 1.0 || code == 4.0 {
        FuelState::OpenLoop
    } else {
        FuelState::Unknown
    }
}
