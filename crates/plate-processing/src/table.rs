//! Long-format measurement tables.
//!
//! Every table carries `well_row`, `well_column`, `well_id` and `value`,
//! followed by the axis columns of its measurement type.

use crate::types::{MeasurementRecord, MeasurementType};
use polars::prelude::*;

pub const WELL_ROW: &str = "well_row";
pub const WELL_COLUMN: &str = "well_column";
pub const WELL_ID: &str = "well_id";
pub const VALUE: &str = "value";
pub const EXCITATION_NM: &str = "excitation_nm";
pub const EMISSION_NM: &str = "emission_nm";
pub const TIME_S: &str = "time_s";

/// Build a DataFrame from records, in record order.
pub fn records_to_dataframe(
    records: &[MeasurementRecord],
    measurement_type: MeasurementType,
) -> PolarsResult<DataFrame> {
    let well_rows: Vec<String> = records.iter().map(|r| r.well.row().to_string()).collect();
    let well_columns: Vec<u32> = records.iter().map(|r| r.well.column()).collect();
    let well_ids: Vec<String> = records.iter().map(|r| r.well.id()).collect();
    let values: Vec<Option<f64>> = records.iter().map(|r| r.value).collect();

    let mut df = df! {
        WELL_ROW => well_rows,
        WELL_COLUMN => well_columns,
        WELL_ID => well_ids,
        VALUE => values,
    }?;

    for &axis in measurement_type.axis_columns() {
        let axis_values: Vec<Option<f64>> = records
            .iter()
            .map(|r| match axis {
                EXCITATION_NM => r.excitation_nm,
                EMISSION_NM => r.emission_nm,
                _ => r.time_s,
            })
            .collect();
        df.with_column(Series::new(axis.into(), axis_values))?;
    }

    Ok(df)
}

/// Values of a Float64 column, or `None` if the column is absent.
#[doc(hidden)]
pub fn float_column(df: &DataFrame, name: &str) -> Option<Vec<Option<f64>>> {
    let column = df.column(name).ok()?;
    let values = column.as_materialized_series().f64().ok()?;
    Some(values.into_iter().collect())
}

/// Distinct non-null values of a Float64 column in first-seen order, or
/// `None` if the column is absent.
pub fn distinct_float_values(df: &DataFrame, name: &str) -> Option<Vec<f64>> {
    let distinct = df.column(name).ok()?.unique_stable().ok()?.drop_nulls();
    let values = distinct.as_materialized_series().f64().ok()?;
    Some(values.into_iter().flatten().collect())
}

/// Values of a String column, or `None` if the column is absent.
#[doc(hidden)]
pub fn string_column(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    let column = df.column(name).ok()?;
    let values = column.as_materialized_series().str().ok()?;
    Some(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Value for a well at a given axis position, if present.
///
/// Convenient for spot checks against known readings.
#[doc(hidden)]
pub fn lookup_value(df: &DataFrame, well_id: &str, axis: Option<(&str, f64)>) -> Option<f64> {
    let ids = string_column(df, WELL_ID)?;
    let values = float_column(df, VALUE)?;
    let axis_values = match axis {
        Some((name, _)) => Some(float_column(df, name)?),
        None => None,
    };

    (0..ids.len()).find_map(|i| {
        if ids[i].as_deref() != Some(well_id) {
            return None;
        }
        if let (Some((_, wanted)), Some(axis_values)) = (axis, &axis_values)
            && axis_values[i] != Some(wanted)
        {
            return None;
        }
        values[i]
    })
}
