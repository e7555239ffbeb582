//! Post-processing of freshly parsed measurement tables.
//!
//! This module provides functionality for:
//! - Removing records whose value is missing
//! - Dropping axis columns that are missing for every record

use crate::config::ParserConfig;
use crate::error::{Result, ResultExt};
use crate::table;
use polars::prelude::*;
use tracing::debug;

/// Table cleaner applied to every plate after parsing.
#[derive(Debug, Clone, Copy)]
pub struct TableCleaner {
    drop_missing_values: bool,
    drop_empty_axis_columns: bool,
}

impl Default for TableCleaner {
    fn default() -> Self {
        Self {
            drop_missing_values: true,
            drop_empty_axis_columns: true,
        }
    }
}

impl TableCleaner {
    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            drop_missing_values: config.drop_missing_values,
            drop_empty_axis_columns: config.drop_empty_axis_columns,
        }
    }

    /// Clean a measurement table.
    ///
    /// This includes:
    /// 1. Removing records whose `value` is missing
    /// 2. Removing axis columns with no value in any remaining record
    ///
    /// Record order is preserved. Cleaning an already clean table is a no-op.
    /// An empty table keeps its columns, since there is nothing to judge them by.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut cleaning_actions = Vec::new();
        let mut df = df;

        // 1. Remove records with a missing value
        if self.drop_missing_values {
            let before = df.height();
            let mask = df
                .column(table::VALUE)
                .context("Locating value column")?
                .as_materialized_series()
                .is_not_null();
            df = df.filter(&mask).context("Dropping missing values")?;

            let removed = before - df.height();
            if removed > 0 {
                cleaning_actions.push(format!("Removed {} records with a missing value", removed));
                debug!("Removed {} records with a missing value", removed);
            }
        }

        // 2. Remove axis columns that are entirely missing
        if self.drop_empty_axis_columns && df.height() > 0 {
            let empty_axis_columns: Vec<PlSmallStr> = df
                .get_columns()
                .iter()
                .filter(|col| is_axis_column(col.name()))
                .filter(|col| col.null_count() == col.len())
                .map(|col| col.name().clone())
                .collect();

            if !empty_axis_columns.is_empty() {
                cleaning_actions.push(format!(
                    "Removed {} empty axis columns: {:?}",
                    empty_axis_columns.len(),
                    empty_axis_columns
                ));
                debug!("Removed empty axis columns: {:?}", empty_axis_columns);
                df = df.drop_many(empty_axis_columns);
            }
        }

        Ok((df, cleaning_actions))
    }
}

fn is_axis_column(name: &str) -> bool {
    matches!(name, table::EXCITATION_NM | table::EMISSION_NM | table::TIME_S)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df! {
            "well_row" => ["A", "A", "B"],
            "well_column" => [1u32, 2, 1],
            "well_id" => ["A01", "A02", "B01"],
            "value" => [Some(0.1), None, Some(0.3)],
            "excitation_nm" => [Some(750.0), Some(750.0), Some(750.0)],
            "emission_nm" => [None::<f64>, None, None],
        }
        .unwrap()
    }

    #[test]
    fn test_clean_drops_missing_values_and_empty_axes() {
        let (df, actions) = TableCleaner::default().clean(sample()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(
            df.get_column_names(),
            vec!["well_row", "well_column", "well_id", "value", "excitation_nm"]
        );
        assert_eq!(table::float_column(&df, "value").unwrap(), vec![Some(0.1), Some(0.3)]);
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let cleaner = TableCleaner::default();
        let (once, _) = cleaner.clean(sample()).unwrap();
        let (twice, actions) = cleaner.clean(once.clone()).unwrap();

        assert!(once.equals_missing(&twice));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_clean_respects_config() {
        let config = ParserConfig::builder()
            .drop_missing_values(false)
            .drop_empty_axis_columns(false)
            .build()
            .unwrap();
        let (df, actions) = TableCleaner::from_config(&config).clean(sample()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 6);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_clean_keeps_columns_of_empty_table() {
        let df = df! {
            "well_row" => [Some("A")],
            "well_column" => [1u32],
            "well_id" => ["A01"],
            "value" => [None::<f64>],
            "time_s" => [Some(0.0)],
        }
        .unwrap();

        let (df, _) = TableCleaner::default().clean(df).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 5);
    }
}
