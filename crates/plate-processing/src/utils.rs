//! Shared helpers for index reconciliation and value coercion.

use once_cell::sync::Lazy;
use regex::Regex;

static FIRST_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)").expect("Invalid regex: first integer"));

// =============================================================================
// Index Reconciliation
// =============================================================================

/// Forward-fill a sequence of sparse column indices.
///
/// The first position is always `start`. Every later position uses its
/// explicit index when present, otherwise one more than the previous
/// reconciled position. Explicit indices that are not integers count as
/// absent.
///
/// # Example
///
/// ```rust
/// use plate_processing::utils::forward_fill_indices;
///
/// assert_eq!(forward_fill_indices(&[None, Some("3"), None], 0), vec![0, 3, 4]);
/// assert_eq!(forward_fill_indices(&[Some("5"), None, None], 2), vec![2, 3, 4]);
/// ```
pub fn forward_fill_indices<S: AsRef<str>>(indices: &[Option<S>], start: i64) -> Vec<i64> {
    let mut filled = Vec::with_capacity(indices.len());
    let mut previous = start;
    for (position, index) in indices.iter().enumerate() {
        let current = if position == 0 {
            start
        } else {
            index
                .as_ref()
                .and_then(|i| parse_index(i.as_ref()))
                .unwrap_or(previous.saturating_add(1))
        };
        filled.push(current);
        previous = current;
    }
    filled
}

/// Parse an explicit index attribute.
///
/// Spreadsheet columns are unsigned 32-bit; anything outside that range is
/// treated as absent.
pub fn parse_index(index: &str) -> Option<i64> {
    index.trim().parse::<u32>().ok().map(i64::from)
}

// =============================================================================
// Value Coercion
// =============================================================================

/// Convert cell text to a finite float, or `None` when it is not numeric.
///
/// Labels, blanks and instrument error codes all degrade to `None`.
pub fn value_to_float(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// First run of digits in `text`, as a float.
///
/// Used for wavelength labels such as `"485"` or `"Ex 485 nm"`.
pub fn first_integer(text: &str) -> Option<f64> {
    FIRST_INTEGER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Split an `Ex/Em` label such as `"485/525"` into its two wavelengths.
///
/// A missing or non-numeric side yields `None` for that side.
pub fn split_wavelength_pair(label: &str) -> (Option<f64>, Option<f64>) {
    let mut parts = label.split('/');
    let excitation = parts.next().and_then(first_integer);
    let emission = parts.next().and_then(first_integer);
    (excitation, emission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_fill_indices() {
        assert_eq!(
            forward_fill_indices::<&str>(&[None, None, None], 0),
            vec![0, 1, 2]
        );
        assert_eq!(forward_fill_indices(&[Some("5"), None, None], 2), vec![2, 3, 4]);
        assert_eq!(forward_fill_indices(&[None, Some("3"), None], 0), vec![0, 3, 4]);
        assert_eq!(
            forward_fill_indices(&[None, Some("2"), None, Some("8"), None], 0),
            vec![0, 2, 3, 8, 9]
        );
    }

    #[test]
    fn test_forward_fill_edge_cases() {
        assert!(forward_fill_indices::<&str>(&[], 4).is_empty());
        assert_eq!(forward_fill_indices(&[Some("9")], 1), vec![1]);
        // a garbage index behaves like a missing one
        assert_eq!(forward_fill_indices(&[None, Some("x"), None], 0), vec![0, 1, 2]);
    }

    #[test]
    fn test_out_of_range_indices_count_as_absent() {
        assert_eq!(parse_index("4294967295"), Some(4_294_967_295));
        assert_eq!(parse_index("4294967296"), None);
        assert_eq!(parse_index("-3"), None);
        assert_eq!(
            forward_fill_indices(&[None, Some("9223372036854775807"), None], 0),
            vec![0, 1, 2]
        );
        assert_eq!(
            forward_fill_indices::<&str>(&[None, None], i64::MAX),
            vec![i64::MAX, i64::MAX]
        );
    }

    #[test]
    fn test_forward_fill_is_idempotent_on_dense_input() {
        let dense = [Some("3"), Some("4"), Some("5")];
        assert_eq!(forward_fill_indices(&dense, 3), vec![3, 4, 5]);
    }

    #[test]
    fn test_value_to_float() {
        assert_eq!(value_to_float("0.196"), Some(0.196));
        assert_eq!(value_to_float(" 3322534 "), Some(3_322_534.0));
        assert_eq!(value_to_float("-1"), Some(-1.0));
        let small = value_to_float("1.2E-5").unwrap();
        assert!(small > 0.0 && small < 1e-4);

        assert_eq!(value_to_float("Error"), None);
        assert_eq!(value_to_float("#SAT"), None);
        assert_eq!(value_to_float(""), None);
        assert_eq!(value_to_float("NaN"), None);
        assert_eq!(value_to_float("inf"), None);
    }

    #[test]
    fn test_split_wavelength_pair() {
        assert_eq!(split_wavelength_pair("485/525"), (Some(485.0), Some(525.0)));
        assert_eq!(split_wavelength_pair("750/"), (Some(750.0), None));
        assert_eq!(split_wavelength_pair("750"), (Some(750.0), None));
        assert_eq!(split_wavelength_pair("Lum"), (None, None));
    }
}
