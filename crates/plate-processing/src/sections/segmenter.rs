use crate::document::Row;
use crate::markers;

/// Positions of every plate-start row, in document order.
pub fn plate_start_positions(rows: &[Row]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| markers::is_plate_start(row))
        .map(|(position, _)| position)
        .collect()
}

/// Slice a row stream into one sub-stream per plate.
///
/// A plate's section begins at the row immediately preceding its plate-start
/// row and runs up to, but not including, the row preceding the next
/// plate-start row. The last section runs to the end of the stream. Sections
/// are contiguous and never overlap. Rows ahead of the first section belong
/// to no plate.
pub fn segment_plates(rows: &[Row]) -> Vec<&[Row]> {
    let boundaries: Vec<usize> = plate_start_positions(rows)
        .into_iter()
        .map(|position| position.saturating_sub(1))
        .collect();

    boundaries
        .iter()
        .enumerate()
        .map(|(i, &begin)| {
            let end = boundaries.get(i + 1).copied().unwrap_or(rows.len());
            &rows[begin..end]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> Vec<Row> {
        vec![
            Row::from_texts(["##BLOCKS= 2"]),
            Row::default(),
            Row::from_texts(["Plate name", "first"]),
            Row::from_texts(["Well data"]),
            Row::from_texts(["A", "0.1"]),
            Row::default(),
            Row::from_texts(["Plate name", "second"]),
            Row::from_texts(["Well data"]),
            Row::from_texts(["A", "0.2"]),
        ]
    }

    #[test]
    fn test_plate_start_positions() {
        assert_eq!(plate_start_positions(&stream()), vec![2, 6]);
    }

    #[test]
    fn test_segments_are_contiguous() {
        let rows = stream();
        let sections = segment_plates(&rows);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0], &rows[1..5]);
        assert_eq!(sections[1], &rows[5..9]);

        let covered: usize = sections.iter().map(|s| s.len()).sum();
        assert_eq!(covered, rows.len() - 1);
    }

    #[test]
    fn test_plate_start_on_first_row() {
        let rows = vec![
            Row::from_texts(["Plate name", "only"]),
            Row::from_texts(["Well data"]),
        ];
        let sections = segment_plates(&rows);
        assert_eq!(sections, vec![&rows[..]]);
    }

    #[test]
    fn test_no_plates() {
        let rows = vec![Row::from_texts(["Nothing", "here"])];
        assert!(segment_plates(&rows).is_empty());
        assert!(segment_plates(&[]).is_empty());
    }
}
