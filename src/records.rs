//! Builds validated rate records from the canonical table.

use crate::core::{NUMERIC_COLUMNS, RateRow, RowError};
use crate::normalize::{CanonicalTable, Cell};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Walks the canonical table row by row, producing one validated record per
/// row. A row without a usable date is reported and skipped; a stray
/// non-numeric cell is reported and only that field is left absent. One bad
/// row never aborts the batch.
///
/// The returned records are deduplicated by date, keeping the last
/// occurrence in table order; everything else preserves source order.
pub fn build_records(table: &CanonicalTable) -> (Vec<RateRow>, Vec<RowError>) {
    let mut records = Vec::with_capacity(table.rows.len());
    let mut errors = Vec::new();

    for row in &table.rows {
        let date = match &row.date {
            Cell::Date(date) => *date,
            other => {
                errors.push(RowError {
                    row: row.index,
                    field: None,
                    reason: format!("invalid date: {}", describe(other)),
                });
                continue;
            }
        };

        let mut values = [None; 10];
        for (i, cell) in row.values.iter().enumerate() {
            values[i] = match cell {
                Cell::Number(value) => Some(*value),
                Cell::Empty => None,
                other => {
                    errors.push(RowError {
                        row: row.index,
                        field: Some(NUMERIC_COLUMNS[i]),
                        reason: format!("not numeric: {}", describe(other)),
                    });
                    None
                }
            };
        }

        records.push(RateRow::from_values(date, values));
    }

    (dedup_by_date(records), errors)
}

fn describe(cell: &Cell) -> String {
    match cell {
        Cell::Empty => "empty cell".to_string(),
        Cell::Number(value) => format!("numeric value {value}"),
        Cell::Date(date) => format!("date {date}"),
        Cell::Text(text) => format!("'{text}'"),
    }
}

/// Keeps the last occurrence per date, consistent with the store holding one
/// row per date.
fn dedup_by_date(records: Vec<RateRow>) -> Vec<RateRow> {
    let mut last_index: HashMap<NaiveDate, usize> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        last_index.insert(record.date, i);
    }

    records
        .into_iter()
        .enumerate()
        .filter(|(i, record)| last_index[&record.date] == *i)
        .map(|(_, record)| record)
        .collect()
}
