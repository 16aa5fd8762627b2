//! Reshapes the raw quotation workbook into the canonical eleven-column table.
//!
//! Normalization is deliberately lenient at cell level: a date or numeric
//! cell that resists coercion survives as-is and is rejected per row when
//! records are built. Structural problems (unreadable workbook, missing date
//! column) abort the run.

use crate::core::{NUMERIC_COLUMNS, NormalizeError};
use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use chrono::NaiveDate;
use std::io::Cursor;
use tracing::debug;

/// Source-name to canonical-name header mapping: one date column and ten
/// currency buy/sell columns, as published in the workbook.
const COLUMN_MAP: [(&str, &str); 11] = [
    ("Fecha", "date"),
    ("Dólar.USA.Compra", "usd_buy"),
    ("Dólar.USA.Venta", "usd_sell"),
    ("Dólar.eBROU.Compra", "ebrou_usd_buy"),
    ("Dólar.eBROU.Venta", "ebrou_usd_sell"),
    ("Euro.Compra", "eur_buy"),
    ("Euro.Venta", "eur_sell"),
    ("Peso.Argentino.Compra", "ars_buy"),
    ("Peso.Argentino.Venta", "ars_sell"),
    ("Real.Compra", "brl_buy"),
    ("Real.Venta", "brl_sell"),
];

/// Publication-time column, dropped when present.
const DROPPED_COLUMNS: [&str; 1] = ["Hora.de.publicación"];

/// Day-month-year format used by the source for textual date cells.
const SOURCE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Placeholder the source uses for a missing quotation.
const MISSING_PLACEHOLDER: &str = "..";

/// A single cell on its way from untyped to typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Date(NaiveDate),
    /// Content that resisted coercion, kept verbatim so the record builder
    /// can report it per field.
    Text(String),
}

/// Ordered table as parsed from the workbook, headers still in source form.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// One normalized row: a date cell plus the ten numeric-column cells in
/// `NUMERIC_COLUMNS` order.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    /// Zero-based index of the data row in the source table.
    pub index: usize,
    pub date: Cell,
    pub values: [Cell; 10],
}

/// The fixed-shape table consumed by the record builder: extras dropped,
/// missing numeric columns materialized as absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalTable {
    pub rows: Vec<CanonicalRow>,
}

/// Parses the workbook bytes and reshapes them into the canonical table.
pub fn normalize(bytes: &[u8]) -> Result<CanonicalTable, NormalizeError> {
    let raw = parse_workbook(bytes)?;
    normalize_table(raw)
}

/// Parses the byte stream as a workbook and materializes its first sheet,
/// first row as headers.
pub fn parse_workbook(bytes: &[u8]) -> Result<RawTable, NormalizeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| NormalizeError::Parse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| NormalizeError::Parse("workbook has no sheets".to_string()))?
        .map_err(|e| NormalizeError::Parse(e.to_string()))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.as_string().unwrap_or_default().trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let rows = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::Float(f) if f.is_finite() => Cell::Number(*f),
        // NaN/inf cells stand for missing values, never for zero.
        Data::Float(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            cell.as_date().map(Cell::Date).unwrap_or(Cell::Empty)
        }
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
        Data::Bool(_) | Data::Error(_) | Data::DurationIso(_) => Cell::Empty,
    }
}

/// Renames headers to canonical names, drops the publication-time column and
/// coerces cells into typed date and numeric values.
pub fn normalize_table(raw: RawTable) -> Result<CanonicalTable, NormalizeError> {
    // Rename mapped headers; anything else keeps its source name and falls
    // out of the canonical selection below.
    let headers: Vec<String> = raw
        .headers
        .iter()
        .map(|header| {
            COLUMN_MAP
                .iter()
                .find(|(source, _)| *source == header.as_str())
                .map(|(_, canonical)| canonical.to_string())
                .unwrap_or_else(|| header.clone())
        })
        .collect();

    // Dropping the publication-time column when it is absent is a no-op.
    for dropped in DROPPED_COLUMNS {
        if raw.headers.iter().any(|header| header == dropped) {
            debug!("Dropping extraneous column '{dropped}'");
        }
    }

    let date_index = headers
        .iter()
        .position(|header| header == "date")
        .ok_or(NormalizeError::Schema("date"))?;

    // A numeric column missing from the source stays absent-valued.
    let value_indices: Vec<Option<usize>> = NUMERIC_COLUMNS
        .iter()
        .map(|name| headers.iter().position(|header| header == name))
        .collect();
    for (name, found) in NUMERIC_COLUMNS.iter().zip(&value_indices) {
        if found.is_none() {
            debug!("Source table has no '{name}' column, values will be absent");
        }
    }

    let rows = raw
        .rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let date = coerce_date(row.get(date_index).cloned().unwrap_or(Cell::Empty));
            let values: [Cell; 10] = std::array::from_fn(|i| {
                let cell = value_indices[i]
                    .and_then(|column| row.get(column).cloned())
                    .unwrap_or(Cell::Empty);
                coerce_numeric(cell)
            });
            CanonicalRow { index, date, values }
        })
        .collect();

    Ok(CanonicalTable { rows })
}

/// Textual dates are parsed from the fixed day-month-year format; cells that
/// fail to parse are kept as-is and rejected later per row.
fn coerce_date(cell: Cell) -> Cell {
    match cell {
        Cell::Text(text) => match NaiveDate::parse_from_str(&text, SOURCE_DATE_FORMAT) {
            Ok(date) => Cell::Date(date),
            Err(_) => Cell::Text(text),
        },
        other => other,
    }
}

/// Numeric text is coerced; empty cells and the known missing-value
/// placeholder become absent, never zero. Other text stays verbatim.
fn coerce_numeric(cell: Cell) -> Cell {
    match cell {
        Cell::Text(text) => {
            if text == MISSING_PLACEHOLDER {
                return Cell::Empty;
            }
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Cell::Number(value),
                _ => Cell::Text(text),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_headers() -> Vec<String> {
        let mut headers: Vec<String> = COLUMN_MAP.iter().map(|(source, _)| source.to_string()).collect();
        headers.push("Hora.de.publicación".to_string());
        headers
    }

    fn row_of_text(cells: &[&str]) -> Vec<Cell> {
        cells
            .iter()
            .map(|text| {
                if text.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(text.to_string())
                }
            })
            .collect()
    }

    #[test]
    fn test_normalize_table_canonical_shape() {
        let raw = RawTable {
            headers: source_headers(),
            rows: vec![row_of_text(&[
                "01-03-2024",
                "39.50",
                "41.20",
                "..",
                "",
                "42.10",
                "44.00",
                "0.04",
                "0.05",
                "7.80",
                "8.20",
                "10:30",
            ])],
        };

        let table = normalize_table(raw).unwrap();
        assert_eq!(table.rows.len(), 1);

        let row = &table.rows[0];
        assert_eq!(row.index, 0);
        assert_eq!(
            row.date,
            Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(row.values[0], Cell::Number(39.5));
        assert_eq!(row.values[1], Cell::Number(41.2));
        // The ".." placeholder and the empty cell are both absent.
        assert_eq!(row.values[2], Cell::Empty);
        assert_eq!(row.values[3], Cell::Empty);
        assert_eq!(row.values[9], Cell::Number(8.2));
    }

    #[test]
    fn test_missing_date_column_is_a_schema_error() {
        let raw = RawTable {
            headers: vec!["Dólar.USA.Compra".to_string(), "Dólar.USA.Venta".to_string()],
            rows: vec![row_of_text(&["39.50", "41.20"])],
        };

        match normalize_table(raw) {
            Err(NormalizeError::Schema(column)) => assert_eq!(column, "date"),
            other => panic!("Expected a schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_numeric_columns_are_absent_not_fatal() {
        let raw = RawTable {
            headers: vec!["Fecha".to_string(), "Euro.Compra".to_string()],
            rows: vec![row_of_text(&["01-03-2024", "42.10"])],
        };

        let table = normalize_table(raw).unwrap();
        let row = &table.rows[0];
        assert_eq!(row.values[4], Cell::Number(42.1)); // eur_buy
        assert_eq!(row.values[0], Cell::Empty); // usd_buy never present
        assert_eq!(row.values[9], Cell::Empty); // brl_sell never present
    }

    #[test]
    fn test_unparsable_date_cell_is_kept_for_later_rejection() {
        let raw = RawTable {
            headers: vec!["Fecha".to_string(), "Euro.Compra".to_string()],
            rows: vec![row_of_text(&["not-a-date", "42.10"])],
        };

        let table = normalize_table(raw).unwrap();
        assert_eq!(table.rows[0].date, Cell::Text("not-a-date".to_string()));
    }

    #[test]
    fn test_non_numeric_text_is_kept_verbatim() {
        let raw = RawTable {
            headers: vec!["Fecha".to_string(), "Euro.Compra".to_string()],
            rows: vec![row_of_text(&["01-03-2024", "n/a"])],
        };

        let table = normalize_table(raw).unwrap();
        assert_eq!(table.rows[0].values[4], Cell::Text("n/a".to_string()));
    }

    #[test]
    fn test_native_date_and_number_cells_pass_through() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let raw = RawTable {
            headers: vec!["Fecha".to_string(), "Real.Venta".to_string()],
            rows: vec![vec![Cell::Date(date), Cell::Number(8.2)]],
        };

        let table = normalize_table(raw).unwrap();
        assert_eq!(table.rows[0].date, Cell::Date(date));
        assert_eq!(table.rows[0].values[9], Cell::Number(8.2));
    }

    #[test]
    fn test_ragged_rows_are_padded_with_absent_cells() {
        let raw = RawTable {
            headers: source_headers(),
            rows: vec![row_of_text(&["01-03-2024", "39.50"])],
        };

        let table = normalize_table(raw).unwrap();
        let row = &table.rows[0];
        assert_eq!(row.values[0], Cell::Number(39.5));
        assert_eq!(row.values[1], Cell::Empty);
    }

    #[test]
    fn test_parse_workbook_rejects_garbage_bytes() {
        match parse_workbook(b"definitely not a workbook") {
            Err(NormalizeError::Parse(_)) => {}
            other => panic!("Expected a parse error, got {other:?}"),
        }
    }
}
