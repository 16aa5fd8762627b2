//! Renders ingest outcomes and quote history for the terminal.

use super::ui;
use crate::core::{Currency, CurrencyQuote};
use crate::pipeline::IngestReport;
use comfy_table::Cell;

pub fn render_ingest_report(report: &IngestReport) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Rows in workbook"),
        ui::header_cell("Written"),
        ui::header_cell("Skipped cells/rows"),
    ]);
    table.add_row(vec![
        Cell::new(report.rows_seen),
        Cell::new(report.written),
        Cell::new(report.row_errors.len()),
    ]);

    let mut out = table.to_string();
    for row_error in &report.row_errors {
        out.push('\n');
        out.push_str(&ui::style_text(
            &format!("skipped {row_error}"),
            ui::StyleType::Subtle,
        ));
    }
    out
}

pub fn render_latest(currency: Currency, quotes: &[CurrencyQuote]) -> String {
    if quotes.is_empty() {
        return ui::style_text(
            &format!("No rates recorded for {currency}"),
            ui::StyleType::Error,
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Buy"),
        ui::header_cell("Sell"),
        ui::header_cell("Spread"),
    ]);
    for quote in quotes {
        table.add_row(vec![
            Cell::new(quote.date.to_string()),
            ui::rate_cell(quote.buy),
            ui::rate_cell(quote.sell),
            ui::spread_cell(quote.spread),
        ]);
    }

    format!(
        "{}\n{table}",
        ui::style_text(&format!("Latest {currency} quotes"), ui::StyleType::Title)
    )
}
