//! Table rendering for rows, totals and factor tables

use console::style;
use tabled::{builder::Builder, settings::Style};

use occu_core::calculations::{Row, Totals};
use occu_core::spreadsheet::EXPORT_HEADERS;

/// Rows with their computed loads, in display order.
pub fn rows_table(rows: &[Row]) -> String {
    let mut builder = Builder::default();
    builder.push_record(EXPORT_HEADERS);
    for row in rows {
        builder.push_record([
            row.number.clone(),
            row.name.clone(),
            row.area.clone(),
            row.occupancy_type.clone(),
            row.occupant_load.to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Per-type totals followed by the grand total line.
pub fn totals_table(totals: &Totals) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Occupancy Type", "Occupant Load"]);
    for total in &totals.by_type {
        builder.push_record([total.occupancy_type.clone(), total.occupant_load.to_string()]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());

    format!("{table}\n{}", grand_total_line(totals))
}

pub fn grand_total_line(totals: &Totals) -> String {
    format!("{} {}", style("Grand Total:").bold(), style(totals.grand_total).bold())
}
