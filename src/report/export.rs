//! Spreadsheet export of overlay results.

use crate::report::ReportError;
use crate::simulation::fx_overlay::{OverlayRow, OverlayTable};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// Header row, in column order.
pub const COLUMNS: [&str; 7] = [
    "Scenario",
    "Final FX",
    "Unhedged USD",
    "Hedged USD",
    "Total USD (with overlay)",
    "Total USD (no overlay)",
    "Profit from overlay",
];

const SHEET_NAME: &str = "Overlay";

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn numeric_cells(row: &OverlayRow) -> [f64; 6] {
    [
        to_f64(row.final_fx),
        to_f64(row.unhedged_usd),
        to_f64(row.hedged_usd),
        to_f64(row.total_with_overlay),
        to_f64(row.total_no_overlay),
        to_f64(row.profit_from_overlay),
    ]
}

/// Lay the table out on a single worksheet: header row then one row per
/// scenario, in table order.
pub fn build_workbook(table: &OverlayTable) -> Result<Workbook, ReportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let rate = Format::new().set_num_format("0.0000");
    let money = Format::new().set_num_format("#,##0.00");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    worksheet.set_column_width(0, 32)?;
    for col in 1..COLUMNS.len() as u16 {
        worksheet.set_column_width(col, 24)?;
    }

    for (i, row) in table.rows().iter().enumerate() {
        let r = i as u32 + 1;
        worksheet.write_string(r, 0, &row.scenario)?;
        for (j, value) in numeric_cells(row).into_iter().enumerate() {
            let format = if j == 0 { &rate } else { &money };
            worksheet.write_number_with_format(r, j as u16 + 1, value, format)?;
        }
    }
    Ok(workbook)
}

/// Write the table to `path`, replacing any existing file.
pub fn write_overlay_xlsx(table: &OverlayTable, path: &Path) -> Result<(), ReportError> {
    let mut workbook = build_workbook(table)?;
    workbook.save(path)?;
    log::info!("{} overlay rows exported to {}", table.len(), path.display());
    Ok(())
}

/// Serialize the workbook in memory.
pub fn overlay_xlsx_bytes(table: &OverlayTable) -> Result<Vec<u8>, ReportError> {
    let mut workbook = build_workbook(table)?;
    Ok(workbook.save_to_buffer()?)
}
