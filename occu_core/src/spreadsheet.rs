//! # Spreadsheet Import / Export
//!
//! Reads the first worksheet of a workbook (`.xlsx`, `.xlsm`, `.xls`, `.ods`)
//! or a `.csv` file into [`Record`]s, turns records into [`Row`]s, and writes
//! rows back out with a fixed column layout.
//!
//! Column names are matched loosely (whitespace, ASCII case, `m2`/`m²`), and
//! each field accepts a couple of header variants:
//!
//! | field | accepted headers | when missing |
//! |-------|------------------|--------------|
//! | room number | `Room #`, `Room Number` | row index (1-based) |
//! | room name | `Room Name`, `Name` | `Space <index>` |
//! | area | `Area (m²)`, `Area` | blank |
//! | type | `Occupancy Type`, `Type` | default type |
//!
//! ## Example
//!
//! ```rust,no_run
//! use occu_core::factors::{CodeSetId, FactorTable};
//! use occu_core::spreadsheet::{import_rows, write_xlsx};
//! use std::path::Path;
//!
//! let table = FactorTable::for_code_set(CodeSetId::Ibc2024);
//! let rows = import_rows(Path::new("schedule.xlsx"), &table)?;
//! write_xlsx(&rows, Path::new("occupancy_data.xlsx"))?;
//! # Ok::<(), occu_core::errors::OccuError>(())
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{parse_area, Row};
use crate::errors::{OccuError, OccuResult};
use crate::file_io::write_atomic;
use crate::factors::FactorTable;

/// Worksheet name used for exports
pub const SHEET_NAME: &str = "Occupancy";

/// Export column order
pub const EXPORT_HEADERS: [&str; 5] = ["Room #", "Room Name", "Area (m²)", "Occupancy Type", "Occupant Load"];

const ROOM_NUMBER_COLUMNS: &[&str] = &["Room #", "Room Number"];
const ROOM_NAME_COLUMNS: &[&str] = &["Room Name", "Name"];
const AREA_COLUMNS: &[&str] = &["Area (m²)", "Area"];
const TYPE_COLUMNS: &[&str] = &["Occupancy Type", "Type"];

/// One spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Cell contents as text; numbers use their shortest round-trip form
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(v) => CellValue::Number(*v),
            Data::Int(v) => CellValue::Number(*v as f64),
            Data::Bool(v) => CellValue::Text(if *v { "TRUE" } else { "FALSE" }.to_string()),
            other => CellValue::Text(format!("{other:?}")),
        }
    }
}

/// One data row: column header → cell
pub type Record = BTreeMap<String, CellValue>;

/// Read records from a spreadsheet, choosing the reader by extension.
pub fn read_records(path: &Path) -> OccuResult<Vec<Record>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let records = if is_csv {
        read_csv_records(path)?
    } else {
        read_workbook_records(path)?
    };
    debug!(path = %path.display(), records = records.len(), "read spreadsheet records");
    Ok(records)
}

/// Read the first worksheet of a workbook. The first row is the header.
pub fn read_workbook_records(path: &Path) -> OccuResult<Vec<Record>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| OccuError::spreadsheet("open workbook", path.display().to_string(), e.to_string()))?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| OccuError::spreadsheet("read", path.display().to_string(), "workbook has no worksheet"))?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| OccuError::spreadsheet("read worksheet", path.display().to_string(), e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|c| CellValue::from(c).to_text()).collect();

    Ok(rows
        .map(|cells| build_record(&headers, cells.iter().map(CellValue::from)))
        .filter(|record| !record.values().all(CellValue::is_empty))
        .collect())
}

/// Read a CSV file with a header row.
pub fn read_csv_records(path: &Path) -> OccuResult<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| OccuError::spreadsheet("open csv", path.display().to_string(), e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| OccuError::spreadsheet("read csv header", path.display().to_string(), e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let line = result
            .map_err(|e| OccuError::spreadsheet("read csv", path.display().to_string(), e.to_string()))?;
        let cells = line.iter().map(|field| {
            if field.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(field.to_string())
            }
        });
        let record = build_record(&headers, cells);
        if !record.values().all(CellValue::is_empty) {
            records.push(record);
        }
    }
    Ok(records)
}

/// Pair cells with headers. Unnamed columns are dropped; for duplicate
/// headers the leftmost column wins. Short rows get empty cells.
fn build_record(headers: &[String], cells: impl Iterator<Item = CellValue>) -> Record {
    let mut record = Record::new();
    let mut cells = cells.fuse();
    for header in headers {
        let cell = cells.next().unwrap_or(CellValue::Empty);
        let name = header.trim();
        if !name.is_empty() {
            record.entry(name.to_string()).or_insert(cell);
        }
    }
    record
}

fn normalize_header(header: &str) -> String {
    header.trim().to_ascii_lowercase().replace("m²", "m2")
}

/// First present column among `candidates`
fn lookup<'a>(record: &'a Record, candidates: &[&str]) -> Option<&'a CellValue> {
    candidates.iter().find_map(|candidate| {
        let wanted = normalize_header(candidate);
        record
            .iter()
            .find(|(header, _)| normalize_header(header) == wanted)
            .map(|(_, cell)| cell)
    })
}

/// Turn records into rows with ids 1..n, coerced types and computed loads.
pub fn rows_from_records(records: &[Record], table: &FactorTable) -> Vec<Row> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let index = i as u32 + 1;
            let text = |candidates: &[&str]| lookup(record, candidates).map(CellValue::to_text);

            let mut row = Row::new(
                index,
                text(ROOM_NUMBER_COLUMNS).unwrap_or_else(|| index.to_string()),
                text(ROOM_NAME_COLUMNS).unwrap_or_else(|| format!("Space {index}")),
                text(AREA_COLUMNS).unwrap_or_default(),
                text(TYPE_COLUMNS).unwrap_or_default(),
            );
            row.refresh(table);
            row
        })
        .collect()
}

/// Read a spreadsheet and convert it to rows in one step.
pub fn import_rows(path: &Path, table: &FactorTable) -> OccuResult<Vec<Row>> {
    let records = read_records(path)?;
    Ok(rows_from_records(&records, table))
}

fn build_workbook(rows: &[Row]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    sheet.set_column_width(1, 28)?;
    sheet.set_column_width(3, 20)?;

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.number)?;
        sheet.write_string(r, 1, &row.name)?;
        match parse_area(&row.area) {
            Some(area) if !row.area.trim().is_empty() => {
                sheet.write_number(r, 2, area)?;
            }
            _ if row.area.is_empty() => {}
            _ => {
                sheet.write_string(r, 2, &row.area)?;
            }
        }
        sheet.write_string(r, 3, &row.occupancy_type)?;
        sheet.write_number(r, 4, row.occupant_load as f64)?;
    }

    Ok(workbook)
}

/// Write rows to an `.xlsx` file with the fixed export columns.
pub fn write_xlsx(rows: &[Row], path: &Path) -> OccuResult<()> {
    let mut workbook = build_workbook(rows)
        .map_err(|e| OccuError::spreadsheet("build workbook", path.display().to_string(), e.to_string()))?;
    let bytes = workbook
        .save_to_buffer()
        .map_err(|e| OccuError::spreadsheet("write workbook", path.display().to_string(), e.to_string()))?;
    write_atomic(path, &bytes)?;
    debug!(path = %path.display(), rows = rows.len(), "wrote xlsx");
    Ok(())
}

/// Rows as in-memory `.xlsx` bytes.
pub fn xlsx_bytes(rows: &[Row]) -> OccuResult<Vec<u8>> {
    let mut workbook =
        build_workbook(rows).map_err(|e| OccuError::spreadsheet("build workbook", "<memory>", e.to_string()))?;
    workbook
        .save_to_buffer()
        .map_err(|e| OccuError::spreadsheet("write workbook", "<memory>", e.to_string()))
}

/// Write rows as CSV (same columns as the workbook export) to any writer.
pub fn write_csv_to<W: Write>(rows: &[Row], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        csv_writer.write_record([
            row.number.as_str(),
            row.name.as_str(),
            row.area.as_str(),
            row.occupancy_type.as_str(),
            &row.occupant_load.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write rows to a `.csv` file.
pub fn write_csv(rows: &[Row], path: &Path) -> OccuResult<()> {
    let mut buffer = Vec::new();
    write_csv_to(rows, &mut buffer)
        .map_err(|e| OccuError::spreadsheet("write csv", path.display().to_string(), e.to_string()))?;
    write_atomic(path, &buffer)?;
    debug!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::aggregate;
    use crate::factors::CodeSetId;

    fn ibc() -> FactorTable {
        FactorTable::for_code_set(CodeSetId::Ibc2024)
    }

    fn record(pairs: &[(&str, CellValue)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn write_test_xlsx(path: &Path, headers: &[&str], rows: &[Vec<CellValue>]) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (row_idx, row) in rows.iter().enumerate() {
            let r = (row_idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                match value {
                    CellValue::Empty => {}
                    CellValue::Text(s) => {
                        sheet.write_string(r, col as u16, s).unwrap();
                    }
                    CellValue::Number(n) => {
                        sheet.write_number(r, col as u16, *n).unwrap();
                    }
                }
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_rows_from_records_defaults() {
        let records = vec![record(&[("Area", CellValue::Number(6.0))]), Record::new()];
        let rows = rows_from_records(&records, &ibc());

        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].number, "1");
        assert_eq!(rows[0].name, "Space 1");
        assert_eq!(rows[0].area, "6");
        assert_eq!(rows[0].occupancy_type, "Retail");
        assert_eq!(rows[0].occupant_load, 3);

        assert_eq!(rows[1].number, "2");
        assert_eq!(rows[1].area, "");
        assert_eq!(rows[1].occupant_load, 0);
    }

    #[test]
    fn test_column_variants() {
        let records = vec![
            record(&[
                ("Room Number", CellValue::Number(101.0)),
                ("Name", text("Kitchen")),
                ("Area (m2)", text("4.2")),
                ("Type", text("Restaurant")),
            ]),
            record(&[
                ("  room #", text("B-2")),
                ("ROOM NAME", text("Office")),
                ("area", CellValue::Number(18.6)),
                ("occupancy type", text("Administrative")),
            ]),
        ];
        let rows = rows_from_records(&records, &ibc());
        assert_eq!(rows[0].number, "101");
        assert_eq!(rows[0].name, "Kitchen");
        assert_eq!(rows[0].occupant_load, 3);
        assert_eq!(rows[1].number, "B-2");
        assert_eq!(rows[1].occupancy_type, "Administrative");
        assert_eq!(rows[1].occupant_load, 2);
    }

    #[test]
    fn test_preferred_variant_wins() {
        let records = vec![record(&[
            ("Area (m²)", text("28")),
            ("Area", text("56")),
            ("Occupancy Type", text("Mechanical")),
            ("Type", text("Retail")),
        ])];
        let rows = rows_from_records(&records, &ibc());
        assert_eq!(rows[0].area, "28");
        assert_eq!(rows[0].occupancy_type, "Mechanical");
        assert_eq!(rows[0].occupant_load, 1);
    }

    #[test]
    fn test_present_but_blank_name_stays_blank() {
        let records = vec![record(&[("Room Name", CellValue::Empty), ("Area", text("5"))])];
        let rows = rows_from_records(&records, &ibc());
        assert_eq!(rows[0].name, "");
    }

    #[test]
    fn test_build_record_pads_and_skips_unnamed() {
        let headers = vec!["A".to_string(), "".to_string(), "A".to_string(), "B".to_string()];
        let record = build_record(&headers, vec![text("1"), text("x"), text("2")].into_iter());
        assert_eq!(record.len(), 2);
        assert_eq!(record["A"], text("1"));
        assert_eq!(record["B"], CellValue::Empty);
    }

    #[test]
    fn test_read_xlsx_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.xlsx");
        write_test_xlsx(
            &path,
            &["Room #", "Room Name", "Area (m²)", "Occupancy Type"],
            &[
                vec![text("1"), text("Shop"), CellValue::Number(6.0), text("Retail")],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Empty, CellValue::Empty],
                vec![text("2"), text("Cafe"), CellValue::Number(4.2), text("Restaurant")],
                vec![text("3"), text("Plant"), text("n/a"), text("Boiler")],
            ],
        );

        let rows = import_rows(&path, &ibc()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].name, "Cafe");
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[2].occupancy_type, "Retail");
        assert_eq!(rows[2].occupant_load, 0);

        let totals = aggregate(&rows, &ibc()).totals;
        assert_eq!(totals.get("Retail"), Some(3));
        assert_eq!(totals.get("Restaurant"), Some(3));
        assert_eq!(totals.grand_total, 6);
    }

    #[test]
    fn test_read_csv_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.CSV");
        std::fs::write(
            &path,
            "Room Number,Name,Area,Type\n101,Lobby,56,Retail\n,,,\n102,Boiler,30,Mechanical\n",
        )
        .unwrap();

        let rows = import_rows(&path, &ibc()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].occupant_load, 20);
        assert_eq!(rows[1].number, "102");
        assert_eq!(rows[1].occupant_load, 2);
    }

    #[test]
    fn test_unreadable_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        let err = import_rows(&path, &ibc()).unwrap_err();
        assert_eq!(err.error_code(), "SPREADSHEET_ERROR");
    }

    #[test]
    fn test_xlsx_export_roundtrip() {
        let table = ibc();
        let rows = aggregate(
            &[
                Row::new(1, "101", "Shop", "6", "Retail"),
                Row::new(2, "102", "Cafe", "4.2", "Restaurant"),
                Row::new(3, "103", "Store", "", "Retail"),
                Row::new(4, "104", "Hall", "big", "Assembly"),
                Row::new(5, "105", "Office", "18.6", "Administrative"),
            ],
            &table,
        )
        .rows;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occupancy_data.xlsx");
        write_xlsx(&rows, &path).unwrap();

        let records = read_records(&path).unwrap();
        let headers: Vec<&String> = records[0].keys().collect();
        assert_eq!(headers.len(), EXPORT_HEADERS.len());

        let reimported = rows_from_records(&records, &table);
        assert_eq!(reimported.len(), rows.len());
        for (before, after) in rows.iter().zip(&reimported) {
            assert_eq!(after.number, before.number);
            assert_eq!(after.name, before.name);
            assert_eq!(parse_area(&after.area), parse_area(&before.area));
            assert_eq!(after.occupancy_type, before.occupancy_type);
            assert_eq!(after.occupant_load, before.occupant_load);
        }
    }

    #[test]
    fn test_csv_export_roundtrip() {
        let table = ibc();
        let rows = aggregate(
            &[
                Row::new(1, "1", "Shop, front", "6", "Retail"),
                Row::new(2, "2", "Plant", "30", "Mechanical"),
            ],
            &table,
        )
        .rows;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occupancy.csv");
        write_csv(&rows, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Room #,Room Name,Area (m²),Occupancy Type,Occupant Load"));

        let reimported = import_rows(&path, &table).unwrap();
        assert_eq!(reimported, rows);
    }

    #[test]
    fn test_xlsx_bytes_is_zip() {
        let bytes = xlsx_bytes(&[Row::new(1, "1", "A", "10", "Retail")]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_exports_replace_existing_files_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx = dir.path().join("occupancy_data.xlsx");
        let csv = dir.path().join("occupancy_data.csv");
        std::fs::write(&xlsx, "stale").unwrap();
        std::fs::write(&csv, "stale").unwrap();

        let rows = [Row::new(1, "101", "Shop", "6", "Retail")];
        write_xlsx(&rows, &xlsx).unwrap();
        write_csv(&rows, &csv).unwrap();

        assert!(std::fs::read(&xlsx).unwrap().starts_with(b"PK"));
        assert!(std::fs::read_to_string(&csv).unwrap().starts_with("Room #,"));
        assert!(!dir.path().join("occupancy_data.xlsx.tmp").exists());
        assert!(!dir.path().join("occupancy_data.csv.tmp").exists());
    }
}
