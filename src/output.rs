use crate::error::OutputError;
use crate::types::DisplayRow;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::warn;

pub const REPORT_STEM: &str = "CBAM_단조공장_보고서";
pub const XLSX_SHEET_NAME: &str = "CBAM_단조공장";

/// Files written for one generated report.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub tsv: PathBuf,
    pub xlsx: PathBuf,
    pub summary: PathBuf,
}

impl ExportPaths {
    /// `<dir>/CBAM_단조공장_보고서_<date>.{csv,tsv,xlsx}` plus `_summary.json`.
    pub fn new(dir: &Path, date_stamp: &str) -> Self {
        let stem = format!("{REPORT_STEM}_{date_stamp}");
        ExportPaths {
            csv: dir.join(format!("{stem}.csv")),
            tsv: dir.join(format!("{stem}.tsv")),
            xlsx: dir.join(format!("{stem}.xlsx")),
            summary: dir.join(format!("{stem}_summary.json")),
        }
    }
}

/// Write every file of the bundle, or none of them.
///
/// If any write fails, the files already written by this call are removed
/// and the first error is returned.
pub fn write_bundle<S: Serialize>(
    paths: &ExportPaths,
    rows: &[DisplayRow],
    summary: &S,
) -> Result<(), OutputError> {
    if rows.is_empty() {
        return Err(OutputError::NoData);
    }
    let mut touched = Vec::new();
    let result = write_each(paths, rows, summary, &mut touched);
    if result.is_err() {
        for path in touched {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "could not remove partial export: {e}"),
            }
        }
    }
    result
}

fn write_each<'a, S: Serialize>(
    paths: &'a ExportPaths,
    rows: &[DisplayRow],
    summary: &S,
    touched: &mut Vec<&'a Path>,
) -> Result<(), OutputError> {
    touched.push(&paths.csv);
    write_csv(&paths.csv, rows)?;
    touched.push(&paths.tsv);
    write_tsv(&paths.tsv, rows)?;
    touched.push(&paths.xlsx);
    write_xlsx(&paths.xlsx, rows)?;
    touched.push(&paths.summary);
    write_json(&paths.summary, summary)?;
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    write_delimited(path, rows, b',')
}

/// Tab-separated copy for pasting straight into a spreadsheet.
pub fn write_tsv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    write_delimited(path, rows, b'\t')
}

fn write_delimited<T: Serialize>(path: &Path, rows: &[T], delimiter: u8) -> Result<(), OutputError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// Single-sheet workbook with the report headers and formatted cells.
pub fn write_xlsx(path: &Path, rows: &[DisplayRow]) -> Result<(), OutputError> {
    if rows.is_empty() {
        return Err(OutputError::NoData);
    }
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET_NAME)?;

    for (col, header) in DisplayRow::column_headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (i, row) in rows.iter().enumerate() {
        for (col, text) in row.cells().iter().enumerate() {
            // blank cells stay empty rather than holding ""
            if !text.is_empty() {
                sheet.write_string(i as u32 + 1, col as u16, *text)?;
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows (all rows when `None`).
pub fn render_table<T>(rows: &[T], max_rows: Option<usize>) -> String
where
    T: Tabled + Clone,
{
    let take = max_rows.unwrap_or(rows.len());
    let slice: Vec<T> = rows.iter().take(take).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: Option<usize>)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}
