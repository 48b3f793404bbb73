use crate::error::LoadError;
use crate::types::RawTable;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

/// Sheet-name token marking the production data sheet in a workbook.
pub const RAW_DATA_SHEET_TOKEN: &str = "RAW DATA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Csv,
    Workbook,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(InputKind::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(InputKind::Workbook),
            _ => Err(LoadError::UnsupportedFormat(ext)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub file_name: String,
    /// Selected sheet; `None` for CSV input.
    pub sheet: Option<String>,
    pub total_rows: usize,
    pub blank_rows: usize,
}

pub fn load_table(path: &Path) -> Result<(RawTable, LoadReport), LoadError> {
    let kind = InputKind::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    // The byte buffer is consumed here; only the parsed table survives.
    let (table, mut report) = match kind {
        InputKind::Csv => parse_csv(&bytes)?,
        InputKind::Workbook => parse_workbook(bytes)?,
    };
    report.file_name = file_name;

    info!(
        file = %report.file_name,
        sheet = report.sheet.as_deref().unwrap_or("-"),
        rows = report.total_rows,
        columns = table.headers.len(),
        "table loaded"
    );
    Ok((table, report))
}

pub fn parse_csv(bytes: &[u8]) -> Result<(RawTable, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    build_table(headers, rows, None)
}

pub fn parse_workbook(bytes: Vec<u8>) -> Result<(RawTable, LoadReport), LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet_names = workbook.sheet_names();
    let sheet = select_sheet(&sheet_names)
        .ok_or(LoadError::NoSheets)?
        .to_string();
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| LoadError::EmptySheet(sheet.clone()))?
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    let rows = rows_iter
        .map(|r| r.iter().map(|cell| cell.to_string()).collect())
        .collect();
    build_table(headers, rows, Some(sheet))
}

/// First sheet whose name mentions RAW DATA (any case), else the first sheet.
pub fn select_sheet(names: &[String]) -> Option<&str> {
    names
        .iter()
        .find(|n| n.to_uppercase().contains(RAW_DATA_SHEET_TOKEN))
        .or_else(|| names.first())
        .map(String::as_str)
}

fn build_table(
    mut headers: Vec<String>,
    rows: Vec<Vec<String>>,
    sheet: Option<String>,
) -> Result<(RawTable, LoadReport), LoadError> {
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    let label = sheet.clone().unwrap_or_else(|| "csv".to_string());
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::EmptySheet(label));
    }

    let total_rows = rows.len();
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .collect();
    if rows.is_empty() {
        return Err(LoadError::EmptySheet(label));
    }

    let report = LoadReport {
        file_name: String::new(),
        sheet,
        total_rows: rows.len(),
        blank_rows: total_rows - rows.len(),
    };
    Ok((RawTable { headers, rows }, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::io::Write;
    use tempfile::{tempdir, Builder};

    const HEADER_LINE: &str = "단조작업일,프레스별,생산중량(양품),제품형상,강종,소재타입,INGOT 종류";

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_sheet_prefers_raw_data() {
        let sheets = names(&["요약", "2025 raw data", "RAW DATA"]);
        assert_eq!(select_sheet(&sheets), Some("2025 raw data"));
        assert_eq!(select_sheet(&names(&["Pivot", "Notes"])), Some("Pivot"));
        assert_eq!(select_sheet(&[]), None);
    }

    #[test]
    fn test_input_kind_from_extension() {
        assert_eq!(InputKind::from_path(Path::new("a.CSV")).unwrap(), InputKind::Csv);
        assert_eq!(InputKind::from_path(Path::new("a.xlsx")).unwrap(), InputKind::Workbook);
        assert!(matches!(
            InputKind::from_path(Path::new("a.pdf")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
    }

    #[test]
    fn test_parse_csv_quoted_and_ragged_rows() {
        let data = format!(
            "{HEADER_LINE}\n\
             2025-01-02,P15,\"25,625\",SHAFT,CARBON,INGOT,IC\n\
             ,,,,,,\n\
             2025-01-03,P8,4084,RING,CARBON,R/B\n"
        );
        let (table, report) = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], "25,625");
        assert_eq!(table.rows[1].len(), 6);
        assert_eq!(report.blank_rows, 1);
        assert_eq!(report.sheet, None);
    }

    #[test]
    fn test_parse_csv_strips_bom() {
        let data = format!("\u{feff}{HEADER_LINE}\n2025-01-02,P15,1,RING,CARBON,INGOT,IC\n");
        let (table, _) = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers[0], "단조작업일");
    }

    #[test]
    fn test_parse_csv_without_data_rows_fails() {
        let data = format!("{HEADER_LINE}\n");
        assert!(matches!(parse_csv(data.as_bytes()), Err(LoadError::EmptySheet(_))));
        assert!(matches!(parse_csv(b""), Err(LoadError::EmptySheet(_))));
    }

    #[test]
    fn test_load_table_from_csv_file() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "{HEADER_LINE}").unwrap();
        writeln!(temp_file, "2025-01-02,P15,25625,SHAFT,CARBON,INGOT,IC").unwrap();

        let (table, report) = load_table(temp_file.path()).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(report.total_rows, 1);
        assert!(report.file_name.ends_with(".csv"));
    }

    #[test]
    fn test_load_table_missing_file() {
        let result = load_table(Path::new("definitely_missing_input.csv"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_load_table_corrupt_workbook() {
        let mut temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(temp_file, "this is not a zip archive").unwrap();
        assert!(matches!(load_table(temp_file.path()), Err(LoadError::Workbook(_))));
    }

    #[test]
    fn test_load_workbook_picks_raw_data_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forge.xlsx");

        let mut wb = Workbook::new();
        let summary = wb.add_worksheet();
        summary.set_name("피벗").unwrap();
        summary.write_string(0, 0, "행 레이블").unwrap();
        summary.write_string(1, 0, "총합계").unwrap();

        let raw = wb.add_worksheet();
        raw.set_name("Raw Data 2025").unwrap();
        for (col, h) in ["프레스별", "생산중량(양품)", "제품형상"].iter().enumerate() {
            raw.write_string(0, col as u16, *h).unwrap();
        }
        raw.write_string(1, 0, "P15").unwrap();
        raw.write_number(1, 1, 42565.0).unwrap();
        raw.write_string(1, 2, "RING").unwrap();
        wb.save(&path).unwrap();

        let (table, report) = load_table(&path).unwrap();
        assert_eq!(report.sheet.as_deref(), Some("Raw Data 2025"));
        assert_eq!(table.headers, names(&["프레스별", "생산중량(양품)", "제품형상"]));
        assert_eq!(table.rows, vec![names(&["P15", "42565", "RING"])]);
    }

    #[test]
    fn test_load_workbook_falls_back_to_first_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forge.xlsx");

        let mut wb = Workbook::new();
        let first = wb.add_worksheet();
        first.set_name("Sheet1").unwrap();
        first.write_string(0, 0, "프레스별").unwrap();
        first.write_string(1, 0, "P8").unwrap();
        wb.add_worksheet().set_name("Sheet2").unwrap();
        wb.save(&path).unwrap();

        let (table, report) = load_table(&path).unwrap();
        assert_eq!(report.sheet.as_deref(), Some("Sheet1"));
        assert_eq!(table.rows[0][0], "P8");
    }
}
