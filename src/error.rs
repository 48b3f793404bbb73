// Error types for loading, column resolution and report output.
//
// Per-row classification problems are not errors; they surface as
// `classify::RowOutcome::Discarded` and never abort a pass.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file format: {0:?} (expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods)")]
    UnsupportedFormat(String),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook parse failed: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook contains no sheets")]
    NoSheets,

    #[error("sheet {0:?} has no data rows")]
    EmptySheet(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    #[error(
        "missing required columns: {} (headers found: {})",
        .missing.join(", "),
        .found.join(", ")
    )]
    Missing {
        missing: Vec<String>,
        found: Vec<String>,
    },
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xlsx write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("no aggregated rows to export")]
    NoData,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Columns(#[from] ColumnError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("no file loaded; load a production sheet first (option 1)")]
    NothingLoaded,
}

pub type AppResult<T> = Result<T, AppError>;
