// Entry point and high-level CLI flow.
//
// Interactive mode keeps one loaded production sheet in memory:
// - Option [1] loads a CSV or workbook and prints load diagnostics.
// - Option [2] aggregates it into the CBAM forging report, prints a preview
//   and writes the CSV/TSV/XLSX/JSON exports.
// A failed load leaves the session waiting for another file. End of input
// on stdin ends the session.
//
// `--batch --input <file>` runs load + report once and exits.
mod aggregate;
mod classify;
mod columns;
mod error;
mod loader;
mod logging;
mod matrix;
mod output;
mod reports;
mod types;
mod util;

use chrono::Local;
use clap::Parser;
use error::{AppError, AppResult};
use loader::LoadReport;
use once_cell::sync::Lazy;
use output::ExportPaths;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};
use types::RawTable;

#[derive(Debug, Parser)]
#[command(name = "cbam-forge-report", version, about = "CBAM forge-shop production weight report")]
struct Cli {
    /// Production sheet to load at start-up (.csv, .xlsx, .xls, ...)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the report exports are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Load, report and export once, then exit (requires --input)
    #[arg(long, requires = "input")]
    batch: bool,

    /// Number of report rows shown in the console preview (all when omitted)
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

// The currently loaded sheet. Replaced wholesale on every successful load;
// each report generation builds its own column map and matrix.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { loaded: None }));

struct AppState {
    loaded: Option<(RawTable, LoadReport)>,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read a single line of input after printing `prompt`.
///
/// Returns `None` once stdin is closed or unreadable.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    read_line_from(&mut io::stdin().lock())
}

fn read_line_from<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask the user whether to go back to the menu after generating a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N` or input ended.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load a production sheet.
///
/// On success the table replaces whatever was loaded before. On failure the
/// previous table is dropped too, so a report can never be generated from a
/// stale file.
fn handle_load(path: &Path) -> AppResult<()> {
    app_state().loaded = None;
    let (table, load_report) = loader::load_table(path)?;

    match &load_report.sheet {
        Some(sheet) => println!("Loaded sheet '{}' from {}", sheet, load_report.file_name),
        None => println!("Loaded {}", load_report.file_name),
    }
    println!(
        "{} data rows, {} columns ({} blank rows skipped)\n",
        util::format_int(load_report.total_rows),
        util::format_int(table.headers.len()),
        util::format_int(load_report.blank_rows)
    );
    app_state().loaded = Some((table, load_report));
    Ok(())
}

/// Handle option [2]: aggregate the loaded sheet, preview and export.
///
/// Returns the paths of the written bundle; on failure nothing is left behind.
fn handle_generate_reports(output_dir: &Path, preview_rows: Option<usize>) -> AppResult<ExportPaths> {
    let loaded = app_state().loaded.clone();
    let Some((table, load_report)) = loaded else {
        return Err(AppError::NothingLoaded);
    };

    let (matrix, stats) = aggregate::aggregate(&table)?;
    let report = reports::build_report(&matrix);
    let rows = reports::render_rows(&report);

    println!("CBAM 보고서: 단조설비 생산중량\n");
    output::preview_table_rows(&rows, preview_rows);
    println!(
        "[진단 결과] P15 기계의 총 계산 중량: {} Kg",
        util::format_number(report.diagnostic_total, 0)
    );
    println!(
        "Rows: {} read, {} aggregated, {} skipped",
        util::format_int(stats.total_rows),
        util::format_int(stats.contributed_rows),
        util::format_int(stats.discarded_rows())
    );
    for (kind, count) in &stats.discarded {
        println!("  - {}: {}", kind, util::format_int(*count));
    }
    if stats.total_weight == 0.0 {
        println!(
            "Warning: aggregated weight is 0. Check the column names; headers found: [{}]",
            table.visible_headers().join(", ")
        );
    }
    println!();

    let today = Local::now().format("%Y-%m-%d").to_string();
    let paths = ExportPaths::new(output_dir, &today);
    let summary = reports::generate_summary(
        &report,
        &stats,
        &load_report.file_name,
        load_report.sheet.as_deref(),
        &today,
    );
    output::write_bundle(&paths, &rows, &summary)?;

    info!(csv = %paths.csv.display(), xlsx = %paths.xlsx.display(), "report exported");
    println!("Exported {}", paths.csv.display());
    println!("Exported {}", paths.tsv.display());
    println!("Exported {}", paths.xlsx.display());
    println!("Exported {}\n", paths.summary.display());
    Ok(paths)
}

fn run_batch(cli: &Cli, input: &Path) -> AppResult<ExportPaths> {
    handle_load(input)?;
    handle_generate_reports(&cli.output_dir, cli.preview_rows)
}

fn run_interactive(cli: &Cli) {
    if let Some(input) = &cli.input {
        if let Err(e) = handle_load(input) {
            error!("{e}");
            eprintln!("Failed to load file: {e}\n");
        }
    }

    loop {
        println!("CBAM Forge Report");
        println!("[1] Load a file");
        println!("[2] Generate report");
        println!("[3] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => {
                let Some(path) = read_line("File path: ") else {
                    println!("\nExiting the program.");
                    break;
                };
                if let Err(e) = handle_load(Path::new(&path)) {
                    error!("{e}");
                    eprintln!("Failed to load file: {e}\n");
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&cli.output_dir, cli.preview_rows) {
                    error!("{e}");
                    eprintln!("Error: {e}\n");
                    continue;
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match (&cli.input, cli.batch) {
        (Some(input), true) => match run_batch(&cli, input) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e}");
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        _ => {
            run_interactive(&cli);
            ExitCode::SUCCESS
        }
    }
}
