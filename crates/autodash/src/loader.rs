//! Dataset loading from CSV, Excel and Parquet files.
//!
//! CSV loading tries progressively more lenient strategies before giving up.
//! Workbooks are read from their first worksheet. Both treat the usual
//! spreadsheet markers (`NA`, `N/A`, `null`, ...) as missing.

use crate::error::{DashboardError, Result, ResultExt};
use crate::types::RawTable;
use crate::utils::{format_millis, millis_to_series};
use calamine::{Data, DataType as _, Reader, open_workbook_auto};
use polars::prelude::*;
use std::fmt;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Cell contents read as missing, besides the empty cell.
pub const MISSING_MARKERS: &[&str] = &["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None"];

const SCHEMA_INFERENCE_ROWS: usize = 100;

/// Input formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Excel,
    Parquet,
}

impl InputFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("xlsx") | Some("xls") => Ok(Self::Excel),
            Some("parquet") | Some("pq") => Ok(Self::Parquet),
            Some(other) => Err(DashboardError::UnsupportedInput(format!(
                "unsupported file type '.{}' (expected .csv, .xlsx or .parquet)",
                other
            ))),
            None => Err(DashboardError::UnsupportedInput(format!(
                "cannot determine file type of '{}'",
                path.display()
            ))),
        }
    }
}

/// Load a dataset file into a raw table.
pub fn load_table(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;

    info!("Loading dataset from: {}", path.display());
    let df = match format {
        InputFormat::Csv => load_csv_with_fallbacks(path)?,
        InputFormat::Excel => load_excel(path)?,
        InputFormat::Parquet => {
            let file = File::open(path)?;
            ParquetReader::new(file)
                .finish()
                .context(format!("Failed to read {}", path.display()))?
        }
    };
    info!("Dataset loaded successfully: {:?}", df.shape());

    Ok(RawTable::from(df))
}

/// Parse CSV text held in memory.
pub fn read_csv_str(content: &str) -> Result<RawTable> {
    let df = csv_options(true)
        .into_reader_with_file_handle(Cursor::new(content.as_bytes()))
        .finish()?;
    Ok(RawTable::from(df))
}

fn csv_options(quoted: bool) -> CsvReadOptions {
    let markers = MISSING_MARKERS.iter().map(|m| PlSmallStr::from(*m)).collect();
    let mut parse_options =
        CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(markers)));
    if quoted {
        parse_options = parse_options.with_quote_char(Some(b'"'));
    } else {
        parse_options = parse_options.with_quote_char(None);
    }

    CsvReadOptions::default()
        .with_infer_schema_length(Some(SCHEMA_INFERENCE_ROWS))
        .with_has_header(true)
        .with_parse_options(parse_options)
}

/// Load CSV with multiple fallback strategies.
fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match csv_options(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    // Strategy 2: Without quote handling
    match csv_options(false)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading without quotes failed: {}", e),
    }

    // Strategy 3: Pre-clean content
    let content = std::fs::read_to_string(path)?;
    csv_options(true)
        .into_reader_with_file_handle(Cursor::new(clean_csv_content(&content)))
        .finish()
        .context(format!("Failed to parse {}", path.display()))
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Spreadsheets
// =============================================================================

/// Read the first worksheet of a workbook. Its first row names the columns.
fn load_excel(path: &Path) -> Result<DataFrame> {
    // Workbook readers wrap IO failures in their own error types
    std::fs::metadata(path)?;
    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(path, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            DashboardError::UnsupportedInput(format!("'{}' has no worksheets", path.display()))
        })?
        .map_err(|e| spreadsheet_error(path, e))?;

    let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
    debug!(rows = rows.len(), "Read worksheet");
    sheet_to_frame(&rows)
}

fn spreadsheet_error(path: &Path, error: impl fmt::Display) -> DashboardError {
    DashboardError::UnsupportedInput(format!(
        "failed to read spreadsheet '{}': {}",
        path.display(),
        error
    ))
}

/// Build a frame from worksheet rows; unnamed header cells become `column_<n>`.
fn sheet_to_frame(rows: &[Vec<Data>]) -> Result<DataFrame> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let mut columns = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let name = match cell_text(cell) {
            Some(name) if !name.trim().is_empty() => name,
            _ => format!("column_{}", idx + 1),
        };
        let cells: Vec<Option<&Data>> = body
            .iter()
            .map(|row| row.get(idx).filter(|cell| !is_missing_cell(cell)))
            .collect();
        columns.push(cells_to_series(&name, &cells)?.into_column());
    }

    Ok(DataFrame::new(columns)?)
}

fn is_missing_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => {
            let s = s.trim();
            s.is_empty() || MISSING_MARKERS.contains(&s)
        }
        _ => false,
    }
}

fn is_datetime_cell(cell: &Data) -> bool {
    matches!(cell, Data::DateTime(_) | Data::DateTimeIso(_))
}

fn cell_millis(cell: &Data) -> Option<i64> {
    cell.as_datetime().map(|dt| dt.and_utc().timestamp_millis())
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        _ if is_datetime_cell(cell) => cell_millis(cell).map(format_millis),
        other => Some(other.to_string()),
    }
}

/// One typed series per worksheet column. A column keeps a native type only
/// when every present cell agrees on it; anything mixed is read as text.
fn cells_to_series(name: &str, cells: &[Option<&Data>]) -> Result<Series> {
    let present: Vec<&Data> = cells.iter().flatten().copied().collect();
    let name = PlSmallStr::from(name);
    let all = |pred: fn(&Data) -> bool| {
        !present.is_empty() && present.iter().all(|cell| pred(cell))
    };

    let series = if all(|c| matches!(c, Data::Int(_) | Data::Float(_))) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| c.and_then(|cell| cell.as_f64()))
            .collect();
        Series::new(name, values)
    } else if all(|c| matches!(c, Data::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| c.and_then(|cell| cell.get_bool()))
            .collect();
        Series::new(name, values)
    } else if all(|c| is_datetime_cell(c) && cell_millis(c).is_some()) {
        let millis = cells.iter().map(|c| c.and_then(cell_millis)).collect();
        millis_to_series(name, millis)?
    } else {
        let values: Vec<Option<String>> =
            cells.iter().map(|c| c.and_then(cell_text)).collect();
        Series::new(name, values)
    };

    Ok(series)
}
