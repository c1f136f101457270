use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef};
use arrow::error::ArrowError;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use thiserror::Error;

use super::model::{Dataset, LapTable, Year, YearTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The dataset could not be loaded. Always fatal at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("data file {} is unavailable", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read CSV {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read Parquet {}", .path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: ParquetError,
    },
    #[error("failed to decode Parquet {}", .path.display())]
    Arrow {
        path: PathBuf,
        #[source]
        source: ArrowError,
    },
    #[error("{}: required column '{column}' is missing", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("{}: row {row}, column '{column}': invalid value '{value}'", .path.display())]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
    #[error("{}: unsupported file extension '.{ext}'", .path.display())]
    UnsupportedFormat { path: PathBuf, ext: String },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the events, drivers and lap-count tables. Any failure aborts the
/// whole load; there is no partial dataset.
pub fn load_dataset(events: &Path, drivers: &Path, laps: &Path) -> Result<Dataset, CatalogError> {
    let dataset = Dataset {
        events: load_year_table(events)?,
        drivers: load_year_table(drivers)?,
        laps: load_lap_table(laps)?,
    };
    log::info!(
        "Loaded dataset: {} years of events, {} years of drivers, {} lap counts",
        dataset.events.years().len(),
        dataset.drivers.years().len(),
        dataset.laps.len()
    );
    Ok(dataset)
}

/// Load a column-per-year table. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row of years, one entry per cell
/// * `.parquet` – one column per year, any scalar type (rendered as text)
///
/// Columns whose header is not a year (e.g. a pandas index) are ignored.
pub fn load_year_table(path: &Path) -> Result<YearTable, CatalogError> {
    let columns = match TableFormat::of(path)? {
        TableFormat::Csv => read_csv(path)?,
        TableFormat::Parquet => read_parquet(path)?,
    };

    let year_columns: Vec<(Year, Vec<String>)> = columns
        .into_iter()
        .filter_map(|(header, cells)| {
            let year = header.parse::<Year>().ok()?;
            Some((year, cells.into_iter().flatten().collect()))
        })
        .collect();

    if year_columns.is_empty() {
        return Err(CatalogError::MissingColumn {
            path: path.to_path_buf(),
            column: "<year>".to_string(),
        });
    }
    Ok(YearTable::from_columns(year_columns))
}

/// Load the lap-count table: an `event` column and a `laps` column.
pub fn load_lap_table(path: &Path) -> Result<LapTable, CatalogError> {
    let columns = match TableFormat::of(path)? {
        TableFormat::Csv => read_csv(path)?,
        TableFormat::Parquet => read_parquet(path)?,
    };

    let find = |name: &str| {
        columns
            .iter()
            .position(|(h, _)| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| CatalogError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let event_idx = find("event")?;
    let laps_idx = find("laps")?;

    let events = &columns[event_idx].1;
    let laps = &columns[laps_idx].1;

    let mut rows = Vec::with_capacity(events.len());
    for (row, event) in events.iter().enumerate() {
        let Some(event) = event.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
            continue;
        };
        let raw = laps.get(row).cloned().flatten().unwrap_or_default();
        let n = parse_laps(&raw).ok_or_else(|| CatalogError::InvalidValue {
            path: path.to_path_buf(),
            row,
            column: "laps".to_string(),
            value: raw.clone(),
        })?;
        rows.push((event.to_string(), n));
    }
    Ok(LapTable::from_rows(rows))
}

/// Lap counts must be positive. Accepts `57` as well as `57.0`, which is
/// what a float-typed column writes.
fn parse_laps(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let n = match raw.parse::<u32>() {
        Ok(n) => n,
        Err(_) => {
            let f = raw.parse::<f64>().ok()?;
            if f.fract() != 0.0 || f < 0.0 || f > u32::MAX as f64 {
                return None;
            }
            f as u32
        }
    };
    (n > 0).then_some(n)
}

// ---------------------------------------------------------------------------
// Format dispatch
// ---------------------------------------------------------------------------

enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    fn of(path: &Path) -> Result<Self, CatalogError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "parquet" | "pq" => Ok(TableFormat::Parquet),
            _ => Err(CatalogError::UnsupportedFormat {
                path: path.to_path_buf(),
                ext,
            }),
        }
    }
}

/// A raw column: header and one optional cell per row (`None` = blank/null).
type RawColumn = (String, Vec<Option<String>>);

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<Vec<RawColumn>, CatalogError> {
    let csv_err = |source| CatalogError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut columns: Vec<RawColumn> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| (h.to_string(), Vec::new()))
        .collect();

    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        for (idx, (_, cells)) in columns.iter_mut().enumerate() {
            let cell = record
                .get(idx)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            cells.push(cell);
        }
    }
    Ok(columns)
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

fn read_parquet(path: &Path) -> Result<Vec<RawColumn>, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parquet_err = |source| CatalogError::Parquet {
        path: path.to_path_buf(),
        source,
    };

    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let mut columns: Vec<RawColumn> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), Vec::new()))
        .collect();
    let reader = builder.build().map_err(parquet_err)?;

    for batch in reader {
        let batch = batch.map_err(|source| CatalogError::Arrow {
            path: path.to_path_buf(),
            source,
        })?;
        for (idx, (_, cells)) in columns.iter_mut().enumerate() {
            let array = batch.column(idx);
            for row in 0..batch.num_rows() {
                let cell = cell_text(array, row).map_err(|source| CatalogError::Arrow {
                    path: path.to_path_buf(),
                    source,
                })?;
                cells.push(cell);
            }
        }
    }
    Ok(columns)
}

/// Render a single Arrow cell as trimmed text; nulls and blanks are `None`.
fn cell_text(array: &ArrayRef, row: usize) -> Result<Option<String>, ArrowError> {
    if array.is_null(row) {
        return Ok(None);
    }
    let text = array_value_to_string(array, row)?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}
