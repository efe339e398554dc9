//! Loading return grids from delimited text.
//!
//! Expected layout:
//!
//! ```text
//! Tenor,0,1,2
//! 1,0.010,0.012,0.011
//! 3,0.031,0.030,0.032
//! ```
//!
//! The header labels months consecutively from 0. Each later row starts
//! with a tenor in months followed by one return per month. Rows may be in
//! any tenor order; blank rows are ignored.

use crate::core::return_grid::{GridError, ReturnGrid};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

const SPREADSHEET_EXTENSIONS: [&str; 6] = ["xlsx", "xls", "xlsm", "xlsb", "numbers", "ods"];

/// Problems with a single data row.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("missing tenor")]
    MissingTenor,
    #[error("invalid tenor {0:?}")]
    InvalidTenor(String),
    #[error("tenor must be a positive integer")]
    NonPositiveTenor,
    #[error("tenor is too long")]
    TenorTooLong,
    #[error("duplicate tenor {0}")]
    DuplicateTenor(u32),
    #[error("month {month}: missing bond return")]
    MissingReturn { month: usize },
    #[error("month {month}: invalid bond return {value:?}")]
    InvalidReturn { month: usize, value: String },
    #[error("month {month}: bond return is too large")]
    ReturnTooLarge { month: usize },
    #[error("month {month}: bond return is too small")]
    ReturnTooSmall { month: usize },
    #[error("missing month {0}")]
    MissingMonth(usize),
    #[error("missing months {from} to {to}")]
    MissingMonths { from: usize, to: usize },
    #[error("unexpected data beyond month {0}")]
    ExtraMonths(usize),
}

/// Errors arising from loading a return grid.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("file has no extension, must be .csv or .txt")]
    NoExtension,
    #[error("file extension .{0} is a spreadsheet format, save as CSV instead")]
    SpreadsheetExtension(String),
    #[error("file extension must be .csv or .txt, received .{0}")]
    BadExtension(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("all lines blank")]
    AllBlank,
    #[error("first entry should be \"Tenor\", received {0:?}")]
    BadHeader(String),
    #[error("missing or mislabelled month {expected}: found {found:?}")]
    MislabelledMonth { expected: usize, found: String },
    #[error("no bond return data")]
    NoData,
    #[error("row {row}: {reason}")]
    Row { row: u64, reason: RowError },
    #[error("shortest tenor is {shortest} months, but only {months} months of data provided")]
    HorizonTooShort { shortest: u32, months: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Check that a path names a plain-text table rather than a spreadsheet.
pub fn validate_extension(path: &Path) -> Result<(), CsvError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(CsvError::NoExtension)?;
    if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CsvError::SpreadsheetExtension(ext));
    }
    if ext != "csv" && ext != "txt" {
        return Err(CsvError::BadExtension(ext));
    }
    Ok(())
}

/// Load a return grid from a `.csv` or `.txt` file.
pub fn load_return_csv(path: impl AsRef<Path>) -> Result<ReturnGrid, CsvError> {
    let path = path.as_ref();
    validate_extension(path)?;
    let file = File::open(path).map_err(|source| CsvError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let grid = parse_return_csv(file)?;
    log::info!(
        "loaded {} tenors x {} months from {}",
        grid.num_tenors(),
        grid.num_months(),
        path.display()
    );
    Ok(grid)
}

/// Parse a return grid from any reader.
pub fn parse_return_csv<R: Read>(reader: R) -> Result<ReturnGrid, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = reader.records();

    let header = loop {
        match records.next() {
            Some(record) => {
                let record = record?;
                if !is_blank(&record) {
                    break record;
                }
            }
            None => return Err(CsvError::AllBlank),
        }
    };
    let num_months = months_in_header(&header)?;

    let mut tenors = Vec::new();
    let mut returns = Vec::new();
    let mut seen = HashSet::new();

    for record in records {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        let row = record.position().map(|p| p.line()).unwrap_or_default();
        let row_err = |reason| CsvError::Row { row, reason };

        let tenor = parse_tenor(record.get(0).unwrap_or_default()).map_err(row_err)?;
        if !seen.insert(tenor) {
            return Err(row_err(RowError::DuplicateTenor(tenor)));
        }
        tenors.push(tenor);

        let cells: Vec<&str> = record.iter().skip(1).collect();
        if cells.len() < num_months {
            let reason = if cells.len() + 1 == num_months {
                RowError::MissingMonth(cells.len())
            } else {
                RowError::MissingMonths {
                    from: cells.len(),
                    to: num_months - 1,
                }
            };
            return Err(row_err(reason));
        }
        if cells.len() > num_months {
            return Err(row_err(RowError::ExtraMonths(num_months - 1)));
        }
        for (month, cell) in cells.into_iter().enumerate() {
            returns.push(parse_return(cell, month).map_err(row_err)?);
        }
    }

    let shortest = tenors.iter().copied().min().ok_or(CsvError::NoData)?;
    if shortest as usize > num_months {
        return Err(CsvError::HorizonTooShort {
            shortest,
            months: num_months,
        });
    }

    Ok(ReturnGrid::from_unsorted(tenors, num_months, returns)?)
}

/// Write a grid in the layout [`parse_return_csv`] reads.
pub fn write_return_csv<W: Write>(grid: &ReturnGrid, writer: W) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Tenor".to_string()];
    header.extend((0..grid.num_months()).map(|m| m.to_string()));
    writer.write_record(&header)?;

    for (row, tenor) in grid.tenors().iter().enumerate() {
        let mut record = vec![tenor.to_string()];
        record.extend((0..grid.num_months()).map(|m| grid.return_at(row, m).to_string()));
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|source| CsvError::Io {
        path: "<output>".to_string(),
        source,
    })?;
    Ok(())
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Validate the header row and return the number of months it labels.
fn months_in_header(header: &csv::StringRecord) -> Result<usize, CsvError> {
    let first = header.get(0).unwrap_or_default();
    if !first.eq_ignore_ascii_case("tenor") {
        return Err(CsvError::BadHeader(first.to_string()));
    }

    let mut months = 0;
    for cell in header.iter().skip(1) {
        if cell.parse::<usize>().ok() != Some(months) {
            return Err(CsvError::MislabelledMonth {
                expected: months,
                found: cell.to_string(),
            });
        }
        months += 1;
    }
    if months == 0 {
        return Err(CsvError::NoData);
    }
    Ok(months)
}

fn parse_tenor(cell: &str) -> Result<u32, RowError> {
    if cell.is_empty() {
        return Err(RowError::MissingTenor);
    }
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match cell.parse::<u32>() {
        Ok(0) => Err(RowError::NonPositiveTenor),
        Ok(tenor) => Ok(tenor),
        Err(_) if cell.strip_prefix('-').is_some_and(all_digits) => Err(RowError::NonPositiveTenor),
        Err(_) if all_digits(cell) => Err(RowError::TenorTooLong),
        Err(_) => Err(RowError::InvalidTenor(cell.to_string())),
    }
}

fn parse_return(cell: &str, month: usize) -> Result<f64, RowError> {
    if cell.is_empty() {
        return Err(RowError::MissingReturn { month });
    }
    let value: f64 = cell.parse().map_err(|_| RowError::InvalidReturn {
        month,
        value: cell.to_string(),
    })?;
    if value.is_nan() {
        return Err(RowError::InvalidReturn {
            month,
            value: cell.to_string(),
        });
    }
    // Returns are applied as (1 + r), so that is what has to be finite.
    let factor = 1.0 + value;
    if factor.is_infinite() {
        return Err(if factor.is_sign_negative() {
            RowError::ReturnTooSmall { month }
        } else {
            RowError::ReturnTooLarge { month }
        });
    }
    Ok(value)
}
