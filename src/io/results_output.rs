use crate::core::action::{format_path, InvestmentAction};
use crate::optimization::dynamic::OptimalResults;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base name for exported result files.
pub const RESULTS_FILENAME: &str = "results";
/// Highest numeric suffix tried before giving up on a free filename.
pub const RESULT_FILES_LIMIT: usize = 1000;

/// Errors arising from rendering or exporting results.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unable to access directory {0}")]
    NotADirectory(String),
    #[error("too many result files exist in {0}")]
    TooManyFiles(String),
}

/// How results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown format '{}', expected text, json or csv", other)),
        }
    }
}

/// Rendering options, passed explicitly to every writer.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// Spell out each action under its result (text format only).
    pub verbose: bool,
    /// Render at most this many results.
    pub limit: Option<usize>,
}

/// One ranked result as exported to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult<'a> {
    pub rank: usize,
    pub crf: f64,
    pub percent_return: f64,
    pub path: String,
    pub actions: &'a [InvestmentAction],
}

fn ranked(results: &OptimalResults, limit: Option<usize>) -> impl Iterator<Item = RankedResult<'_>> {
    results
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, (crf, actions))| RankedResult {
            rank: i + 1,
            crf,
            percent_return: 100.0 * crf - 100.0,
            path: format_path(actions),
            actions,
        })
}

/// Render results in the requested format.
pub fn write_results<W: Write>(
    results: &OptimalResults,
    options: &OutputOptions,
    writer: W,
) -> Result<(), ExportError> {
    match options.format {
        OutputFormat::Text => write_text(results, options, writer),
        OutputFormat::Json => write_json(results, options, writer),
        OutputFormat::Csv => write_csv(results, options, writer),
    }
}

fn write_text<W: Write>(
    results: &OptimalResults,
    options: &OutputOptions,
    mut writer: W,
) -> Result<(), ExportError> {
    writeln!(writer, "Results:")?;
    writeln!(writer)?;
    for row in ranked(results, options.limit) {
        writeln!(writer, "{}. {:.2}%: {}", row.rank, row.percent_return, row.path)?;
        if options.verbose {
            for action in row.actions {
                writeln!(writer, "    {:#}", action)?;
            }
        }
    }
    Ok(())
}

fn write_json<W: Write>(
    results: &OptimalResults,
    options: &OutputOptions,
    mut writer: W,
) -> Result<(), ExportError> {
    let rows: Vec<RankedResult<'_>> = ranked(results, options.limit).collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    Ok(())
}

/// One row per result: rank, bare percentage return, quoted path.
///
/// Rows are newline-separated with no trailing newline. Compact tokens never
/// contain quotes, so the path needs no escaping.
fn write_csv<W: Write>(
    results: &OptimalResults,
    options: &OutputOptions,
    mut writer: W,
) -> Result<(), ExportError> {
    for row in ranked(results, options.limit) {
        if row.rank > 1 {
            writeln!(writer)?;
        }
        write!(writer, "{},{:.2}%,\"{}\"", row.rank, row.percent_return, row.path)?;
    }
    Ok(())
}

/// First unused `results.<ext>`, `results_2.<ext>`, ... in `dir`.
pub fn next_output_path(dir: &Path, format: OutputFormat) -> Result<PathBuf, ExportError> {
    if !dir.is_dir() {
        return Err(ExportError::NotADirectory(dir.display().to_string()));
    }
    let ext = format.extension();
    let base = dir.join(format!("{}.{}", RESULTS_FILENAME, ext));
    if !base.exists() {
        return Ok(base);
    }
    (2..=RESULT_FILES_LIMIT)
        .map(|i| dir.join(format!("{}_{}.{}", RESULTS_FILENAME, i, ext)))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| ExportError::TooManyFiles(dir.display().to_string()))
}

/// Write results to `path`, truncating any existing file.
pub fn export_results(
    results: &OptimalResults,
    options: &OutputOptions,
    path: &Path,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_results(results, options, &mut writer)?;
    writer.flush()?;
    log::info!("exported {} results to {}", results.len(), path.display());
    Ok(())
}
