//! Batch orchestration: reports in, one spreadsheet out.
//!
//! Documents are processed strictly in order. The first document that cannot
//! be processed aborts the whole batch and nothing is written.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::collaborators::{
    Cell, FileSelector, Notifier, OutputLocator, SpreadsheetError, SpreadsheetWriter,
};
use crate::config::APP_NAME;
use crate::pipeline::assembly::{column_headers, OutputRow};
use crate::pipeline::parsing::canonical_schema;
use crate::pipeline::processor::{DocumentProcessor, ProcessingError};

pub const OUTPUT_FILE_PREFIX: &str = "seca_measurements";

const NO_FILES_MESSAGE: &str = "No PDF files were selected.";
const NO_FOLDER_MESSAGE: &str = "No download folder was selected.";
pub const PARSING_ERROR_TITLE: &str = "Parsing error";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("{file}: {source}")]
    Document {
        file: String,
        source: ProcessingError,
    },

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("Failed to write spreadsheet: {0}")]
    Output(#[from] SpreadsheetError),
}

/// Shared flag checked between documents.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ═══════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════

pub struct BatchRunner {
    processor: DocumentProcessor,
    cancellation: CancellationFlag,
}

impl BatchRunner {
    pub fn new(processor: DocumentProcessor) -> Self {
        Self {
            processor,
            cancellation: CancellationFlag::new(),
        }
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    /// Process every path in order. One row per path on success.
    pub fn run(&self, paths: &[PathBuf]) -> Result<Vec<OutputRow>, BatchError> {
        let start = Instant::now();
        let mut rows = Vec::with_capacity(paths.len());

        for (index, path) in paths.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                tracing::info!(processed = index, total = paths.len(), "Batch cancelled");
                return Err(BatchError::Cancelled);
            }

            let row = self
                .processor
                .process_file(path)
                .map_err(|source| BatchError::Document {
                    file: display_name(path),
                    source,
                })?;
            rows.push(row);
        }

        tracing::info!(
            documents = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch complete"
        );
        Ok(rows)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `seca_measurements_<YYYYmmdd_HHMMSS>.<ext>`
pub fn output_file_name(timestamp: DateTime<Local>, extension: &str) -> String {
    format!(
        "{OUTPUT_FILE_PREFIX}_{}.{extension}",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

// ═══════════════════════════════════════════════════════════
// Conversion session
// ═══════════════════════════════════════════════════════════

/// How a session ended. Every variant has already been reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    NoFilesSelected,
    NoOutputFolder,
    Failed,
    Written { path: PathBuf, rows: usize },
}

/// One interactive conversion: pick reports, pick a folder, convert, save.
pub fn convert(
    runner: &BatchRunner,
    files: &dyn FileSelector,
    output: &dyn OutputLocator,
    writer: &dyn SpreadsheetWriter,
    notifier: &dyn Notifier,
) -> ConversionOutcome {
    let paths = files.select_files();
    if paths.is_empty() {
        notifier.notify(APP_NAME, NO_FILES_MESSAGE);
        return ConversionOutcome::NoFilesSelected;
    }

    let Some(dir) = output.select_output_dir() else {
        notifier.notify(APP_NAME, NO_FOLDER_MESSAGE);
        return ConversionOutcome::NoOutputFolder;
    };

    tracing::info!(files = paths.len(), output = %dir.display(), "Conversion started");

    let rows = match runner.run(&paths) {
        Ok(rows) => rows,
        Err(BatchError::Cancelled) => {
            notifier.notify(APP_NAME, "Conversion cancelled. No file was written.");
            return ConversionOutcome::Failed;
        }
        Err(BatchError::Document { file, source }) => {
            tracing::error!(file = %file, error = %source, "Conversion aborted");
            notifier.notify(
                PARSING_ERROR_TITLE,
                &format!("Could not parse '{file}'.\nError: {source}"),
            );
            return ConversionOutcome::Failed;
        }
        Err(e) => {
            tracing::error!(error = %e, "Conversion aborted");
            notifier.notify(APP_NAME, &e.to_string());
            return ConversionOutcome::Failed;
        }
    };

    let path = dir.join(output_file_name(Local::now(), writer.extension()));
    if let Err(e) = write_rows(writer, &path, &rows) {
        tracing::error!(path = %path.display(), error = %e, "Conversion output failed");
        notifier.notify(APP_NAME, &e.to_string());
        return ConversionOutcome::Failed;
    }

    notifier.notify(
        APP_NAME,
        &format!(
            "Successfully saved data for {} file(s) to:\n{}",
            rows.len(),
            path.display()
        ),
    );
    ConversionOutcome::Written {
        path,
        rows: rows.len(),
    }
}

fn write_rows(
    writer: &dyn SpreadsheetWriter,
    path: &Path,
    rows: &[OutputRow],
) -> Result<(), BatchError> {
    let headers = column_headers(canonical_schema());
    let records: Vec<Vec<Cell>> = rows.iter().map(OutputRow::to_record).collect();
    writer.write(path, &headers, &records)?;
    Ok(())
}
