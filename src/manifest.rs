//! CSV manifest table shared by the dataset builder and the labeling session.
//!
//! A manifest is an ordered list of rows; each row carries one path per path
//! column plus an optional `label`. Every column other than `label` is a path
//! column, and their order is preserved as read. Row order is navigation order.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Name of the column holding the assigned class label.
pub const LABEL_COLUMN: &str = "label";

/// Errors raised while reading, editing or writing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("Failed to write manifest {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },
    #[error("Failed to flush manifest {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create manifest directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Manifest has no path columns")]
    NoPathColumns,
    #[error("Manifest column `{0}` appears more than once")]
    DuplicateColumn(String),
    #[error("Manifest row {row} has {found} paths, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Row {row} is out of range for a manifest of {len} rows")]
    RowOutOfRange { row: usize, len: usize },
}

/// One manifest row: a path per path column and the label, if assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub paths: Vec<PathBuf>,
    pub label: Option<String>,
}

impl ManifestRow {
    /// Build an unlabeled row.
    pub fn unlabeled(paths: Vec<PathBuf>) -> Self {
        Self { paths, label: None }
    }
}

/// Ordered manifest table with a fixed set of path columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    path_columns: Vec<String>,
    rows: Vec<ManifestRow>,
}

impl Manifest {
    /// Build a manifest, checking that every row matches the path columns.
    pub fn new(path_columns: Vec<String>, rows: Vec<ManifestRow>) -> Result<Self, ManifestError> {
        validate_columns(&path_columns)?;
        for (row, entry) in rows.iter().enumerate() {
            if entry.paths.len() != path_columns.len() {
                return Err(ManifestError::RowWidth {
                    row,
                    expected: path_columns.len(),
                    found: entry.paths.len(),
                });
            }
        }
        Ok(Self { path_columns, rows })
    }

    /// Read a manifest from CSV. A missing `label` column yields unset labels
    /// and an empty label cell is treated as unset.
    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let read_err = |source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(read_err)?;
        let headers = reader.headers().map_err(read_err)?.clone();
        let label_index = headers.iter().position(|name| name == LABEL_COLUMN);
        let path_indices: Vec<usize> = (0..headers.len())
            .filter(|idx| Some(*idx) != label_index)
            .collect();
        let path_columns = path_indices
            .iter()
            .map(|idx| headers[*idx].to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            let paths = path_indices
                .iter()
                .map(|idx| PathBuf::from(&record[*idx]))
                .collect();
            let label = label_index
                .map(|idx| &record[idx])
                .filter(|value| !value.is_empty())
                .map(str::to_string);
            rows.push(ManifestRow { paths, label });
        }
        debug!(path = %path.display(), rows = rows.len(), "Read manifest");
        Self::new(path_columns, rows)
    }

    /// Write the manifest with every field quoted, including the `label`
    /// column. Unset labels are written as empty quoted strings.
    pub fn write_quoted(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ManifestError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let write_err = |source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_path(path)
            .map_err(write_err)?;
        let header = self
            .path_columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(LABEL_COLUMN));
        writer.write_record(header).map_err(write_err)?;
        for row in &self.rows {
            let mut record: Vec<String> = row
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            record.push(row.label.clone().unwrap_or_default());
            writer.write_record(&record).map_err(write_err)?;
        }
        writer.flush().map_err(|source| ManifestError::Flush {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), rows = self.rows.len(), "Wrote manifest");
        Ok(())
    }

    pub fn path_columns(&self) -> &[String] {
        &self.path_columns
    }

    pub fn rows(&self) -> &[ManifestRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&ManifestRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Overwrite the label of one row. An empty label clears it, matching how
    /// an empty cell reads back.
    pub fn set_label(&mut self, index: usize, label: &str) -> Result<(), ManifestError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(ManifestError::RowOutOfRange { row: index, len })?;
        row.label = (!label.is_empty()).then(|| label.to_string());
        Ok(())
    }

    /// Number of rows that carry a label.
    pub fn labeled_count(&self) -> usize {
        self.rows.iter().filter(|row| row.label.is_some()).count()
    }

    /// Label frequencies over the labeled rows.
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in self.rows.iter().filter_map(|row| row.label.as_ref()) {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

fn validate_columns(columns: &[String]) -> Result<(), ManifestError> {
    if columns.is_empty() {
        return Err(ManifestError::NoPathColumns);
    }
    for (idx, column) in columns.iter().enumerate() {
        if column == LABEL_COLUMN || columns[..idx].contains(column) {
            return Err(ManifestError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}
