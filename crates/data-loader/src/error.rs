use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing required column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}

pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io { path: path.to_path_buf(), source }
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        LoadError::Csv { path: path.to_path_buf(), source }
    }

    pub(crate) fn missing_column(path: &Path, column: &str) -> Self {
        LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        }
    }
}

/// Open a CSV file, mapping a missing file to `LoadError::NotFound`
pub(crate) fn open_csv(path: &Path) -> LoadResult<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::open(path, e))?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

/// Position of a header, ignoring surrounding whitespace and a leading BOM
pub(crate) fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}
