use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecordStoreError>;

/// Failures while loading the dataset. All of them abort startup.
#[derive(Error, Debug)]
pub enum RecordStoreError {
    #[error("Cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed JSON in {path} (line {line}): {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },
}
