use crate::error::{RecordStoreError, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const QUESTION_COLUMN: &str = "question";
const ANSWER_COLUMN: &str = "answer";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
    Jsonl,
}

impl DatasetFormat {
    /// Picks the format from the file extension; anything unknown is CSV.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Self::Json,
            Some("jsonl") | Some("ndjson") => Self::Jsonl,
            _ => Self::Csv,
        }
    }
}

/// A dataset row before filtering. Either cell may be absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRow {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

pub(crate) fn read_rows(path: &Path, format: DatasetFormat) -> Result<Vec<RawRow>> {
    let file = File::open(path).map_err(|source| RecordStoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match format {
        DatasetFormat::Csv => read_csv(path, file),
        DatasetFormat::Json => read_json(path, file),
        DatasetFormat::Jsonl => read_jsonl(path, file),
    }
}

fn read_csv(path: &Path, file: File) -> Result<Vec<RawRow>> {
    let csv_err = |source| RecordStoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| RecordStoreError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    let question_idx = column(QUESTION_COLUMN)?;
    let answer_idx = column(ANSWER_COLUMN)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(RawRow {
            question: record.get(question_idx).map(str::to_string),
            answer: record.get(answer_idx).map(str::to_string),
        });
    }
    Ok(rows)
}

fn read_json(path: &Path, file: File) -> Result<Vec<RawRow>> {
    serde_json::from_reader(BufReader::new(file)).map_err(|source| RecordStoreError::Json {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}

fn read_jsonl(path: &Path, file: File) -> Result<Vec<RawRow>> {
    let mut rows = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| RecordStoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|source| RecordStoreError::Json {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}
