use crate::error::Result;
use crate::loader::{read_rows, DatasetFormat, RawRow};
use crate::types::{LoadStats, QaRecord};
use std::path::Path;

/// Immutable, ordered question/answer table.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<QaRecord>,
    stats: LoadStats,
}

impl RecordStore {
    /// Load the dataset at `path`, choosing the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::load_as(path, DatasetFormat::from_path(path))
    }

    pub fn load_as(path: impl AsRef<Path>, format: DatasetFormat) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading dataset from {:?} ({:?})", path, format);

        let rows = read_rows(path, format)?;
        let store = Self::from_rows(rows);

        log::info!(
            "Loaded {} records ({} rows dropped without an answer)",
            store.stats.records,
            store.stats.rows_dropped
        );
        Ok(store)
    }

    /// Build a store from in-memory records, dropping those without an answer.
    pub fn from_records(records: impl IntoIterator<Item = QaRecord>) -> Self {
        Self::from_rows(records.into_iter().map(|r| RawRow {
            question: r.question,
            answer: Some(r.answer),
        }))
    }

    fn from_rows(rows: impl IntoIterator<Item = RawRow>) -> Self {
        let mut stats = LoadStats::default();
        let mut records = Vec::new();

        for row in rows {
            stats.rows_read += 1;
            // Empty cells are missing values; whitespace-only text is data.
            let Some(answer) = row.answer.filter(|a| !a.is_empty()) else {
                stats.rows_dropped += 1;
                continue;
            };
            records.push(QaRecord {
                question: row.question.filter(|q| !q.is_empty()),
                answer,
            });
        }

        stats.records = records.len();
        Self { records, stats }
    }

    /// Records in load order.
    pub fn records(&self) -> &[QaRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&QaRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_records_drops_empty_answers_only() {
        let store = RecordStore::from_records(vec![
            QaRecord::new("What is asthma?", "A lung condition."),
            QaRecord::new("What is nothing?", ""),
            QaRecord::new("What is blank?", "   "),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].question(), Some("What is asthma?"));
        assert_eq!(store.records()[1].answer, "   ");
        assert_eq!(
            store.stats(),
            LoadStats {
                rows_read: 3,
                rows_dropped: 1,
                records: 2
            }
        );
    }

    #[test]
    fn missing_or_empty_question_is_kept_as_none() {
        let store = RecordStore::from_rows(vec![
            RawRow {
                question: None,
                answer: Some("orphan answer".to_string()),
            },
            RawRow {
                question: Some(String::new()),
                answer: Some("empty cell".to_string()),
            },
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().question(), None);
        assert_eq!(store.get(1).unwrap().question(), None);
    }

    #[test]
    fn empty_store_reports_empty() {
        let store = RecordStore::default();
        assert!(store.is_empty());
        assert!(store.get(0).is_none());
    }
}
