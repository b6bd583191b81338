use serde::{Deserialize, Serialize};

/// One question/answer pair. `answer` is never empty once inside a store.
///
/// `question` is `None` when the dataset cell was missing or empty. Such a
/// record keeps its place in load order but is never matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: Option<String>,
    pub answer: String,
}

impl QaRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            answer: answer.into(),
        }
    }

    pub fn without_question(answer: impl Into<String>) -> Self {
        Self {
            question: None,
            answer: answer.into(),
        }
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub records: usize,
}
