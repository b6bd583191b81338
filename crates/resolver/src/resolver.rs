use crate::error::Result;
use medchat_generation::{TextGenerator, FALLBACK_MAX_LENGTH};
use medchat_records::{QaRecord, RecordStore};
use serde::Serialize;
use std::sync::Arc;

pub const ERROR_PREFIX: &str = "Error generating response: ";

/// Outcome of resolving one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// First dataset question containing the query. `record_index` is the
    /// position in the loaded store, counted after rows without an answer
    /// were dropped, so it is not the row number in the dataset file.
    Matched { answer: String, record_index: usize },
    /// No dataset match; text from the generative fallback.
    Generated { text: String },
    /// The fallback failed; `reason` is shown to the user.
    Failed { reason: String },
}

impl Resolution {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::Generated { .. } => "generated",
            Self::Failed { .. } => "failed",
        }
    }

    /// User-facing reply text. Failures render as an inline error string.
    pub fn into_text(self) -> String {
        match self {
            Self::Matched { answer, .. } => answer,
            Self::Generated { text } => text,
            Self::Failed { reason } => format!("{ERROR_PREFIX}{reason}"),
        }
    }
}

/// Case-insensitive substring lookup over the record store, falling back to
/// a text generator when no question contains the query.
pub struct AnswerResolver {
    store: Arc<RecordStore>,
    folded_questions: Vec<Option<String>>,
    generator: Arc<dyn TextGenerator>,
    max_length: usize,
}

impl AnswerResolver {
    pub fn new(store: Arc<RecordStore>, generator: Arc<dyn TextGenerator>) -> Self {
        let folded_questions = store
            .records()
            .iter()
            .map(|r| r.question().map(str::to_lowercase))
            .collect();
        Self {
            store,
            folded_questions,
            generator,
            max_length: FALLBACK_MAX_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn generator(&self) -> &dyn TextGenerator {
        self.generator.as_ref()
    }

    /// First record, in load order, whose question contains `query`
    /// ignoring case. The empty query matches the first record that has a
    /// question; records without one never match.
    pub fn find_match(&self, query: &str) -> Option<(usize, &QaRecord)> {
        let needle = query.to_lowercase();
        let index = self.folded_questions.iter().position(|question| {
            question
                .as_deref()
                .is_some_and(|question| question.contains(&needle))
        })?;
        self.store.get(index).map(|record| (index, record))
    }

    /// Like [`Self::resolve`] but surfaces fallback failures to the caller.
    pub async fn try_resolve(&self, query: &str) -> Result<Resolution> {
        if let Some((record_index, record)) = self.find_match(query) {
            return Ok(Resolution::Matched {
                answer: record.answer.clone(),
                record_index,
            });
        }

        let text = self.generator.generate(query, self.max_length).await?;
        Ok(Resolution::Generated { text })
    }

    /// Never fails: fallback errors become [`Resolution::Failed`].
    pub async fn resolve(&self, query: &str) -> Resolution {
        let resolution = match self.try_resolve(query).await {
            Ok(resolution) => resolution,
            Err(err) => {
                log::warn!("Fallback generation failed: {err}");
                Resolution::Failed {
                    reason: err.to_string(),
                }
            }
        };
        log::debug!("Resolved query ({})", resolution.kind());
        resolution
    }

    pub async fn answer(&self, query: &str) -> String {
        self.resolve(query).await.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medchat_generation::StubGenerator;

    fn resolver(records: Vec<QaRecord>) -> AnswerResolver {
        let store = Arc::new(RecordStore::from_records(records));
        let generator = Arc::new(StubGenerator::new("stub-model").unwrap());
        AnswerResolver::new(store, generator)
    }

    #[test]
    fn find_match_ignores_case_and_prefers_first() {
        let resolver = resolver(vec![
            QaRecord::new("What are the symptoms of Diabetes?", "first"),
            QaRecord::new("How is diabetes treated?", "second"),
        ]);

        let (index, record) = resolver.find_match("DIABETES").unwrap();
        assert_eq!(index, 0);
        assert_eq!(record.answer, "first");
        assert!(resolver.find_match("malaria").is_none());
    }

    #[test]
    fn empty_query_matches_first_record() {
        let resolver = resolver(vec![
            QaRecord::new("Q1", "A1"),
            QaRecord::new("Q2", "A2"),
        ]);
        assert_eq!(resolver.find_match("").unwrap().0, 0);
    }

    #[test]
    fn records_without_question_never_match() {
        let resolver = resolver(vec![
            QaRecord::without_question("orphan"),
            QaRecord::new("What is anemia?", "Low red blood cells."),
        ]);
        let (index, record) = resolver.find_match("").unwrap();
        assert_eq!(index, 1);
        assert_eq!(record.answer, "Low red blood cells.");

        let orphans = self::resolver(vec![QaRecord::without_question("orphan")]);
        assert!(orphans.find_match("").is_none());
    }

    #[test]
    fn query_is_not_a_pattern() {
        let resolver = resolver(vec![QaRecord::new("What is (COVID-19)?", "A virus.")]);
        assert!(resolver.find_match("(covid-19)?").is_some());
        assert!(resolver.find_match("c.vid").is_none());
    }

    #[test]
    fn failed_resolution_renders_inline_error() {
        let failed = Resolution::Failed {
            reason: "model returned no candidates".to_string(),
        };
        assert_eq!(failed.kind(), "failed");
        assert_eq!(
            failed.into_text(),
            "Error generating response: model returned no candidates"
        );
    }

    #[tokio::test]
    async fn miss_uses_generator() {
        let resolver = resolver(vec![QaRecord::new("What is diabetes?", "A chronic condition...")]);
        assert_eq!(
            resolver.resolve("flu").await,
            Resolution::Generated {
                text: "[stub-model] flu".to_string()
            }
        );
    }
}
