use crate::error::{ModelInitError, Result};
use crate::TextGenerator;
use async_trait::async_trait;

/// Deterministic offline generator. Echoes the prompt, capped at
/// `max_length` whitespace-separated words.
#[derive(Clone, Debug)]
pub struct StubGenerator {
    model: String,
}

impl StubGenerator {
    pub fn new(model: &str) -> std::result::Result<Self, ModelInitError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(ModelInitError::EmptyModel);
        }
        Ok(Self {
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str, max_length: usize) -> Result<String> {
        let words: Vec<&str> = prompt.split_whitespace().take(max_length).collect();
        Ok(format!("[{}] {}", self.model, words.join(" ")))
    }

    fn describe(&self) -> String {
        format!("stub:{}", self.model)
    }
}
