//! # MedChat Generation
//!
//! The generative fallback used when no dataset question matches.
//!
//! Backends are selected by [`GenerationMode`]:
//!
//! - **hosted** (default): a text2text model behind a Hugging Face style
//!   inference endpoint, reached with `reqwest`
//! - **stub**: deterministic echo, for tests and offline runs
//!
//! The generator is built once at startup by [`build_generator`]; a
//! [`ModelInitError`] there is fatal.

mod config;
mod error;
mod hosted;
mod stub;

use async_trait::async_trait;
use std::sync::Arc;

pub use config::{
    GenerationMode, GeneratorConfig, DEFAULT_INFERENCE_URL, DEFAULT_MODEL, FALLBACK_MAX_LENGTH,
};
pub use error::{GenerationError, ModelInitError, Result};
pub use hosted::HostedGenerator;
pub use stub::StubGenerator;

/// Black-box text generation: prompt in, first candidate out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_length: usize) -> Result<String>;

    /// Short human-readable identity, e.g. `hosted:google/flan-t5-base`.
    fn describe(&self) -> String;
}

pub fn build_generator(
    config: &GeneratorConfig,
) -> std::result::Result<Arc<dyn TextGenerator>, ModelInitError> {
    let generator: Arc<dyn TextGenerator> = match config.mode {
        GenerationMode::Hosted => Arc::new(HostedGenerator::new(config)?),
        GenerationMode::Stub => Arc::new(StubGenerator::new(&config.model)?),
    };
    log::info!("Generative fallback ready: {}", generator.describe());
    Ok(generator)
}
