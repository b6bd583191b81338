use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerationError>;

/// The generator could not be constructed. Fatal at startup.
#[derive(Error, Debug)]
pub enum ModelInitError {
    #[error("Unsupported generation mode '{0}' (expected 'hosted' or 'stub')")]
    UnsupportedMode(String),

    #[error("Model id must be non-empty")]
    EmptyModel,

    #[error("Invalid inference endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A single generation call failed. Recovered by the resolver.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inference endpoint returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("unreadable inference response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("model returned no candidates")]
    EmptyOutput,

    #[error("{0}")]
    Other(String),
}
