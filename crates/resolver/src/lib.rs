mod error;
mod resolver;

pub use error::{ResolverError, Result};
pub use resolver::{AnswerResolver, Resolution, ERROR_PREFIX};
