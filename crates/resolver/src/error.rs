use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolverError>;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error(transparent)]
    Generation(#[from] medchat_generation::GenerationError),
}
