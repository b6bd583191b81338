use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Recoverable auth failures. Neither changes any state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username already exists! Please choose another one.")]
    UsernameTaken,

    #[error("Invalid username or password. Please try again.")]
    InvalidCredentials,
}
