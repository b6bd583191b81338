//! # MedChat Auth
//!
//! Username → password mapping that lives only as long as the process.
//!
//! Passwords are kept and compared in plaintext. That is a known weak design
//! carried over for a demo deployment; swap in a hashing
//! [`PasswordVerifier`] before exposing the service to real users.

mod error;
mod repository;
mod store;
mod verifier;

pub use error::{AuthError, Result};
pub use repository::{CredentialRepository, InMemoryCredentials};
pub use store::CredentialStore;
pub use verifier::{PasswordVerifier, PlaintextVerifier};
