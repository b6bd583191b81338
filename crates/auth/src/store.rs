use crate::error::{AuthError, Result};
use crate::repository::{CredentialRepository, InMemoryCredentials};
use crate::verifier::{PasswordVerifier, PlaintextVerifier};
use std::sync::Arc;

/// Signup and login over an injected repository and verifier.
#[derive(Clone)]
pub struct CredentialStore {
    repository: Arc<dyn CredentialRepository>,
    verifier: Arc<dyn PasswordVerifier>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl CredentialStore {
    pub fn new(
        repository: Arc<dyn CredentialRepository>,
        verifier: Arc<dyn PasswordVerifier>,
    ) -> Self {
        Self {
            repository,
            verifier,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCredentials::new()), Arc::new(PlaintextVerifier))
    }

    /// Register `username`. Fails without touching the stored password when
    /// the name is taken. No strength checks.
    pub fn signup(&self, username: &str, password: &str) -> Result<()> {
        if !self.repository.insert_if_absent(username, password) {
            log::info!("Signup rejected: username taken");
            return Err(AuthError::UsernameTaken);
        }
        log::info!("Registered user '{username}'");
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        let Some(stored) = self.repository.stored_password(username) else {
            log::info!("Login rejected: unknown user");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.verifier.verify(&stored, password) {
            log::info!("Login rejected: wrong password for '{username}'");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(())
    }

    pub fn user_count(&self) -> usize {
        self.repository.len()
    }
}
