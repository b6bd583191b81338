use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Storage seam for credentials. Entries are never updated or removed.
pub trait CredentialRepository: Send + Sync {
    /// Insert `username -> password` unless the username is present.
    /// Returns `false` when it was already taken. Check and insert are atomic.
    fn insert_if_absent(&self, username: &str, password: &str) -> bool;

    /// Stored password for `username`, if registered.
    fn stored_password(&self, username: &str) -> Option<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCredentials {
    users: Mutex<HashMap<String, String>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialRepository for InMemoryCredentials {
    fn insert_if_absent(&self, username: &str, password: &str) -> bool {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return false;
        }
        users.insert(username.to_string(), password.to_string());
        true
    }

    fn stored_password(&self, username: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .cloned()
    }

    fn len(&self) -> usize {
        self.users.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_signups_for_same_name_admit_one() {
        let repo = Arc::new(InMemoryCredentials::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                thread::spawn(move || repo.insert_if_absent("alice", &format!("pw{i}")))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(admitted, 1);
        assert_eq!(repo.len(), 1);
    }
}
