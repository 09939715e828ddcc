//! In-memory user directory for development and test.

use std::collections::HashMap;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use rand::rngs::OsRng;

use janus_backend::{DirectoryError, DirectoryUser, UserDirectory};

/// Fixed-at-startup user directory backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<String, DirectoryUser>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user (builder form).
    pub fn with_user(mut self, user: DirectoryUser) -> Self {
        self.users.insert(user.username.clone(), user);
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn load_user(&self, username: &str) -> Result<DirectoryUser, DirectoryError> {
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))
    }
}

/// Verifies a candidate password against the stored credential.
///
/// An empty stored credential accepts anything; a PHC `$argon2` string is
/// verified as a hash; anything else is compared literally.
pub fn verify_password(candidate: &str, stored: &str) -> bool {
    if stored.is_empty() {
        return true;
    }
    if stored.starts_with("$argon2") {
        return PasswordHash::new(stored)
            .map(|hash| {
                Argon2::default()
                    .verify_password(candidate.as_bytes(), &hash)
                    .is_ok()
            })
            .unwrap_or(false);
    }
    candidate == stored
}

/// Hashes a password into a PHC string for directory entries.
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .unwrap_or_default()
}
