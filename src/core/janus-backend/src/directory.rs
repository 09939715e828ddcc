//! Local user directory trait.

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a user directory lookup.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No user with the given name.
    #[error("user not found: {0}")]
    NotFound(String),

    /// The directory itself failed.
    #[error("directory error: {0}")]
    Internal(String),
}

/// A user as stored in the local directory.
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    /// Login name.
    pub username: String,
    /// Stored credential. Empty means "no local credential check".
    /// A PHC-formatted string (`$argon2...`) is verified as a hash,
    /// anything else as a literal.
    pub password: String,
    /// Authorities granted locally to this user.
    pub authorities: BTreeSet<String>,
}

impl DirectoryUser {
    /// Creates a user with no authorities.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            authorities: BTreeSet::new(),
        }
    }

    /// Adds an authority (builder form).
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authorities.insert(authority.into());
        self
    }
}

/// Local user store consulted by the agent for authorities and by the
/// simulator for credential checks.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Loads a user by login name.
    async fn load_user(&self, username: &str) -> Result<DirectoryUser, DirectoryError>;
}
