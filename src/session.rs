//! Bearer-token session.
//!
//! The token is an explicit value handed to the API client. It is persisted
//! to a plain file so a restart keeps the user signed in.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;

#[derive(Clone)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Picks the token from the environment first, then from the store.
    ///
    /// A token supplied through the environment replaces whatever was stored.
    pub fn resolve(
        config: &Config,
        store: &TokenStore,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(token) = &config.token {
            store.save(token)?;
            info!("Using token from CLASSROOM_TOKEN (saved to {})", store.path().display());
            return Ok(Self::new(token.clone()));
        }

        match store.load()? {
            Some(token) => {
                info!("Using stored token from {}", store.path().display());
                Ok(Self::new(token))
            }
            None => Err("no session token: set CLASSROOM_TOKEN to sign in".into()),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.trim())
    }

    pub fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
