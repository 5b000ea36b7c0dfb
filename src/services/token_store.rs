// src/services/token_store.rs
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::AccountError;

/// Where the access token survives between page loads.
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), AccountError>;
    fn clear(&self) -> Result<(), AccountError>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RefCell::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) -> Result<(), AccountError> {
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), AccountError> {
        *self.token.borrow_mut() = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

/// Keeps the token in a small JSON file, `{"access_token": "..."}`.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<StoredToken>(&contents) {
            Ok(stored) if !stored.access_token.is_empty() => Some(stored.access_token),
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring corrupt token file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, token: &str) -> Result<(), AccountError> {
        let value = serde_json::to_string(&StoredToken {
            access_token: token.to_string(),
        })
        .map_err(|e| AccountError::Storage(e.to_string()))?;

        fs::write(&self.path, value)
            .map_err(|e| AccountError::Storage(format!("{}: {}", self.path.display(), e)))?;
        debug!("Stored access token at {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), AccountError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AccountError::Storage(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
