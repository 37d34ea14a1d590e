use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::AuthToken;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Bearer token for the backend API.
///
/// Expiry is not enforced locally: the backend rejecting a request with 401
/// is what marks a credential as stale. `expires_in` is kept for display.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in: None,
            obtained_at: Utc::now(),
        }
    }

    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Expiry advertised by the backend at login, if any
    pub fn advertised_expiry(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        Some(self.obtained_at + Duration::seconds(secs))
    }
}

impl From<AuthToken> for Credential {
    fn from(token: AuthToken) -> Self {
        Self {
            access_token: token.access_token,
            expires_in: token.expires_in,
            obtained_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Storage for the current credential (the `access_token` entry).
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<Credential>;

    fn set(&self, credential: Credential) -> Result<()>;

    fn remove(&self) -> Result<()>;
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<Credential> {
        self.slot.read().clone()
    }

    fn set(&self, credential: Credential) -> Result<()> {
        *self.slot.write() = Some(credential);
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot.write() = None;
        Ok(())
    }
}

/// Store backed by a session file in the cache directory.
///
/// The file is read once on open; afterwards reads are served from memory and
/// every `set`/`remove` writes through to disk.
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<Credential>>,
}

impl FileTokenStore {
    /// Open the session file in `cache_dir`. A missing or unreadable file
    /// starts the store empty.
    pub fn open(cache_dir: &Path) -> Self {
        let path = cache_dir.join(SESSION_FILE);
        let cached = match Self::read(&path) {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Ignoring unreadable session file");
                None
            }
        };
        debug!(path = %path.display(), has_credential = cached.is_some(), "Session store opened");
        Self {
            path,
            cached: RwLock::new(cached),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<Option<Credential>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        let credential =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(credential))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<Credential> {
        self.cached.read().clone()
    }

    fn set(&self, credential: Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        let contents = serde_json::to_string_pretty(&credential)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        *self.cached.write() = Some(credential);
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.cached.write() = None;
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}
