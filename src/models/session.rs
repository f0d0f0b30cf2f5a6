use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// Bearer token sent with every Post Service request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn bearer(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Source of the viewer's credential, asked on every request.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

pub struct StaticCredential(Option<Credential>);

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        StaticCredential(token.filter(|t| !t.is_empty()).map(Credential::new))
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Option<Credential> {
        self.0.clone()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: Option<String>,
}

/// Session persisted under the user cache directory by `login`.
pub struct SessionFile {
    path: PathBuf,
}

pub fn get_session_dir() -> Result<PathBuf, FeedError> {
    // Check the XDG_CACHE_HOME environment variable first
    let base_cache_dir = match env::var_os("XDG_CACHE_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => env::var_os("HOME")
            .map(|home| Path::new(&home).join(".cache"))
            .ok_or_else(|| FeedError::Session("HOME environment variable not set".to_string()))?,
    };

    let app_cache_dir = base_cache_dir.join("feedtui");

    fs::create_dir_all(&app_cache_dir)
        .map_err(|e| FeedError::Session(format!("Failed to create cache directory: {}", e)))?;

    Ok(app_cache_dir)
}

impl SessionFile {
    pub fn default_location() -> Result<Self, FeedError> {
        Ok(Self::at(get_session_dir()?.join("session.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Option<Session>, FeedError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => serde_json::from_str(&data)
                .map(Some)
                .map_err(|e| FeedError::Session(format!("Failed to parse session file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FeedError::Session(format!("Failed to read session file: {}", e))),
        }
    }

    pub fn store(&self, session: &Session) -> Result<(), FeedError> {
        let json = serde_json::to_string(session)?;
        fs::write(&self.path, json)
            .map_err(|e| FeedError::Session(format!("Failed to write session file: {}", e)))
    }

    pub fn clear(&self) -> Result<(), FeedError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(FeedError::Session(format!("Failed to remove session file: {}", e)))
            }
            _ => Ok(()),
        }
    }
}

impl CredentialProvider for SessionFile {
    fn credential(&self) -> Option<Credential> {
        match self.load() {
            Ok(session) => session.map(|s| Credential::new(s.token)),
            Err(e) => {
                log::warn!("Ignoring unreadable session: {}", e);
                None
            }
        }
    }
}

/// Tries each provider in order.
pub struct ChainedCredentials(pub Vec<Box<dyn CredentialProvider>>);

impl CredentialProvider for ChainedCredentials {
    fn credential(&self) -> Option<Credential> {
        self.0.iter().find_map(|p| p.credential())
    }
}
