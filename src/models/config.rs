use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{Write, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub realtime_url: Option<String>,
    pub viewer_id: Option<String>,
    pub token: Option<String>,
    pub request_timeout_secs: u64,
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            realtime_url: None,
            viewer_id: None,
            token: None,
            request_timeout_secs: 15,
            page_size: 10,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf, FeedError> {
        Ok(dirs::home_dir()
            .ok_or_else(|| FeedError::Config("Could not find home directory".to_string()))?
            .join(".config/feedtui/config.json"))
    }

    /// Loads the default config file, writing one with defaults on first run,
    /// then applies environment overrides.
    pub fn load() -> Result<Self, FeedError> {
        let path = Self::path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            log::info!("No config at {:?}, writing defaults", path);
            let config = Config::default();
            if let Err(e) = config.save() {
                log::warn!("Could not write default config: {}", e);
            }
            config
        };
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, FeedError> {
        let file = File::open(path)
            .map_err(|e| FeedError::Config(format!("Failed to open config file at {:?}: {}", path, e)))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| FeedError::Config(format!("Failed to parse config JSON: {}", e)))
    }

    pub fn save(&self) -> Result<(), FeedError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), FeedError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| FeedError::Config(format!("Failed to open config file for writing at {:?}: {}", path, e)))?;

        file.write_all(json.as_bytes())?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(base_url) = env::var("FEEDTUI_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(token) = env::var("FEEDTUI_TOKEN") {
            self.token = Some(token);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// The socket lives at the server root, not under `/api`.
    pub fn realtime_url(&self) -> String {
        if let Some(url) = &self.realtime_url {
            return url.clone();
        }
        let base = self.base_url.trim_end_matches('/');
        let root = base.strip_suffix("/api").unwrap_or(base);
        let ws = if let Some(rest) = root.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = root.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            root.to_string()
        };
        format!("{}/ws", ws)
    }
}
