use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::runtime::POLL_INTERVAL_MS;
use crate::workout::{Frequencies, WorkoutForm, WorkoutMode};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub poll_interval_ms: u64,
    /// Must outlast the server's stop handler, which takes a few seconds.
    pub request_timeout_secs: u64,
    pub mode: WorkoutMode,
    pub duration: String,
    pub frequencies: Frequencies,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            poll_interval_ms: POLL_INTERVAL_MS,
            request_timeout_secs: 10,
            mode: WorkoutMode::Random,
            duration: "1:00".to_string(),
            frequencies: Frequencies::default(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Initial contents of the configuration inputs.
    pub fn form(&self) -> WorkoutForm {
        WorkoutForm::new(&self.duration, self.mode, self.frequencies)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring malformed config");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
