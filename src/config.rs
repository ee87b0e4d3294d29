use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::dictionary::default_dictionary;
use crate::score_store::DEFAULT_LEADERBOARD_SIZE;

/// How the remaining game time is displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `0:32`
    #[default]
    MinutesSeconds,
    /// `32`
    Seconds,
}

impl TimeFormat {
    pub fn format(&self, secs: u32) -> String {
        match self {
            TimeFormat::MinutesSeconds => format!("{}:{:02}", secs / 60, secs % 60),
            TimeFormat::Seconds => secs.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub session_duration_secs: u32,
    pub countdown_secs: u32,
    pub leaderboard_size: usize,
    pub time_format: TimeFormat,
    pub normalize_case: bool,
    pub dictionary: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_duration_secs: 32,
            countdown_secs: 3,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            time_format: TimeFormat::MinutesSeconds,
            normalize_case: true,
            dictionary: default_dictionary(),
        }
    }
}

impl GameConfig {
    /// Clamp values that would make a session meaningless
    pub fn validated(mut self) -> Self {
        if self.session_duration_secs == 0 {
            self.session_duration_secs = Self::default().session_duration_secs;
        }
        if self.leaderboard_size == 0 {
            self.leaderboard_size = DEFAULT_LEADERBOARD_SIZE;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("quickdraw_config.json"));
        Self { path }
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
    fn load(&self) -> GameConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<GameConfig>(&bytes) {
                Ok(cfg) => return cfg.validated(),
                Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        GameConfig::default()
    }

    fn save(&self, cfg: &GameConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
