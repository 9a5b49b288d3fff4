//! Application configuration and user preferences.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{SnapError, SnapResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-facing capture and action preferences.
    #[serde(default)]
    pub preferences: Preferences,

    /// Where artifacts land on disk.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Capture tuning knobs.
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One of the three ways an edit session can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalAction {
    /// Persist the crop to permanent storage.
    Save,
    /// Put the crop on the clipboard, then drop the artifact.
    CopyDiscard,
    /// Drop the artifact without any I/O.
    Discard,
}

impl TerminalAction {
    pub const ALL: [TerminalAction; 3] = [
        TerminalAction::Save,
        TerminalAction::CopyDiscard,
        TerminalAction::Discard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalAction::Save => "save",
            TerminalAction::CopyDiscard => "copy_discard",
            TerminalAction::Discard => "discard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "save" => Some(TerminalAction::Save),
            "copy" | "copy_discard" | "copy-discard" => Some(TerminalAction::CopyDiscard),
            "discard" | "cancel" => Some(TerminalAction::Discard),
            _ => None,
        }
    }
}

/// Read-only preference snapshot consumed by capture and edit sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Capture as soon as the grant arrives.
    pub immediate_capture: bool,

    /// Delay before acquisition when `immediate_capture` is off.
    pub delay_seconds: u32,

    /// Refuse to capture while the session is locked.
    pub disable_on_lock: bool,

    /// Replay `remembered_action` instead of prompting.
    pub remember_action: bool,

    /// Last action the user asked us to remember.
    pub remembered_action: Option<TerminalAction>,

    /// Clear the clipboard some time after a copy.
    pub auto_clear_clipboard: bool,

    /// Seconds before the clipboard is cleared.
    pub clear_seconds: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            immediate_capture: true,
            delay_seconds: 3,
            disable_on_lock: true,
            remember_action: false,
            remembered_action: None,
            auto_clear_clipboard: false,
            clear_seconds: 60,
        }
    }
}

/// Artifact directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Permanent destination for saved screenshots.
    pub screenshots_dir: PathBuf,

    /// Session-scoped capture artifacts.
    pub temp_dir: PathBuf,

    /// Short-lived copies handed to clipboard/share targets.
    pub cache_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data = data_home().join("snapcrop");
        let cache = cache_home().join("snapcrop");
        Self {
            screenshots_dir: pictures_dir().join("Screenshots"),
            temp_dir: data.join("temp"),
            cache_dir: cache.join("images"),
        }
    }
}

/// Capture tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// How long to wait for the frame consumer to yield a frame.
    pub frame_timeout_ms: u64,

    /// Pause between allocating the render target and reading it back.
    pub settle_delay_ms: u64,

    /// Forces the status-bar inset instead of asking the platform.
    pub top_inset_override: Option<u32>,

    /// Row alignment (bytes) the replay backend pads frames to.
    pub replay_row_alignment: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_timeout_ms: 1000,
            settle_delay_ms: 100,
            top_inset_override: None,
            replay_row_alignment: 64,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "snapcrop=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Source of preference snapshots, plus the few writes the editor performs.
pub trait PreferencesStore: Send + Sync {
    /// Current preferences.
    fn snapshot(&self) -> Preferences;

    /// Persist (or clear) the remembered terminal action.
    fn set_remembered_action(&self, action: Option<TerminalAction>) -> SnapResult<()>;

    /// Forget the remembered action.
    fn reset_remembered_action(&self) -> SnapResult<()> {
        self.set_remembered_action(None)
    }

    /// Restore every preference to its default.
    fn reset_to_defaults(&self) -> SnapResult<()>;
}

/// Preferences persisted in the JSON config file.
pub struct FilePreferencesStore {
    path: PathBuf,
}

impl FilePreferencesStore {
    /// Store backed by the standard config location.
    pub fn standard() -> Self {
        Self::at(config_file_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, edit: impl FnOnce(&mut Preferences)) -> SnapResult<()> {
        let mut config = AppConfig::load_from(&self.path);
        edit(&mut config.preferences);
        config.save_to(&self.path).map_err(|e| {
            SnapError::config(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

impl PreferencesStore for FilePreferencesStore {
    fn snapshot(&self) -> Preferences {
        AppConfig::load_from(&self.path).preferences
    }

    fn set_remembered_action(&self, action: Option<TerminalAction>) -> SnapResult<()> {
        self.update(|prefs| prefs.remembered_action = action)
    }

    fn reset_to_defaults(&self) -> SnapResult<()> {
        self.update(|prefs| *prefs = Preferences::default())
    }
}

/// Process-local preferences, for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    inner: Mutex<Preferences>,
}

impl InMemoryPreferences {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            inner: Mutex::new(prefs),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Preferences> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferencesStore for InMemoryPreferences {
    fn snapshot(&self) -> Preferences {
        self.lock().clone()
    }

    fn set_remembered_action(&self, action: Option<TerminalAction>) -> SnapResult<()> {
        self.lock().remembered_action = action;
        Ok(())
    }

    fn reset_to_defaults(&self) -> SnapResult<()> {
        *self.lock() = Preferences::default();
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
        .join("snapcrop")
        .join("config.json")
}

fn data_home() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

fn cache_home() -> PathBuf {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

fn pictures_dir() -> PathBuf {
    std::env::var("XDG_PICTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join("Pictures"))
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(fallback))
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}
