use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::canvas::WindowConfig;

const APP_DIR: &str = "tensorscope";
const APP_CONFIG_FILE: &str = "config.json";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LearningSettings {
    pub learning_iterations_to_test_ratio: u32,
    pub number_of_averaged_test_measures: u32,
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            learning_iterations_to_test_ratio: 50,
            number_of_averaged_test_measures: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render_interval_ms: u64,
    pub producer_interval_ms: u64,
    pub log_filter: Option<String>,
    pub learning: LearningSettings,
    pub windows: Vec<WindowConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_interval_ms: 40,
            producer_interval_ms: 50,
            log_filter: None,
            learning: LearningSettings::default(),
            windows: Vec::new(),
        }
    }
}

impl Settings {
    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms.max(1))
    }

    pub fn producer_interval(&self) -> Duration {
        Duration::from_millis(self.producer_interval_ms)
    }

    /// The configured override named like `fallback`, or `fallback` itself.
    pub fn window_config(&self, fallback: WindowConfig) -> WindowConfig {
        self.windows
            .iter()
            .find(|window| window.name == fallback.name)
            .cloned()
            .unwrap_or(fallback)
    }
}

/// Loads settings from the XDG config dir; any failure falls back to defaults.
pub fn load_settings() -> Settings {
    let (xdg_config_home, home) = config_env_dirs();
    load_settings_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_settings_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Settings {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(%err, "no config directory; using defaults");
            return Settings::default();
        }
    };
    if !path.exists() {
        return Settings::default();
    }
    read_settings(&path).unwrap_or_else(|err| {
        tracing::warn!(%err, "using default settings");
        Settings::default()
    })
}

pub fn read_settings(path: &Path) -> ConfigResult<Settings> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
