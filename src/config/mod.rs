//! Configuration management module.
//!
//! This module handles loading and saving the application configuration:
//! backend location, Todoist credentials, timeouts, theme and key bindings.

mod error;
pub mod keymap;

pub use error::ConfigError;
pub use keymap::{Hotkey, Keymap};

use crate::backend::TodoistSettings;
use crate::error::AppError;
use crate::todoist::DEFAULT_API_BASE;
use log::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/todo-tui";
const DATA_DIRECTORY_NAME: &str = "todo-tui";

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of a remote backend; standalone mode when unset.
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub todoist_api_token: Option<String>,
    pub todoist_api_base: String,
    pub request_timeout_secs: u64,
    pub theme_name: String,
    pub keymap: Keymap,
    keymap_overrides: Option<Keymap>,
    file_path: Option<PathBuf>,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize, Default)]
struct FileSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    todoist_api_token: Option<String>,
    #[serde(default = "default_api_base")]
    todoist_api_base: String,
    #[serde(default = "default_timeout")]
    request_timeout_secs: u64,
    #[serde(default = "default_theme_name")]
    theme_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keymap: Option<Keymap>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_theme_name() -> String {
    "nord".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Return a new instance with default values.
    ///
    pub fn new() -> Config {
        Config {
            api_url: None,
            data_dir: None,
            todoist_api_token: None,
            todoist_api_base: default_api_base(),
            request_timeout_secs: default_timeout(),
            theme_name: default_theme_name(),
            keymap: Keymap::default(),
            keymap_overrides: None,
            file_path: None,
        }
    }

    /// Load the configuration file from the custom directory if provided,
    /// otherwise from the default one. A missing file leaves the defaults in
    /// place.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        let dir_path = match custom_path {
            Some(path) => Path::new(path).to_path_buf(),
            None => Config::default_path()?,
        };
        let file_path = dir_path.join(FILE_NAME);
        self.file_path = Some(file_path.clone());

        if !file_path.exists() {
            debug!("No configuration at {}, using defaults", file_path.display());
            return Ok(());
        }
        let contents = fs::read_to_string(&file_path).map_err(|e| ConfigError::LoadFailed {
            path: file_path.clone(),
            message: format!("IO error: {}", e),
        })?;
        let data: FileSpec = if contents.trim().is_empty() {
            serde_yaml::from_str("{}")
        } else {
            serde_yaml::from_str(&contents)
        }
        .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;

        self.api_url = data.api_url.filter(|url| !url.trim().is_empty());
        self.data_dir = data.data_dir;
        self.todoist_api_token = data.todoist_api_token.filter(|t| !t.trim().is_empty());
        self.todoist_api_base = data.todoist_api_base;
        self.request_timeout_secs = data.request_timeout_secs;
        self.theme_name = data.theme_name;
        self.keymap = data
            .keymap
            .as_ref()
            .map(Keymap::with_overrides)
            .unwrap_or_default();
        self.keymap_overrides = data.keymap;
        Ok(())
    }

    /// Serialize the configuration and write it to the loaded file path,
    /// creating the directory when needed.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;
        let data = FileSpec {
            api_url: self.api_url.clone(),
            data_dir: self.data_dir.clone(),
            todoist_api_token: self.todoist_api_token.clone(),
            todoist_api_base: self.todoist_api_base.clone(),
            request_timeout_secs: self.request_timeout_secs,
            theme_name: self.theme_name.clone(),
            keymap: self.keymap_overrides.clone(),
        };
        let content = serde_yaml::to_string(&data)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        let mut file = fs::File::create(file_path).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Store the Todoist API token in the configuration file. A blank token
    /// removes it.
    ///
    pub fn save_todoist_token(&mut self, token: &str) -> Result<(), AppError> {
        let token = token.trim();
        self.todoist_api_token = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
        self.save()?;
        info!("Saved Todoist token setting to {:?}", self.file_path);
        Ok(())
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Return the standalone data directory: the configured one, or the
    /// platform data directory.
    ///
    pub fn resolved_data_dir(&self) -> Result<PathBuf, AppError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(DATA_DIRECTORY_NAME))
            .ok_or_else(|| ConfigError::HomeDirectoryNotFound.into())
    }

    pub fn todoist_settings(&self) -> TodoistSettings {
        TodoistSettings {
            api_token: self.todoist_api_token.clone().unwrap_or_default(),
            api_base: self.todoist_api_base.clone(),
            timeout: self.request_timeout(),
        }
    }

    /// Returns the path buffer for the default configuration directory or
    /// an error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => Ok(home.join(DEFAULT_DIRECTORY_PATH)),
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}
