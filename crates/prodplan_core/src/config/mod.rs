//! Floor CLI settings: the rendered calendar width and whether plain output
//! colours team lanes and task statuses.

use crate::error::AppError;
use crate::model::{TaskStatus, Team};
use crate::storage::json_store::store_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_ENV_VAR: &str = "PRODPLAN_CONFIG_PATH";
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

const RESET: &str = "\x1b[0m";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Paint team lanes and task statuses with ANSI colours.
    #[serde(default)]
    pub color: Option<bool>,
    /// Number of day columns the assignment calendar renders.
    #[serde(default)]
    pub window_days: Option<u32>,
}

impl Config {
    pub fn window_days(&self) -> u32 {
        self.window_days
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_WINDOW_DAYS)
    }

    pub fn palette(&self) -> Palette {
        Palette {
            enabled: self.color.unwrap_or(false),
        }
    }
}

/// Outcome of reading the config file; a broken file still yields usable
/// defaults alongside the error.
#[derive(Debug, Default, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

impl ConfigLoad {
    fn fallback(error: AppError) -> Self {
        Self {
            config: Config::default(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub color: Option<bool>,
    pub window_days: Option<u32>,
}

/// Colours for plain-text floor output. A disabled palette returns text
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn team(&self, team: Team) -> String {
        let code = match team {
            Team::Green => "32",
            Team::Blue => "34",
            Team::Orange => "38;5;208",
        };
        self.paint(code, team.as_str())
    }

    pub fn status(&self, status: TaskStatus) -> String {
        let code = match status {
            TaskStatus::Todo => "37",
            TaskStatus::InProgress => "36",
            TaskStatus::Completed => "2",
            TaskStatus::Hold => "1;33",
        };
        self.paint(code, status.as_str())
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint("1", text)
    }

    pub fn note(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// `on`/`off` style switch values accepted in overrides.
pub fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// `PRODPLAN_CONFIG_PATH`, else `config.json` beside the floor store.
pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(config_path_beside(&store_path()?))
}

pub fn config_path_beside(store: &Path) -> PathBuf {
    store.with_file_name(CONFIG_FILE_NAME)
}

pub fn load_config() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_at(&path),
        Err(err) => ConfigLoad::fallback(err),
    }
}

/// A missing file is not an error; the defaults apply.
pub fn load_config_at(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad::default();
    }

    match read_config(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad::fallback(err),
    }
}

fn read_config(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    if config.window_days == Some(0) {
        return Err(AppError::invalid_data(format!(
            "window_days in {} must be at least 1",
            path.display()
        )));
    }
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    Config {
        color: overrides.color.or(base.color),
        window_days: overrides
            .window_days
            .filter(|days| *days > 0)
            .or(base.window_days),
    }
}
