// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Launcher settings.
//!
//! Stored as JSON in the platform config directory, e.g.
//! `~/.config/fuser-launcher/settings.json` on Linux or
//! `%APPDATA%\fuser-launcher\config\settings.json` on Windows.
//! `FUSER_LAUNCHER_CONFIG` points at a different file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::env::InstallPathStore;
use crate::core::types::{
    DEFAULT_DELETE_ATTEMPTS, DEFAULT_LAUNCH_ARGUMENTS, DEFAULT_RETRY_BACKOFF,
    DEFAULT_SETTLE_DELAY,
};

pub const CONFIG_ENV_VAR: &str = "FUSER_LAUNCHER_CONFIG";
const CONFIG_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Game installation folder, unset until the user picks one
    #[serde(default)]
    pub install_path: Option<PathBuf>,

    /// Free-form folder the user can open from the launcher
    #[serde(default)]
    pub custom_folder: Option<PathBuf>,

    /// Arguments passed verbatim to the game
    #[serde(default = "default_launch_arguments")]
    pub launch_arguments: String,

    #[serde(default = "default_delete_attempts")]
    pub delete_attempts: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Pause between deleting the overrides and starting the game
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_true")]
    pub notify_on_reload: bool,

    #[serde(default = "default_website_url")]
    pub website_url: String,
}

fn default_launch_arguments() -> String {
    DEFAULT_LAUNCH_ARGUMENTS.to_string()
}

fn default_delete_attempts() -> u32 {
    DEFAULT_DELETE_ATTEMPTS
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF.as_millis() as u64
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY.as_millis() as u64
}

fn default_true() -> bool {
    true
}

fn default_website_url() -> String {
    "https://www.example.com".to_string()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            install_path: None,
            custom_folder: None,
            launch_arguments: default_launch_arguments(),
            delete_attempts: default_delete_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            notify_on_reload: default_true(),
            website_url: default_website_url(),
        }
    }
}

impl LauncherConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Attempts are never fewer than one, whatever the file says
    pub fn delete_attempts(&self) -> u32 {
        self.delete_attempts.max(1)
    }

    pub fn set_install_path(&mut self, path: PathBuf) {
        log::info!("Game install path set to: {:?}", path);
        self.install_path = Some(path);
    }

    pub fn reset_install_path(&mut self) {
        log::info!("Game path reset. Will prompt for new path on next action.");
        self.install_path = None;
    }

    /// Text shown under the launcher buttons
    pub fn install_path_label(&self) -> String {
        match &self.install_path {
            Some(path) => format!("Game Path: {}", path.display()),
            None => "Game Path: Not Set".to_string(),
        }
    }

    /// Reads settings from `path`, falling back to defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {:?}", path))?;
        let config: LauncherConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {:?}", path))?;

        log::info!("Loaded settings from {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings folder: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write settings: {:?}", path))?;

        log::debug!("Settings saved to {:?}", path);
        Ok(())
    }
}

/// Location of the settings file for this user
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    let dirs = ProjectDirs::from("", "", "fuser-launcher")
        .context("Could not determine a config directory for this user")?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Settings file bound to a fixed location
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<LauncherConfig> {
        LauncherConfig::load_from(&self.path)
    }

    pub fn save(&self, config: &LauncherConfig) -> Result<()> {
        config.save_to(&self.path)
    }
}

impl InstallPathStore for ConfigStore {
    /// Re-reads the file so other settings saved meanwhile are kept
    fn save_install_path(&self, path: &Path) -> Result<()> {
        let mut config = self.load()?;
        config.set_install_path(path.to_path_buf());
        self.save(&config)
    }
}
