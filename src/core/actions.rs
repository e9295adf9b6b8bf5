// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Launcher buttons other than reload-and-launch. Each returns the status line
//! to display; callers persist the config when it changed.

use std::path::PathBuf;

use crate::core::config::LauncherConfig;
use crate::core::env::{FileSystem, FolderOpener, FolderPicker};
use crate::core::layout::GameLayout;
use crate::core::types::{CUSTOM_FOLDER_TITLE, GAME_FOLDER_TITLE};

/// What a launcher action did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub status: String,
    /// The config was modified and should be saved
    pub config_changed: bool,
}

impl ActionOutcome {
    fn new(status: impl Into<String>, config_changed: bool) -> Self {
        Self {
            status: status.into(),
            config_changed,
        }
    }
}

fn pick(picker: &dyn FolderPicker, title: &str) -> Option<PathBuf> {
    picker.pick_folder(title).filter(|p| !p.as_os_str().is_empty())
}

/// Prompts for the game folder and stores it
pub fn choose_game_path(config: &mut LauncherConfig, picker: &dyn FolderPicker) -> ActionOutcome {
    match pick(picker, GAME_FOLDER_TITLE) {
        Some(path) => {
            config.set_install_path(path);
            ActionOutcome::new("Game path set", true)
        }
        None => {
            log::warn!("No folder selected. Please select a valid game folder.");
            ActionOutcome::new("No folder selected", false)
        }
    }
}

pub fn reset_game_path(config: &mut LauncherConfig) -> ActionOutcome {
    config.reset_install_path();
    ActionOutcome::new("", true)
}

/// Opens `<install>/Fuser/Content/Paks/custom_songs`, asking for the install folder first if needed
pub fn open_custom_songs(
    config: &mut LauncherConfig,
    picker: &dyn FolderPicker,
    fs: &dyn FileSystem,
    opener: &dyn FolderOpener,
) -> ActionOutcome {
    let mut config_changed = false;

    if config.install_path.is_none() {
        log::warn!("No game path stored. Please select the game installation folder.");
        match pick(picker, GAME_FOLDER_TITLE) {
            Some(path) => {
                config.set_install_path(path);
                config_changed = true;
            }
            None => return ActionOutcome::new("Select game folder", false),
        }
    }

    let Some(install) = config.install_path.as_ref() else {
        return ActionOutcome::new("Select game folder", config_changed);
    };
    let custom_songs = GameLayout::new(install).custom_songs_dir();

    if !fs.is_dir(&custom_songs) {
        log::warn!("Custom songs folder does not exist at: {:?}", custom_songs);
        return ActionOutcome::new("Custom songs folder not found", config_changed);
    }

    match opener.open_folder(&custom_songs) {
        Ok(()) => {
            log::info!("Opened folder: {:?}", custom_songs);
            ActionOutcome::new("Opened custom songs folder", config_changed)
        }
        Err(e) => {
            log::error!("Failed to open {:?}: {}", custom_songs, e);
            ActionOutcome::new("Could not open custom songs folder", config_changed)
        }
    }
}

pub fn choose_custom_folder(config: &mut LauncherConfig, picker: &dyn FolderPicker) -> ActionOutcome {
    match pick(picker, CUSTOM_FOLDER_TITLE) {
        Some(path) => {
            log::info!("Folder saved: {:?}", path);
            config.custom_folder = Some(path);
            ActionOutcome::new("Folder saved", true)
        }
        None => ActionOutcome::new("No folder selected", false),
    }
}

pub fn open_custom_folder(
    config: &LauncherConfig,
    fs: &dyn FileSystem,
    opener: &dyn FolderOpener,
) -> ActionOutcome {
    let folder = match &config.custom_folder {
        Some(folder) if fs.is_dir(folder) => folder,
        _ => {
            log::warn!("No valid folder set yet. Please set it first.");
            return ActionOutcome::new("No valid folder set yet", false);
        }
    };

    match opener.open_folder(folder) {
        Ok(()) => ActionOutcome::new("Opened folder", false),
        Err(e) => {
            log::error!("Failed to open {:?}: {}", folder, e);
            ActionOutcome::new("Could not open folder", false)
        }
    }
}
