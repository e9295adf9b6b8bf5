// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

use std::path::PathBuf;

use crate::core::types::{
    EPIC_EXECUTABLE_NAME, PAK_FILE_NAME, SIG_FILE_NAME, STEAM_EXECUTABLE_NAME,
};

/// Paths inside a Fuser installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLayout {
    root: PathBuf,
}

impl GameLayout {
    pub fn new(install_path: impl Into<PathBuf>) -> Self {
        Self {
            root: install_path.into(),
        }
    }

    pub fn paks_dir(&self) -> PathBuf {
        self.root.join("Fuser").join("Content").join("Paks")
    }

    pub fn pak_file(&self) -> PathBuf {
        self.paks_dir().join(PAK_FILE_NAME)
    }

    pub fn sig_file(&self) -> PathBuf {
        self.paks_dir().join(SIG_FILE_NAME)
    }

    /// Both override files, pak first
    pub fn override_files(&self) -> [PathBuf; 2] {
        [self.pak_file(), self.sig_file()]
    }

    pub fn custom_songs_dir(&self) -> PathBuf {
        self.paks_dir().join("custom_songs")
    }

    pub fn executable_dir(&self) -> PathBuf {
        self.root.join("Fuser").join("Binaries").join("Win64")
    }

    /// The Epic build executable, which is what the launcher starts
    pub fn executable(&self) -> PathBuf {
        self.executable_dir().join(EPIC_EXECUTABLE_NAME)
    }

    pub fn steam_executable(&self) -> PathBuf {
        self.executable_dir().join(STEAM_EXECUTABLE_NAME)
    }
}
