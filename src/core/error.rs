// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons a reload-and-relaunch sequence stops before launching the game
#[derive(Debug, Error)]
pub enum RelaunchError {
    #[error("no game folder selected, cannot proceed")]
    NoFolderSelected,

    #[error("Paks directory not found: {}. Verify game path.", .path.display())]
    PaksDirNotFound { path: PathBuf },

    #[error("failed to delete override files after {attempts} attempts: {last_error}")]
    DeletionFailed { attempts: u32, last_error: String },

    #[error(
        "game executable not found: {}. Expected {expected}; the Steam build ships \
         {alternate} instead, or the game path is wrong",
        .path.display()
    )]
    ExecutableNotFound {
        path: PathBuf,
        expected: &'static str,
        alternate: &'static str,
    },

    #[error("failed to launch {}: {source}", .path.display())]
    LaunchFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelaunchError {
    /// Short line for the launcher status bar
    pub fn status_text(&self) -> &'static str {
        match self {
            RelaunchError::NoFolderSelected => "No folder selected",
            RelaunchError::PaksDirNotFound { .. } => "Paks directory not found",
            RelaunchError::DeletionFailed { .. } => "Failed to delete files",
            RelaunchError::ExecutableNotFound { .. } => "Game executable not found",
            RelaunchError::LaunchFailed { .. } => "Failed to launch Fuser",
        }
    }

    /// Process exit status for the command line front end
    pub fn exit_code(&self) -> u8 {
        match self {
            RelaunchError::NoFolderSelected => 2,
            RelaunchError::PaksDirNotFound { .. } => 3,
            RelaunchError::DeletionFailed { .. } => 4,
            RelaunchError::ExecutableNotFound { .. } => 5,
            RelaunchError::LaunchFailed { .. } => 6,
        }
    }
}
