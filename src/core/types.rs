// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Override pak that unlocks custom songs
pub const PAK_FILE_NAME: &str = "customSongsUnlocked_P.pak";
/// Signature file shipped alongside the override pak
pub const SIG_FILE_NAME: &str = "customSongsUnlocked_P.sig";

/// Executable name of the Epic Games Store build
pub const EPIC_EXECUTABLE_NAME: &str = "FuserEOS-Win64-Shipping.exe";
/// Executable name of the Steam build
pub const STEAM_EXECUTABLE_NAME: &str = "Fuser-Win64-Shipping.exe";

/// Folder picker titles
pub const GAME_FOLDER_TITLE: &str = "Select Game Installation Folder";
pub const CUSTOM_FOLDER_TITLE: &str = "Select Folder";

/// Authentication flags handed to the game on relaunch
pub const DEFAULT_LAUNCH_ARGUMENTS: &str = "-windowed -AUTH_LOGIN=unused \
-AUTH_PASSWORD=901dbe79901dbe79901dbe79901dbe79 -AUTH_TYPE=exchangecode \
-epicapp=2939f4752d4b4ace95a8e1b16e79d3f5 -epicenv=Prod -EpicPortal \
-epicusername=\"Arbys\" -epicuserid=aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa -epiclocale=en-US";

pub const DEFAULT_DELETE_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Where a relaunch sequence currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    ResolvingPath,
    Deleting,
    Settling,
    Launching,
    Done,
    Failed,
}

impl Phase {
    /// Whether the sequence has reached an end state
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::ResolvingPath => "resolving path",
            Phase::Deleting => "deleting",
            Phase::Settling => "waiting",
            Phase::Launching => "launching",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a successful relaunch
#[derive(Debug, Clone)]
pub struct RelaunchReport {
    pub install_path: PathBuf,
    /// Set when the path came from the folder picker during this run
    pub path_selected: bool,
    /// Number of delete attempts it took to clear the override files
    pub delete_attempts: u32,
    /// Override files that existed and were removed
    pub deleted: Vec<PathBuf>,
    pub executable: PathBuf,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_done_and_failed_are_terminal() {
        assert!(Phase::Done.is_terminal());
        assert!(Phase::Failed.is_terminal());
        for phase in [
            Phase::Idle,
            Phase::ResolvingPath,
            Phase::Deleting,
            Phase::Settling,
            Phase::Launching,
        ] {
            assert!(!phase.is_terminal(), "{} should not be terminal", phase);
        }
    }
}
