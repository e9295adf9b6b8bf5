// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Everything the launcher touches outside its own memory: dialogs, the file
//! system, child processes, timers and the host process itself.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::core::types::Phase;

/// Native single-folder selection dialog
pub trait FolderPicker {
    /// Returns `None` when the user cancels
    fn pick_folder(&self, title: &str) -> Option<PathBuf>;
}

pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Starts a program and forgets about it
pub trait ProcessLauncher {
    fn launch(&self, executable: &Path, arguments: &str) -> io::Result<()>;
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Receives progress lines and the optional post-reload notification
pub trait Notifier {
    fn status(&self, message: &str);

    fn phase_changed(&self, _phase: Phase) {}

    /// Transient notification shown once the library has been reloaded
    fn notify(&self, _message: &str) {}
}

/// Persists an install path the moment the user picks it
pub trait InstallPathStore {
    fn save_install_path(&self, path: &Path) -> anyhow::Result<()>;
}

/// Ends the host process once control has been handed to the game
pub trait Terminator {
    fn terminate(&self);
}

/// Shows a directory in the OS file browser
pub trait FolderOpener {
    fn open_folder(&self, path: &Path) -> io::Result<()>;
}

pub struct RfdFolderPicker;

impl FolderPicker for RfdFolderPicker {
    fn pick_folder(&self, title: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .pick_folder()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Spawns the child from its own directory and drops the handle without waiting
pub struct DetachedLauncher;

impl ProcessLauncher for DetachedLauncher {
    fn launch(&self, executable: &Path, arguments: &str) -> io::Result<()> {
        let mut command = Command::new(executable);
        if let Some(dir) = executable.parent() {
            command.current_dir(dir);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.raw_arg(arguments);
        }
        #[cfg(not(windows))]
        command.args(split_arguments(arguments));

        let child = command.spawn()?;
        log::info!("Spawned {:?} (pid {})", executable, child.id());
        Ok(())
    }
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Writes progress to the log only
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn status(&self, message: &str) {
        log::info!("{}", message);
    }

    fn notify(&self, message: &str) {
        log::info!("Notification: {}", message);
    }
}

/// Runs an optional graceful shutdown hook, then exits the process regardless
pub struct ExitHost {
    graceful: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ExitHost {
    pub fn new() -> Self {
        Self { graceful: None }
    }

    pub fn with_graceful(hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            graceful: Some(Box::new(hook)),
        }
    }
}

impl Default for ExitHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminator for ExitHost {
    fn terminate(&self) {
        if let Some(hook) = &self.graceful {
            hook();
            log::info!("Graceful quit requested");
        }
        log::info!("Forcefully terminating launcher process");
        log::logger().flush();
        std::process::exit(0);
    }
}

pub struct SystemFolderOpener;

impl FolderOpener for SystemFolderOpener {
    fn open_folder(&self, path: &Path) -> io::Result<()> {
        open::that(path)
    }
}

/// Splits a command line on whitespace. Double quotes group a token and are dropped.
pub fn split_arguments(arguments: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in arguments.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }

    args
}
