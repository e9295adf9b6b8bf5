// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use fuser_launcher::core::{
    Collaborators, ConfigStore, DetachedLauncher, ExitHost, LogNotifier, ReloadSequence,
    RfdFolderPicker, StdFileSystem, ThreadSleeper,
};

#[derive(Debug, Parser)]
#[command(name = "fuser-launcher", version, about)]
pub struct Cli {
    /// Without a subcommand the launcher window opens
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Delete the custom song overrides and relaunch Fuser
    ReloadAndLaunch {
        /// Game installation folder; defaults to the saved one
        install_path: Option<PathBuf>,

        /// Milliseconds to wait between deleting the overrides and launching
        #[arg(long)]
        settle_ms: Option<u64>,

        /// Skip the "Library Reloaded" notification
        #[arg(long)]
        no_notify: bool,
    },
}

/// Runs the relaunch sequence from the terminal. Only returns on failure;
/// a successful run exits the process after starting the game.
pub fn reload_and_launch(
    store: &ConfigStore,
    install_path: Option<PathBuf>,
    settle_ms: Option<u64>,
    no_notify: bool,
) -> Result<ExitCode> {
    let mut run_config = store.load()?;
    if let Some(path) = install_path {
        run_config.install_path = Some(path);
    }
    if let Some(ms) = settle_ms {
        run_config.settle_delay_ms = ms;
    }
    if no_notify {
        run_config.notify_on_reload = false;
    }

    let terminator = ExitHost::new();
    let env = Collaborators {
        picker: &RfdFolderPicker,
        preferences: store,
        fs: &StdFileSystem,
        launcher: &DetachedLauncher,
        sleeper: &ThreadSleeper,
        notifier: &LogNotifier,
        terminator: &terminator,
    };
    match ReloadSequence::new(&run_config, env).run() {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{}: {}", e.status_text(), e);
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}
