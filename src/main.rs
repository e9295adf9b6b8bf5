// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

mod cli;
mod gui;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use egui::IconData;
use fuser_launcher::core::ConfigStore;
use gui::FuserLauncherApp;

use cli::{Cli, Command};

fn load_icon() -> Option<IconData> {
    // Try to load the icon from the winres directory relative to CWD
    let icon_path = Path::new("winres/icon_main.png");

    if !icon_path.exists() {
        log::warn!("Icon file not found at {:?}", icon_path);
        return None;
    }

    let image = match image::ImageReader::open(icon_path).and_then(|r| r.with_guessed_format()) {
        Ok(reader) => match reader.decode() {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Failed to decode icon file: {}", e);
                return None;
            }
        },
        Err(e) => {
            log::warn!("Failed to open icon file: {}", e);
            return None;
        }
    };

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    Some(IconData {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

fn run_gui(store: ConfigStore) -> anyhow::Result<()> {
    let config = store.load()?;
    let icon = load_icon();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 560.0])
            .with_min_inner_size([480.0, 420.0])
            .with_title("Fuser Launcher")
            .with_icon(icon.unwrap_or_default()),
        ..Default::default()
    };

    eframe::run_native(
        "Fuser Launcher",
        options,
        Box::new(move |cc| Ok(Box::new(FuserLauncherApp::new(cc, store, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start launcher window: {}", e))
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let store = ConfigStore::from_env().context("Failed to locate settings file")?;
    log::info!("Settings file: {:?}", store.path());

    match cli.command {
        Some(Command::ReloadAndLaunch {
            install_path,
            settle_ms,
            no_notify,
        }) => cli::reload_and_launch(&store, install_path, settle_ms, no_notify),
        None => {
            run_gui(store)?;
            log::info!("Launcher window closed");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(Some(env_logger::TimestampPrecision::Seconds))
        .init();

    log::info!("=== Fuser Launcher Started ===");

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
