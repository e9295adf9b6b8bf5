// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

use eframe::egui;
use egui::{Color32, Margin, RichText, Rounding};

use fuser_launcher::core::{
    choose_custom_folder, choose_game_path, open_custom_folder, open_custom_songs,
    reset_game_path, ActionOutcome, Collaborators, ConfigStore, DetachedLauncher, ExitHost,
    InstallPathStore, LauncherConfig, Notifier, Phase, ReloadSequence, RfdFolderPicker, StdFileSystem,
    SystemFolderOpener, ThreadSleeper,
};

const NOTIFICATION_SECONDS: f64 = 3.0;

/// Messages from the relaunch worker thread
#[derive(Debug)]
enum AsyncMessage {
    Status(String),
    PhaseChanged(Phase),
    Notification(String),
    PathSelected(PathBuf),
    Failed(String),
}

/// Forwards sequence progress to the UI thread
struct ChannelNotifier {
    tx: Sender<AsyncMessage>,
    ctx: egui::Context,
    store: ConfigStore,
}

impl ChannelNotifier {
    fn send(&self, msg: AsyncMessage) {
        self.tx.send(msg).ok();
        self.ctx.request_repaint();
    }
}

impl Notifier for ChannelNotifier {
    fn status(&self, message: &str) {
        self.send(AsyncMessage::Status(message.to_string()));
    }

    fn phase_changed(&self, phase: Phase) {
        self.send(AsyncMessage::PhaseChanged(phase));
    }

    fn notify(&self, message: &str) {
        self.send(AsyncMessage::Notification(message.to_string()));
    }
}

impl InstallPathStore for ChannelNotifier {
    /// Written from the worker, since a successful run exits before the UI sees the message
    fn save_install_path(&self, path: &Path) -> anyhow::Result<()> {
        self.store.save_install_path(path)?;
        self.send(AsyncMessage::PathSelected(path.to_path_buf()));
        Ok(())
    }
}

/// UI State
pub struct FuserLauncherApp {
    store: ConfigStore,
    config: LauncherConfig,

    // Async
    tx: Sender<AsyncMessage>,
    rx: Receiver<AsyncMessage>,
    phase: Phase,
    status: String,

    // UI Helpers
    log_messages: Vec<String>,
    show_log: bool,
    notification: Option<(String, f64)>, // Message, expiry time
}

impl FuserLauncherApp {
    pub fn new(cc: &eframe::CreationContext<'_>, store: ConfigStore, config: LauncherConfig) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.visuals.window_rounding = Rounding::same(10.0);
        style.visuals.widgets.inactive.rounding = Rounding::same(6.0);
        style.visuals.widgets.hovered.rounding = Rounding::same(6.0);
        style.visuals.widgets.active.rounding = Rounding::same(6.0);
        style.spacing.item_spacing = egui::vec2(10.0, 10.0);
        style.spacing.window_margin = Margin::same(0.0);
        cc.egui_ctx.set_style(style);

        let (tx, rx) = channel();
        let mut app = Self {
            store,
            config,
            tx,
            rx,
            phase: Phase::Idle,
            status: String::new(),
            log_messages: Vec::new(),
            show_log: false,
            notification: None,
        };

        // First launch: ask for the game folder once
        if app.config.install_path.is_none() {
            let outcome = choose_game_path(&mut app.config, &RfdFolderPicker);
            app.apply(outcome);
        } else {
            log::info!("Game install path loaded: {:?}", app.config.install_path);
        }

        app
    }

    // --- Helpers ---

    fn log(&mut self, msg: &str) {
        let time = chrono::Local::now().format("%H:%M:%S");
        self.log_messages.push(format!("[{}] {}", time, msg));
    }

    fn set_status(&mut self, msg: &str) {
        if !msg.is_empty() {
            self.log(msg);
        }
        self.status = msg.to_string();
    }

    fn save_config(&mut self) {
        if let Err(e) = self.store.save(&self.config) {
            log::error!("Failed to save settings: {:#}", e);
            self.log(&format!("ERROR: failed to save settings: {:#}", e));
        }
    }

    fn apply(&mut self, outcome: ActionOutcome) {
        if outcome.config_changed {
            self.save_config();
        }
        self.set_status(&outcome.status);
    }

    fn is_running(&self) -> bool {
        !self.phase.is_terminal() && self.phase != Phase::Idle
    }

    // --- Logic Actions ---

    fn start_reload(&mut self, ctx: &egui::Context) {
        if self.is_running() {
            return;
        }

        // Dialogs stay on the UI thread
        if self.config.install_path.is_none() {
            self.set_status("Select game folder");
            let outcome = choose_game_path(&mut self.config, &RfdFolderPicker);
            let picked = outcome.config_changed;
            self.apply(outcome);
            if !picked {
                return;
            }
        }

        self.phase = Phase::ResolvingPath;
        let config = self.config.clone();
        let store = self.store.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || run_reload(config, store, tx, ctx));
    }

    fn quit(&mut self, ctx: &egui::Context) {
        log::info!("Quit button pressed. Closing launcher.");
        self.set_status("Closing...");
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn handle_messages(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AsyncMessage::Status(s) => self.set_status(&s),
                AsyncMessage::PhaseChanged(phase) => self.phase = phase,
                AsyncMessage::Notification(s) => {
                    let expires = ctx.input(|i| i.time) + NOTIFICATION_SECONDS;
                    self.notification = Some((s, expires));
                }
                // already on disk
                AsyncMessage::PathSelected(path) => self.config.set_install_path(path),
                AsyncMessage::Failed(e) => {
                    self.log(&format!("ERROR: {}", e));
                    self.phase = Phase::Failed;
                }
            }
        }

        if let Some((_, expires)) = &self.notification {
            let now = ctx.input(|i| i.time);
            if now >= *expires {
                self.notification = None;
            } else {
                ctx.request_repaint_after(Duration::from_secs_f64(*expires - now));
            }
        }
    }
}

impl eframe::App for FuserLauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_messages(ctx);
        if self.is_running() {
            ctx.request_repaint();
        }

        // Bottom Panel for Status/Log
        if self.show_log {
            egui::TopBottomPanel::bottom("log_panel")
                .resizable(true)
                .min_height(100.0)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Log");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Close").clicked() { self.show_log = false; }
                            if ui.button("Clear").clicked() { self.log_messages.clear(); }
                        });
                    });
                    ui.separator();
                    egui::ScrollArea::vertical().stick_to_bottom(true).show(ui, |ui| {
                        ui.style_mut().spacing.item_spacing = egui::vec2(0.0, 2.0);
                        for msg in &self.log_messages {
                            ui.label(RichText::new(msg).monospace().size(12.0));
                        }
                    });
                });
        } else {
            egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if self.is_running() {
                        ui.spinner();
                    }
                    if self.status.is_empty() {
                        ui.label("Ready");
                    } else {
                        ui.label(&self.status);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Show Log").clicked() { self.show_log = true; }
                        ui.label(concat!("v", env!("CARGO_PKG_VERSION")));
                    });
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(20.0)
                .show(ui, |ui| self.render_main(ui, ctx));
        });

        if let Some((msg, _)) = &self.notification {
            egui::Window::new("notification")
                .title_bar(false)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::RIGHT_TOP, [-20.0, 20.0])
                .show(ctx, |ui| {
                    ui.label(RichText::new(msg).size(16.0).strong().color(Color32::LIGHT_GREEN));
                });
        }
    }
}

// UI Render Implementations
impl FuserLauncherApp {
    fn render_main(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let idle = !self.is_running();

        ui.vertical_centered(|ui| {
            ui.heading(RichText::new("FUSER").size(40.0).strong());
            ui.label("Custom Songs Launcher");
        });
        ui.add_space(20.0);

        let big = |text: &str| {
            egui::Button::new(RichText::new(text).size(18.0).strong()).min_size(egui::vec2(280.0, 44.0))
        };

        ui.vertical_centered(|ui| {
            if ui.add_enabled(idle, big("Reload & Launch")).clicked() {
                self.start_reload(ctx);
            }
            if ui.add_enabled(idle, big("Open Custom Songs")).clicked() {
                let outcome = open_custom_songs(
                    &mut self.config,
                    &RfdFolderPicker,
                    &StdFileSystem,
                    &SystemFolderOpener,
                );
                self.apply(outcome);
            }
            if ui.add_enabled(idle, big("Quit")).clicked() {
                self.quit(ctx);
            }
        });

        ui.add_space(30.0);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading("Paths");

            let path_color = if self.config.install_path.is_some() {
                Color32::LIGHT_GREEN
            } else {
                Color32::LIGHT_RED
            };
            ui.label(RichText::new(self.config.install_path_label()).monospace().color(path_color));
            ui.horizontal(|ui| {
                if ui.add_enabled(idle, egui::Button::new("📂 Set Game Path")).clicked() {
                    let outcome = choose_game_path(&mut self.config, &RfdFolderPicker);
                    self.apply(outcome);
                }
                if ui.add_enabled(idle, egui::Button::new("Reset Game Path")).clicked() {
                    let outcome = reset_game_path(&mut self.config);
                    self.apply(outcome);
                }
            });

            ui.add_space(10.0);

            ui.label("Custom Folder:");
            ui.horizontal(|ui| {
                if ui.button("📂 Set Folder").clicked() {
                    let outcome = choose_custom_folder(&mut self.config, &RfdFolderPicker);
                    self.apply(outcome);
                }
                if ui.button("Open Folder").clicked() {
                    let outcome = open_custom_folder(&self.config, &StdFileSystem, &SystemFolderOpener);
                    self.apply(outcome);
                }
                match &self.config.custom_folder {
                    Some(p) => ui.label(RichText::new(p.to_string_lossy()).monospace()),
                    None => ui.label(RichText::new("Not selected").italics()),
                };
            });
        });

        ui.add_space(20.0);
        ui.hyperlink_to("Website", &self.config.website_url);
    }
}

/// Worker thread body: runs one relaunch and reports back over the channel.
/// On success the process exits from inside the sequence.
fn run_reload(config: LauncherConfig, store: ConfigStore, tx: Sender<AsyncMessage>, ctx: egui::Context) {
    let notifier = ChannelNotifier {
        tx: tx.clone(),
        ctx: ctx.clone(),
        store,
    };
    let close_ctx = ctx.clone();
    let terminator = ExitHost::with_graceful(move || {
        close_ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    });
    let env = Collaborators {
        picker: &RfdFolderPicker,
        preferences: &notifier,
        fs: &StdFileSystem,
        launcher: &DetachedLauncher,
        sleeper: &ThreadSleeper,
        notifier: &notifier,
        terminator: &terminator,
    };

    if let Err(e) = ReloadSequence::new(&config, env).run() {
        tx.send(AsyncMessage::Failed(e.to_string())).ok();
    }
    ctx.request_repaint();
}
