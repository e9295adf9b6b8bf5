// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::config::LauncherConfig;
use crate::core::env::{
    FileSystem, FolderPicker, InstallPathStore, Notifier, ProcessLauncher, Sleeper, Terminator,
};
use crate::core::error::RelaunchError;
use crate::core::layout::GameLayout;
use crate::core::types::{
    Phase, RelaunchReport, EPIC_EXECUTABLE_NAME, GAME_FOLDER_TITLE, STEAM_EXECUTABLE_NAME,
};

/// External services a relaunch needs
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub picker: &'a dyn FolderPicker,
    /// Receives a picked install path before anything else happens
    pub preferences: &'a dyn InstallPathStore,
    pub fs: &'a dyn FileSystem,
    pub launcher: &'a dyn ProcessLauncher,
    pub sleeper: &'a dyn Sleeper,
    pub notifier: &'a dyn Notifier,
    pub terminator: &'a dyn Terminator,
}

/// Deletes the custom song overrides, restarts the game and exits the launcher.
///
/// Steps run strictly in order: resolve the install path (prompting once if it
/// is unset), check the Paks folder, delete both override files with bounded
/// retries, wait for the settle delay, launch the game, then terminate the
/// host. Any failure ends the run. Nothing is rolled back, so override files
/// removed before a failed launch stay removed.
pub struct ReloadSequence<'a> {
    config: &'a LauncherConfig,
    env: Collaborators<'a>,
    phase: Phase,
    selected_path: Option<PathBuf>,
}

impl<'a> ReloadSequence<'a> {
    pub fn new(config: &'a LauncherConfig, env: Collaborators<'a>) -> Self {
        Self {
            config,
            env,
            phase: Phase::Idle,
            selected_path: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Path picked during this run. It has already been handed to `preferences`.
    pub fn selected_path(&self) -> Option<&Path> {
        self.selected_path.as_deref()
    }

    pub fn run(&mut self) -> Result<RelaunchReport, RelaunchError> {
        let started = Instant::now();
        self.env.notifier.status("Preparing to launch...");
        log::info!("Starting reload and launch...");

        match self.run_steps(started) {
            Ok(report) => {
                self.set_phase(Phase::Done);
                log::info!(
                    "Total reload and launch took {:.2} ms",
                    report.elapsed.as_secs_f64() * 1000.0
                );
                log::info!("All operations completed. Closing launcher.");
                self.env.terminator.terminate();
                Ok(report)
            }
            Err(e) => {
                self.set_phase(Phase::Failed);
                log::error!("{}", e);
                self.env.notifier.status(e.status_text());
                Err(e)
            }
        }
    }

    fn run_steps(&mut self, started: Instant) -> Result<RelaunchReport, RelaunchError> {
        self.set_phase(Phase::ResolvingPath);
        let (install_path, path_selected) = self.resolve_install_path()?;
        log::info!(
            "Game path check completed in {:.2} ms",
            started.elapsed().as_secs_f64() * 1000.0
        );

        let layout = GameLayout::new(&install_path);
        let paks_dir = layout.paks_dir();
        if !self.env.fs.is_dir(&paks_dir) {
            return Err(RelaunchError::PaksDirNotFound { path: paks_dir });
        }

        self.set_phase(Phase::Deleting);
        let delete_started = Instant::now();
        let (delete_attempts, deleted) = self.delete_overrides(&layout)?;
        log::info!(
            "File deletion took {:.2} ms",
            delete_started.elapsed().as_secs_f64() * 1000.0
        );

        self.set_phase(Phase::Settling);
        self.env.notifier.status("Library Reloaded");
        self.env.sleeper.sleep(self.config.settle_delay());
        if self.config.notify_on_reload {
            self.env.notifier.notify("Library Reloaded");
        }

        self.set_phase(Phase::Launching);
        let launch_started = Instant::now();
        let executable = layout.executable();
        if !self.env.fs.exists(&executable) {
            return Err(RelaunchError::ExecutableNotFound {
                path: executable,
                expected: EPIC_EXECUTABLE_NAME,
                alternate: STEAM_EXECUTABLE_NAME,
            });
        }

        self.env
            .launcher
            .launch(&executable, &self.config.launch_arguments)
            .map_err(|source| RelaunchError::LaunchFailed {
                path: executable.clone(),
                source,
            })?;
        log::info!("Launched Fuser with reload arguments from: {:?}", executable);
        self.env.notifier.status("Launching Fuser...");
        log::info!(
            "Game launch took {:.2} ms",
            launch_started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(RelaunchReport {
            install_path,
            path_selected,
            delete_attempts,
            deleted,
            executable,
            elapsed: started.elapsed(),
        })
    }

    fn set_phase(&mut self, phase: Phase) {
        log::debug!("Relaunch phase: {} -> {}", self.phase, phase);
        self.phase = phase;
        self.env.notifier.phase_changed(phase);
    }

    fn resolve_install_path(&mut self) -> Result<(PathBuf, bool), RelaunchError> {
        if let Some(path) = &self.config.install_path {
            return Ok((path.clone(), false));
        }

        log::warn!("No game path stored. Prompting for selection.");
        self.env.notifier.status("Select game folder");
        match self
            .env
            .picker
            .pick_folder(GAME_FOLDER_TITLE)
            .filter(|p| !p.as_os_str().is_empty())
        {
            Some(path) => {
                log::info!("Game install path set to: {:?}", path);
                // A failed save costs a prompt next time, not this launch
                if let Err(e) = self.env.preferences.save_install_path(&path) {
                    log::warn!("Failed to save game path: {:#}", e);
                }
                self.selected_path = Some(path.clone());
                Ok((path, true))
            }
            None => {
                log::warn!("No folder selected. Cannot proceed.");
                Err(RelaunchError::NoFolderSelected)
            }
        }
    }

    /// Returns the attempt that succeeded and the files that were actually removed
    fn delete_overrides(&self, layout: &GameLayout) -> Result<(u32, Vec<PathBuf>), RelaunchError> {
        let max_attempts = self.config.delete_attempts();
        let files = layout.override_files();
        let mut deleted = Vec::new();
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.delete_attempt(&files, attempt, &mut deleted) {
                Ok(()) if files.iter().all(|f| !self.env.fs.exists(f)) => {
                    log::info!("File deletion successful.");
                    return Ok((attempt, deleted));
                }
                Ok(()) => last_error = "files still exist after deletion".to_string(),
                Err(e) => {
                    log::warn!("Attempt {}: Failed to delete files: {}", attempt, e);
                    last_error = e.to_string();
                }
            }

            log::warn!("Attempt {}: Files still exist or deletion failed.", attempt);
            self.env.notifier.status(&format!(
                "Retrying file deletion ({}/{})...",
                attempt, max_attempts
            ));
            if attempt < max_attempts {
                self.env.sleeper.sleep(self.config.retry_backoff());
            }
        }

        log::error!("Failed to delete files after maximum attempts. Aborting launch.");
        Err(RelaunchError::DeletionFailed {
            attempts: max_attempts,
            last_error,
        })
    }

    /// One pass over both files. A file that vanished in the meantime is not an error.
    fn delete_attempt(
        &self,
        files: &[PathBuf],
        attempt: u32,
        deleted: &mut Vec<PathBuf>,
    ) -> io::Result<()> {
        for file in files {
            if !self.env.fs.exists(file) {
                continue;
            }
            match self.env.fs.remove_file(file) {
                Ok(()) => {
                    log::info!("Attempt {}: Deleted {:?}", attempt, file);
                    if !deleted.contains(file) {
                        deleted.push(file.clone());
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::time::Duration;

    /// In-memory stand-in for every collaborator, recording what was asked of it
    #[derive(Default)]
    struct Fake {
        files: RefCell<HashSet<PathBuf>>,
        dirs: RefCell<HashSet<PathBuf>>,
        pick: RefCell<Option<PathBuf>>,
        picks: Cell<u32>,
        /// Number of remove_file calls that fail before removals start working
        failing_removes: Cell<u32>,
        removes: RefCell<Vec<PathBuf>>,
        launches: RefCell<Vec<(PathBuf, String)>>,
        launch_error: Cell<bool>,
        sleeps: RefCell<Vec<Duration>>,
        statuses: RefCell<Vec<String>>,
        notifications: RefCell<Vec<String>>,
        phases: RefCell<Vec<Phase>>,
        terminated: Cell<u32>,
        saved: RefCell<Vec<PathBuf>>,
    }

    impl Fake {
        fn with_install(root: &str, overrides: bool, executable: bool) -> Self {
            let fake = Fake::default();
            let layout = GameLayout::new(root);
            fake.dirs.borrow_mut().insert(layout.paks_dir());
            if overrides {
                for f in layout.override_files() {
                    fake.files.borrow_mut().insert(f);
                }
            }
            if executable {
                fake.files.borrow_mut().insert(layout.executable());
            }
            fake
        }

        fn env(&self) -> Collaborators<'_> {
            Collaborators {
                picker: self,
                preferences: self,
                fs: self,
                launcher: self,
                sleeper: self,
                notifier: self,
                terminator: self,
            }
        }
    }

    impl FolderPicker for Fake {
        fn pick_folder(&self, _title: &str) -> Option<PathBuf> {
            self.picks.set(self.picks.get() + 1);
            self.pick.borrow().clone()
        }
    }

    impl InstallPathStore for Fake {
        fn save_install_path(&self, path: &Path) -> anyhow::Result<()> {
            // saving must come before any file is touched
            assert!(self.removes.borrow().is_empty());
            self.saved.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    impl FileSystem for Fake {
        fn exists(&self, path: &Path) -> bool {
            self.files.borrow().contains(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.dirs.borrow().contains(path)
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.removes.borrow_mut().push(path.to_path_buf());
            if self.failing_removes.get() > 0 {
                self.failing_removes.set(self.failing_removes.get() - 1);
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "file in use"));
            }
            if self.files.borrow_mut().remove(path) {
                Ok(())
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        }
    }

    impl ProcessLauncher for Fake {
        fn launch(&self, executable: &Path, arguments: &str) -> io::Result<()> {
            if self.launch_error.get() {
                return Err(io::Error::new(io::ErrorKind::Other, "spawn failed"));
            }
            self.launches
                .borrow_mut()
                .push((executable.to_path_buf(), arguments.to_string()));
            Ok(())
        }
    }

    impl Sleeper for Fake {
        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
        }
    }

    impl Notifier for Fake {
        fn status(&self, message: &str) {
            self.statuses.borrow_mut().push(message.to_string());
        }

        fn phase_changed(&self, phase: Phase) {
            self.phases.borrow_mut().push(phase);
        }

        fn notify(&self, message: &str) {
            self.notifications.borrow_mut().push(message.to_string());
        }
    }

    impl Terminator for Fake {
        fn terminate(&self) {
            self.terminated.set(self.terminated.get() + 1);
        }
    }

    fn config_for(root: &str) -> LauncherConfig {
        LauncherConfig {
            install_path: Some(PathBuf::from(root)),
            launch_arguments: "-windowed -AUTH_TYPE=exchangecode".to_string(),
            ..LauncherConfig::default()
        }
    }

    #[test]
    fn test_unset_path_and_cancelled_picker_does_nothing() {
        let fake = Fake::with_install("game", true, true);
        let config = LauncherConfig::default();
        let mut seq = ReloadSequence::new(&config, fake.env());

        let err = seq.run().unwrap_err();

        assert!(matches!(err, RelaunchError::NoFolderSelected));
        assert_eq!(fake.picks.get(), 1);
        assert!(fake.removes.borrow().is_empty());
        assert!(fake.launches.borrow().is_empty());
        assert_eq!(fake.terminated.get(), 0);
        assert_eq!(seq.phase(), Phase::Failed);
        assert!(seq.selected_path().is_none());
        assert!(fake.saved.borrow().is_empty());
        assert_eq!(fake.statuses.borrow().last().unwrap(), "No folder selected");
    }

    #[test]
    fn test_picked_path_is_used_and_reported() {
        let fake = Fake::with_install("picked", false, true);
        *fake.pick.borrow_mut() = Some(PathBuf::from("picked"));
        let config = LauncherConfig::default();
        let mut seq = ReloadSequence::new(&config, fake.env());

        let report = seq.run().unwrap();

        assert!(report.path_selected);
        assert_eq!(report.install_path, PathBuf::from("picked"));
        assert_eq!(seq.selected_path(), Some(Path::new("picked")));
        assert_eq!(*fake.saved.borrow(), vec![PathBuf::from("picked")]);
        assert_eq!(fake.launches.borrow().len(), 1);
    }

    #[test]
    fn test_picked_path_survives_later_abort() {
        let fake = Fake::default();
        *fake.pick.borrow_mut() = Some(PathBuf::from("wrong"));
        let config = LauncherConfig::default();
        let mut seq = ReloadSequence::new(&config, fake.env());

        assert!(matches!(
            seq.run(),
            Err(RelaunchError::PaksDirNotFound { .. })
        ));
        assert_eq!(seq.selected_path(), Some(Path::new("wrong")));
        assert_eq!(*fake.saved.borrow(), vec![PathBuf::from("wrong")]);
    }

    #[test]
    fn test_successful_run_deletes_launches_and_exits() {
        let fake = Fake::with_install("game", true, true);
        let config = config_for("game");
        let mut seq = ReloadSequence::new(&config, fake.env());

        let report = seq.run().unwrap();
        let layout = GameLayout::new("game");

        for f in layout.override_files() {
            assert!(!fake.exists(&f));
        }
        assert_eq!(report.deleted, layout.override_files().to_vec());
        assert_eq!(report.delete_attempts, 1);
        assert!(!report.path_selected);
        assert_eq!(
            *fake.launches.borrow(),
            vec![(layout.executable(), config.launch_arguments.clone())]
        );
        assert_eq!(fake.terminated.get(), 1);
        assert_eq!(fake.picks.get(), 0);
        assert_eq!(*fake.sleeps.borrow(), vec![config.settle_delay()]);
        assert_eq!(*fake.notifications.borrow(), vec!["Library Reloaded"]);
        assert_eq!(
            *fake.phases.borrow(),
            vec![
                Phase::ResolvingPath,
                Phase::Deleting,
                Phase::Settling,
                Phase::Launching,
                Phase::Done
            ]
        );
        assert_eq!(fake.statuses.borrow().last().unwrap(), "Launching Fuser...");
    }

    #[test]
    fn test_delete_succeeds_on_third_attempt() {
        let fake = Fake::with_install("game", true, true);
        fake.failing_removes.set(2);
        let config = config_for("game");
        let mut seq = ReloadSequence::new(&config, fake.env());

        let report = seq.run().unwrap();

        assert_eq!(report.delete_attempts, 3);
        assert_eq!(fake.launches.borrow().len(), 1);
        // two backoffs, then the settle wait
        assert_eq!(
            *fake.sleeps.borrow(),
            vec![
                config.retry_backoff(),
                config.retry_backoff(),
                config.settle_delay()
            ]
        );
        let statuses = fake.statuses.borrow();
        assert!(statuses.contains(&"Retrying file deletion (1/3)...".to_string()));
        assert!(statuses.contains(&"Retrying file deletion (2/3)...".to_string()));
    }

    #[test]
    fn test_delete_fails_every_attempt() {
        let fake = Fake::with_install("game", true, true);
        fake.failing_removes.set(u32::MAX);
        let config = config_for("game");
        let mut seq = ReloadSequence::new(&config, fake.env());

        let err = seq.run().unwrap_err();

        match err {
            RelaunchError::DeletionFailed {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("file in use"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(fake.launches.borrow().is_empty());
        assert_eq!(fake.terminated.get(), 0);
        // no backoff after the final attempt, and no settle wait
        assert_eq!(fake.sleeps.borrow().len(), 2);
        // the pak failure ends each attempt before the sig is tried
        assert_eq!(fake.removes.borrow().len(), 3);
    }

    #[test]
    fn test_missing_paks_dir_aborts_before_delete() {
        let fake = Fake::default();
        fake.files.borrow_mut().extend(GameLayout::new("game").override_files());
        let config = config_for("game");
        let mut seq = ReloadSequence::new(&config, fake.env());

        let err = seq.run().unwrap_err();

        match err {
            RelaunchError::PaksDirNotFound { path } => {
                assert_eq!(path, GameLayout::new("game").paks_dir())
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(fake.removes.borrow().is_empty());
        assert!(fake.sleeps.borrow().is_empty());
        assert!(fake.launches.borrow().is_empty());
    }

    #[test]
    fn test_missing_executable_aborts_after_settle() {
        let fake = Fake::with_install("game", true, false);
        let config = config_for("game");
        let mut seq = ReloadSequence::new(&config, fake.env());

        let err = seq.run().unwrap_err();
        let layout = GameLayout::new("game");

        match &err {
            RelaunchError::ExecutableNotFound {
                path,
                expected,
                alternate,
            } => {
                assert_eq!(*path, layout.executable());
                assert_eq!(*expected, EPIC_EXECUTABLE_NAME);
                assert_eq!(*alternate, STEAM_EXECUTABLE_NAME);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains(&layout.executable().display().to_string()));
        // deletion and settle already happened and are not undone
        assert!(!fake.exists(&layout.pak_file()));
        assert!(!fake.exists(&layout.sig_file()));
        assert_eq!(*fake.sleeps.borrow(), vec![config.settle_delay()]);
        assert!(fake.launches.borrow().is_empty());
        assert_eq!(seq.phase(), Phase::Failed);
    }

    #[test]
    fn test_launch_failure_keeps_files_deleted() {
        let fake = Fake::with_install("game", true, true);
        fake.launch_error.set(true);
        let config = config_for("game");
        let mut seq = ReloadSequence::new(&config, fake.env());

        let err = seq.run().unwrap_err();

        assert!(matches!(err, RelaunchError::LaunchFailed { .. }));
        let layout = GameLayout::new("game");
        assert!(!fake.exists(&layout.pak_file()));
        assert!(!fake.exists(&layout.sig_file()));
        assert_eq!(fake.terminated.get(), 0);
        assert_eq!(fake.statuses.borrow().last().unwrap(), "Failed to launch Fuser");
    }

    #[test]
    fn test_second_run_with_files_absent_still_launches() {
        let fake = Fake::with_install("game", true, true);
        let config = config_for("game");

        ReloadSequence::new(&config, fake.env()).run().unwrap();
        let removes_after_first = fake.removes.borrow().len();
        let report = ReloadSequence::new(&config, fake.env()).run().unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(report.delete_attempts, 1);
        assert_eq!(fake.removes.borrow().len(), removes_after_first);
        assert_eq!(fake.launches.borrow().len(), 2);
    }

    #[test]
    fn test_custom_settle_delay_and_no_notification() {
        let fake = Fake::with_install("game", false, true);
        let config = LauncherConfig {
            settle_delay_ms: 3000,
            notify_on_reload: false,
            ..config_for("game")
        };

        ReloadSequence::new(&config, fake.env()).run().unwrap();

        assert_eq!(*fake.sleeps.borrow(), vec![Duration::from_secs(3)]);
        assert!(fake.notifications.borrow().is_empty());
    }
}
