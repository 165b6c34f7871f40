//! Startup and shutdown of a debugging session.
//!
//! [`Bootstrap`] owns the [`Synchronizer`] together with the persisted
//! [`ProjectState`] and the [`RecentTargets`] list, so every successful
//! target load, manual or automatic, goes through one path.

use std::path::{Path, PathBuf};

use loupe_config::SessionConfig;
use loupe_engine::DebugEngine;

use crate::bus::{Notification, Surface};
use crate::error::SessionError;
use crate::project::{Geometry, ProjectState, ProjectStore};
use crate::recents::RecentTargets;
use crate::sync::Synchronizer;

/// A synchronizer wired to project persistence.
#[derive(Debug)]
pub struct Bootstrap<E: DebugEngine, S: ProjectStore> {
    sync: Synchronizer<E>,
    store: S,
    project: ProjectState,
    recents: RecentTargets,
    auto_load: bool,
}

impl<E: DebugEngine, S: ProjectStore> Bootstrap<E, S> {
    /// Read the project state from `store`. An unreadable store is
    /// reported as a console warning and replaced by defaults.
    pub fn new(mut sync: Synchronizer<E>, store: S, config: &SessionConfig) -> Self {
        let project = store.load().unwrap_or_else(|err| {
            tracing::warn!(%err, "project state unreadable; using defaults");
            sync.warn(format!("project state unreadable, using defaults: {err}"));
            ProjectState::default()
        });
        let recents =
            RecentTargets::from_entries(config.recent_target_cap, project.recents.iter().cloned());
        Self {
            sync,
            store,
            project,
            recents,
            auto_load: config.auto_load_most_recent,
        }
    }

    /// Restore the window geometry, then load the most recent target when
    /// allowed. Returns the auto-loaded target, if any.
    ///
    /// Neither a rejected load nor a failed save stops startup; both end up
    /// in the console.
    pub fn start(&mut self) -> Option<PathBuf> {
        let geometry = self.project.application_geometry.unwrap_or_default();
        self.sync
            .bus_mut()
            .publish(&Surface::Window, &Notification::SetContents(geometry.to_string()));

        if !self.auto_load || self.project.disable_most_recent {
            return None;
        }
        let path = self.recents.most_recent().map(Path::to_path_buf)?;
        tracing::info!(path = %path.display(), "auto-loading most recent target");
        if let Err(err) = self.sync.load_target(&path) {
            tracing::warn!(%err, "auto-load failed");
            return None;
        }
        if let Err(err) = self.record_load(&path) {
            self.report_save_failure(&err);
        }
        Some(path)
    }

    /// Load `path`, record it as most recent and persist the project.
    ///
    /// The session reflects the new target even when saving fails.
    pub fn load_target(&mut self, path: &Path) -> Result<(), SessionError> {
        self.sync.load_target(path)?;
        self.record_load(path).map_err(|err| {
            self.report_save_failure(&err);
            err
        })
    }

    fn record_load(&mut self, path: &Path) -> Result<(), SessionError> {
        self.sync.process_pending();
        self.recents.push(path);
        self.project.recents = self.recents.entries().to_vec();
        self.store.save(&self.project)
    }

    fn report_save_failure(&mut self, err: &SessionError) {
        tracing::warn!(%err, "failed to save project state");
        self.sync.warn(format!("could not save project state: {err}"));
    }

    /// Persist the final window geometry and recents.
    pub fn shutdown(&mut self, geometry: Option<Geometry>) -> Result<(), SessionError> {
        if geometry.is_some() {
            self.project.application_geometry = geometry;
        }
        self.project.recents = self.recents.entries().to_vec();
        self.store.save(&self.project)?;
        tracing::info!("session state saved");
        Ok(())
    }

    /// Stop auto-loading on future startups (or resume it).
    pub fn set_disable_most_recent(&mut self, disable: bool) {
        self.project.disable_most_recent = disable;
    }

    pub fn sync(&self) -> &Synchronizer<E> {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut Synchronizer<E> {
        &mut self.sync
    }

    pub fn recents(&self) -> &RecentTargets {
        &self.recents
    }

    pub fn project(&self) -> &ProjectState {
        &self.project
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
