//! Settings sources: where snapshots come from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::RecommendedWatcher;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::loader::{load_config, ConfigError};
use crate::config::watcher::ConfigWatcher;
use crate::routing::{RouteBuildError, RouteTable};
use crate::settings::{Settings, SettingsHolder};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Routes(#[from] RouteBuildError),

    #[error("cannot watch config: {0}")]
    Watch(#[from] notify::Error),
}

/// Something that publishes full settings snapshots into a holder.
pub trait SettingsSource {
    /// Register once; the source publishes into `holder` from then on.
    fn subscribe(self, holder: Arc<SettingsHolder>) -> Result<Subscription, SourceError>;
}

/// Keeps a source's background machinery alive. Dropping it stops updates.
#[derive(Default)]
pub struct Subscription {
    watcher: Option<RecommendedWatcher>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Whether this subscription delivers further updates after the first.
    pub fn is_live(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Publishes one value and never updates it.
pub struct StaticSource<S> {
    settings: S,
}

impl<S: Settings + 'static> StaticSource<S> {
    pub fn new(settings: S) -> Self {
        Self { settings }
    }
}

impl<S: Settings + 'static> SettingsSource for StaticSource<S> {
    fn subscribe(self, holder: Arc<SettingsHolder>) -> Result<Subscription, SourceError> {
        holder.publish(self.settings);
        Ok(Subscription::default())
    }
}

/// Compiles `[[routes]]` from a TOML file and republishes on every valid
/// change. Must be subscribed from within a Tokio runtime.
pub struct FileSource {
    path: PathBuf,
    watch: bool,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            watch: true,
        }
    }

    /// Load once without watching for changes.
    pub fn once(mut self) -> Self {
        self.watch = false;
        self
    }
}

impl SettingsSource for FileSource {
    fn subscribe(self, holder: Arc<SettingsHolder>) -> Result<Subscription, SourceError> {
        let config = load_config(&self.path)?;
        let table = RouteTable::from_config(&config.routes)?;
        let routes = table.len();
        let version = holder.publish(table);
        tracing::info!(path = ?self.path, routes, version, "Routing settings loaded");

        if !self.watch {
            return Ok(Subscription::default());
        }

        let (watcher, mut updates) = ConfigWatcher::new(&self.path);
        let watcher = watcher.run()?;

        let task = tokio::spawn(async move {
            while let Some(config) = updates.recv().await {
                match RouteTable::from_config(&config.routes) {
                    Ok(table) => {
                        let routes = table.len();
                        let version = holder.publish(table);
                        tracing::info!(routes, version, "Routing settings reloaded");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected reloaded routes, keeping current settings");
                    }
                }
            }
        });

        Ok(Subscription {
            watcher: Some(watcher),
            task: Some(task),
        })
    }
}
