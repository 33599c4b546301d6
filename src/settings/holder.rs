//! The process-wide snapshot cell.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::observability::metrics;
use crate::settings::Settings;

/// A published settings value with its publication number.
pub struct Snapshot {
    version: u64,
    settings: Box<dyn Settings>,
}

impl Snapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn settings(&self) -> &dyn Settings {
        self.settings.as_ref()
    }
}

/// Holds the most recently published settings.
pub struct SettingsHolder {
    current: ArcSwapOption<Snapshot>,
    published: AtomicU64,
}

impl SettingsHolder {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            published: AtomicU64::new(0),
        }
    }

    /// The latest snapshot, or `None` before the first publish.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Replace the current snapshot. Returns its version, starting at 1.
    pub fn publish<S: Settings + 'static>(&self, settings: S) -> u64 {
        self.publish_boxed(Box::new(settings))
    }

    pub fn publish_boxed(&self, settings: Box<dyn Settings>) -> u64 {
        let version = self.published.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.store(Some(Arc::new(Snapshot { version, settings })));

        tracing::debug!(version, "Settings snapshot published");
        metrics::record_settings_published(version);
        version
    }
}

impl Default for SettingsHolder {
    fn default() -> Self {
        Self::new()
    }
}
