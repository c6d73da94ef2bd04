//! File system watcher producing save events
//!
//! Stands in for the editor's "document saved" notification: every create,
//! content change or rename-into-place of a source file under the workspace
//! root becomes one `SaveEvent`. Writes inside the logging directory are
//! ignored so archiving never triggers itself.

use crate::source::Emitter;
use notify::event::{EventKind, ModifyKind};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create file watcher: {0}")]
    Create(#[source] notify::Error),

    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// A source file was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEvent {
    pub path: PathBuf,
}

/// Recursive watcher over a workspace root
pub struct SaveWatcher {
    root: PathBuf,
    extension: String,
    excluded: PathBuf,
    events: Emitter<SaveEvent>,
    watcher: Option<RecommendedWatcher>,
}

impl SaveWatcher {
    /// Watch `root` for files ending in `.{extension}`, skipping `excluded`
    pub fn new(root: &Path, extension: &str, excluded: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            extension: extension.to_string(),
            excluded: excluded.to_path_buf(),
            events: Emitter::new(),
            watcher: None,
        }
    }

    /// Event source to subscribe to
    pub fn events(&self) -> Emitter<SaveEvent> {
        self.events.clone()
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// Start watching; a no-op if already started
    pub fn start(&mut self) -> Result<(), WatchError> {
        if self.watcher.is_some() {
            return Ok(());
        }

        let events = self.events.clone();
        let extension = self.extension.clone();
        let excluded = self.excluded.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for save in save_events(&event, &extension, &excluded) {
                        tracing::debug!("Saved: {}", save.path.display());
                        events.emit(save);
                    }
                }
                Err(e) => tracing::warn!("File watcher error: {}", e),
            }
        })
        .map_err(WatchError::Create)?;

        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Watch {
                path: self.root.clone(),
                source,
            })?;

        tracing::info!("Watching {} for *.{} saves", self.root.display(), self.extension);
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Stop watching; the watcher thread exits when dropped
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            tracing::info!("Stopped watching {}", self.root.display());
        }
    }
}

/// Translate a raw notify event into save events
pub fn save_events(event: &notify::Event, extension: &str, excluded: &Path) -> Vec<SaveEvent> {
    let relevant = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };
    if !relevant {
        return Vec::new();
    }

    event
        .paths
        .iter()
        .filter(|path| !path.starts_with(excluded))
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .map(|path| SaveEvent { path: path.clone() })
        .collect()
}
