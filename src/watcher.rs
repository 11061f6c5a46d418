//! Change notifications for the tailed file.
//!
//! The worker still polls on its interval; a watch only ends a wait early.
//! After rotation the watch points at the old inode, so the worker drops it
//! on a failed read and creates a fresh one once the file is back.

use anyhow::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{sync_channel, Receiver};
use std::time::Duration;

pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    wake: Receiver<()>,
}

impl FileWatcher {
    pub fn new(path: &Path) -> Result<Self> {
        // One pending wake-up is enough; further ones are dropped
        let (tx, rx) = sync_channel(1);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_content_change(&event.kind) => {
                let _ = tx.try_send(());
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "file watch error"),
        })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            wake: rx,
        })
    }

    /// Sleep up to `timeout`, returning early with `true` if the file changed
    pub fn wait(&self, timeout: Duration) -> bool {
        let woken = self.wake.recv_timeout(timeout).is_ok();
        // Swallow a change that raced in behind the one that woke us
        while self.wake.try_recv().is_ok() {}
        woken
    }
}

/// Appends arrive as modify, rotation as remove followed by create
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}
