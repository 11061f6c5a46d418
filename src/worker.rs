//! The tail worker: a background loop that keeps the last N lines of a file.
//!
//! Each cycle re-reads the whole file from the start, so truncation and
//! rotation correct themselves on the next cycle without any offset
//! bookkeeping. The loop is cancelled cooperatively through a
//! [`CancelToken`] that is checked once the cycle has finished.

use crate::cancel::CancelToken;
use crate::event::{StopReason, WorkerEvent};
use crate::watcher::FileWatcher;
use crate::window::LineWindow;
use std::fs::File;
use std::io::{self, BufReader};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default number of trailing lines kept in the window
pub const DEFAULT_MAX_LINES: usize = 100;

/// Default wait between cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default number of consecutive failed reads before the worker gives up
pub const DEFAULT_MAX_READ_FAILURES: u32 = 5;

/// Tunables for a single worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Maximum number of lines retained in the window (at least 1)
    pub max_lines: usize,
    /// Wait between the end of one cycle and the start of the next
    pub poll_interval: Duration,
    /// Consecutive read failures tolerated before the loop stops
    pub max_read_failures: u32,
    /// Wake the inter-cycle wait early on filesystem change notifications
    pub watch: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_read_failures: DEFAULT_MAX_READ_FAILURES,
            watch: true,
        }
    }
}

/// Receiver of worker events
///
/// Called on the worker's own thread. Implementations must not block for
/// long, and must marshal onto their own context anything that is not
/// safe to touch from another thread.
pub trait WorkerListener: Send + 'static {
    fn on_event(&self, event: WorkerEvent);
}

impl<F> WorkerListener for F
where
    F: Fn(WorkerEvent) + Send + 'static,
{
    fn on_event(&self, event: WorkerEvent) {
        self(event)
    }
}

/// Handle to a running tail loop
///
/// Dropping the handle does not stop the loop; call [`request_stop`]
/// and wait for [`WorkerEvent::Stopped`].
///
/// [`request_stop`]: TailWorker::request_stop
pub struct TailWorker {
    path: PathBuf,
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

impl TailWorker {
    /// Start tailing `path` on a new background thread
    ///
    /// Returns as soon as the thread is spawned; no cycle has necessarily
    /// run yet. The caller is expected to have checked that `path` exists.
    /// `cancel` may be shared with other work so that a surrounding
    /// deadline can stop the worker too.
    pub fn spawn<L: WorkerListener>(
        path: impl Into<PathBuf>,
        options: WorkerOptions,
        cancel: CancelToken,
        listener: L,
    ) -> io::Result<Self> {
        let path = path.into();
        let mut tail = TailLoop::new(path.clone(), options, cancel.clone());

        let handle = thread::Builder::new()
            .name("tailwatch-worker".to_string())
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| tail.run(&listener)));

                let reason = match result {
                    Ok(reason) => reason,
                    Err(_) => {
                        tracing::error!(path = %tail.path.display(), "tail worker panicked");
                        StopReason::Panicked
                    }
                };

                tracing::debug!(path = %tail.path.display(), ?reason, "tail worker stopped");
                listener.on_event(WorkerEvent::Stopped(reason));
            })?;

        Ok(Self {
            path,
            cancel,
            handle,
        })
    }

    /// Ask the loop to stop at the next cycle boundary
    ///
    /// Non-blocking and idempotent. The loop finishes the cycle it is in,
    /// then emits exactly one [`WorkerEvent::Stopped`].
    pub fn request_stop(&self) {
        if self.cancel.cancel() {
            tracing::debug!(path = %self.path.display(), "stop requested");
        }
    }

    /// The file this worker tails
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The token that stops this worker
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Block until the loop thread exits
    pub fn join(self) {
        if self.handle.join().is_err() {
            tracing::error!(path = %self.path.display(), "tail worker thread panicked while stopping");
        }
    }
}

/// State owned by the worker thread
struct TailLoop {
    path: PathBuf,
    options: WorkerOptions,
    cancel: CancelToken,
    window: LineWindow,
    last_rendered: String,
    failures: u32,
    watcher: Option<FileWatcher>,
}

impl TailLoop {
    fn new(path: PathBuf, options: WorkerOptions, cancel: CancelToken) -> Self {
        let window = LineWindow::new(options.max_lines);
        Self {
            path,
            options,
            cancel,
            window,
            last_rendered: String::new(),
            failures: 0,
            watcher: None,
        }
    }

    fn run(&mut self, listener: &dyn WorkerListener) -> StopReason {
        tracing::debug!(
            path = %self.path.display(),
            max_lines = self.options.max_lines,
            poll_interval_ms = self.options.poll_interval.as_millis() as u64,
            "tail worker started"
        );
        listener.on_event(WorkerEvent::Started);
        self.ensure_watcher();

        loop {
            listener.on_event(WorkerEvent::CycleStarted);

            match self.cycle() {
                Ok(changed) => {
                    if self.failures > 0 {
                        tracing::debug!(path = %self.path.display(), "file readable again");
                        self.failures = 0;
                        self.ensure_watcher();
                    }
                    if let Some(text) = changed {
                        tracing::debug!(lines = self.window.len(), "window changed");
                        listener.on_event(WorkerEvent::OutputChanged(text));
                    }
                }
                Err(e) => {
                    self.failures += 1;
                    // The watch is tied to the old inode after rotation
                    self.watcher = None;
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        consecutive = self.failures,
                        "failed to read tailed file"
                    );
                    listener.on_event(WorkerEvent::ReadError {
                        message: e.to_string(),
                        consecutive: self.failures,
                    });
                    if self.failures >= self.options.max_read_failures {
                        tracing::error!(
                            path = %self.path.display(),
                            failures = self.failures,
                            "giving up on tailed file"
                        );
                        return StopReason::ReadFailures;
                    }
                }
            }

            if self.cancel.is_cancelled() {
                return StopReason::Requested;
            }

            self.pause();

            if self.cancel.is_cancelled() {
                return StopReason::Requested;
            }
        }
    }

    /// One read-render-compare pass
    ///
    /// Returns the rendered window when it differs from the last one.
    /// The file handle lives only for the duration of the call.
    fn cycle(&mut self) -> io::Result<Option<String>> {
        // Read-only opens take no lock on unix; std opens with full share
        // mode on windows, so an active writer never blocks us.
        let file = File::open(&self.path)?;
        self.window.refill(BufReader::new(file))?;

        let rendered = self.window.render();
        if rendered == self.last_rendered {
            return Ok(None);
        }

        self.last_rendered.clone_from(&rendered);
        Ok(Some(rendered))
    }

    fn pause(&self) {
        if self.options.poll_interval.is_zero() {
            thread::yield_now();
            return;
        }

        match &self.watcher {
            Some(watcher) => {
                if watcher.wait(self.options.poll_interval) {
                    tracing::trace!(path = %self.path.display(), "woken by file change");
                }
            }
            None => thread::sleep(self.options.poll_interval),
        }
    }

    fn ensure_watcher(&mut self) {
        if !self.options.watch || self.watcher.is_some() {
            return;
        }

        match FileWatcher::new(&self.path) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "file watch unavailable, polling only");
            }
        }
    }
}
