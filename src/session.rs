//! Tail session: the start/stop controller in front of a [`TailWorker`].
//!
//! A session owns at most one worker. Start requests are validated before
//! any worker exists; worker events are translated into [`SessionEvent`]s
//! and delivered on a channel, so the collaborator drains them on its own
//! thread instead of having state touched from the worker thread.

use crate::cancel::CancelToken;
use crate::error::SessionError;
use crate::event::{SessionEvent, StopReason, WorkerEvent};
use crate::worker::{TailWorker, WorkerOptions};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Whether a session currently has a worker running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
}

/// State shared between the session and its worker's listener
struct Shared {
    status: SessionStatus,
    worker: Option<TailWorker>,
    /// Bumped on every start so a late `Stopped` from an old worker
    /// cannot release a newer one
    generation: u64,
}

pub struct TailSession {
    options: WorkerOptions,
    shared: Arc<Mutex<Shared>>,
    events: Sender<SessionEvent>,
}

impl TailSession {
    /// Create an idle session and the receiver its events are delivered to
    pub fn new(options: WorkerOptions) -> (Self, Receiver<SessionEvent>) {
        let (tx, rx) = channel();
        (Self::with_sender(options, tx), rx)
    }

    /// Create an idle session that delivers events to an existing channel
    pub fn with_sender(options: WorkerOptions, events: Sender<SessionEvent>) -> Self {
        Self {
            options,
            shared: Arc::new(Mutex::new(Shared {
                status: SessionStatus::Idle,
                worker: None,
                generation: 0,
            })),
            events,
        }
    }

    /// Start tailing the file named by `input`
    ///
    /// A blank or whitespace-only name is ignored without error or events.
    /// On success the worker runs in the background and
    /// [`SessionEvent::Started`] has already been delivered when this
    /// returns; no cycle has necessarily completed yet.
    pub fn start(&self, input: &str) -> Result<(), SessionError> {
        if input.trim().is_empty() {
            return Ok(());
        }

        let path = resolve_path(input)?;

        let mut shared = lock_shared(&self.shared);
        if let Some(worker) = &shared.worker {
            return Err(SessionError::Busy {
                path: worker.path().to_path_buf(),
            });
        }

        shared.generation += 1;
        let listener = SessionListener {
            shared: Arc::downgrade(&self.shared),
            generation: shared.generation,
            events: self.events.clone(),
        };

        let worker = TailWorker::spawn(
            path.clone(),
            self.options.clone(),
            CancelToken::new(),
            move |event: WorkerEvent| listener.forward(event),
        )
        .map_err(|e| SessionError::WorkerSpawn {
            message: e.to_string(),
        })?;

        shared.worker = Some(worker);
        shared.status = SessionStatus::Running;

        // Sent under the lock so it always precedes this worker's Stopped
        tracing::info!(path = %path.display(), "tail session started");
        let _ = self.events.send(SessionEvent::Started { path });

        Ok(())
    }

    /// Ask the running worker to stop
    ///
    /// Returns immediately; [`SessionEvent::Stopped`] arrives once the
    /// loop has actually exited. Calling again before that is harmless.
    pub fn stop(&self) -> Result<(), SessionError> {
        let shared = lock_shared(&self.shared);
        match &shared.worker {
            Some(worker) => {
                worker.request_stop();
                Ok(())
            }
            None => Err(SessionError::NoActiveSession),
        }
    }

    pub fn status(&self) -> SessionStatus {
        lock_shared(&self.shared).status
    }

    pub fn is_running(&self) -> bool {
        self.status() == SessionStatus::Running
    }

    /// Path of the file being tailed, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        lock_shared(&self.shared)
            .worker
            .as_ref()
            .map(|worker| worker.path().to_path_buf())
    }
}

impl Drop for TailSession {
    fn drop(&mut self) {
        if let Some(worker) = &lock_shared(&self.shared).worker {
            worker.request_stop();
        }
    }
}

/// Translates one worker's events into session events
struct SessionListener {
    shared: Weak<Mutex<Shared>>,
    generation: u64,
    events: Sender<SessionEvent>,
}

impl SessionListener {
    fn forward(&self, event: WorkerEvent) {
        let event = match event {
            WorkerEvent::Started => {
                self.wait_for_start();
                return;
            }
            WorkerEvent::CycleStarted => return,
            WorkerEvent::OutputChanged(text) => SessionEvent::OutputChanged { text },
            WorkerEvent::ReadError {
                message,
                consecutive,
            } => SessionEvent::ReadError {
                message,
                consecutive,
            },
            WorkerEvent::Stopped(reason) => {
                tracing::info!(?reason, "tail session stopped");
                self.release(reason);
                return;
            }
        };

        let _ = self.events.send(event);
    }

    /// start() holds the lock until the session's Started is queued, so
    /// passing through it here keeps every worker event behind Started
    fn wait_for_start(&self) {
        if let Some(shared) = self.shared.upgrade() {
            drop(lock_shared(&shared));
        }
    }

    /// Go back to Idle and queue Stopped in one step under the lock, so a
    /// restart's Started can never overtake this worker's Stopped
    fn release(&self, reason: StopReason) {
        let stopped = SessionEvent::Stopped { reason };
        let Some(shared) = self.shared.upgrade() else {
            let _ = self.events.send(stopped);
            return;
        };

        // Dropping the worker handle from its own thread only detaches it
        let released = {
            let mut shared = lock_shared(&shared);
            let released = if shared.generation == self.generation {
                shared.status = SessionStatus::Idle;
                shared.worker.take()
            } else {
                None
            };
            let _ = self.events.send(stopped);
            released
        };
        drop(released);
    }
}

fn lock_shared(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Turn user input into a path to an existing regular file
fn resolve_path(input: &str) -> Result<PathBuf, SessionError> {
    // The OS cannot represent a path with an interior NUL
    if input.contains('\0') {
        return Err(SessionError::InvalidPath {
            input: input.to_string(),
        });
    }

    let path = crate::config::expand_path(&PathBuf::from(input));
    if !path.is_file() {
        return Err(SessionError::FileNotFound { path });
    }

    Ok(path)
}
