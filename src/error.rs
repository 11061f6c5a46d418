//! Session error types for tailwatch.
//!
//! Validation and misuse errors are returned synchronously from
//! [`TailSession::start`](crate::session::TailSession::start) and
//! [`TailSession::stop`](crate::session::TailSession::stop). Read failures
//! during a tail never surface here; they arrive as events.

use std::fmt;
use std::path::PathBuf;

/// Error starting or stopping a tail session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The path string cannot be turned into a filesystem path.
    InvalidPath { input: String },

    /// The path does not exist.
    FileNotFound { path: PathBuf },

    /// A tail is already running in this session.
    Busy { path: PathBuf },

    /// `stop` was called with no tail running.
    NoActiveSession,

    /// The worker thread could not be spawned.
    WorkerSpawn { message: String },
}

impl SessionError {
    /// Short title for a blocking user-facing notice.
    pub fn caption(&self) -> &'static str {
        match self {
            SessionError::InvalidPath { .. } => "Malformed File Name",
            SessionError::FileNotFound { .. } => "File Not Found",
            SessionError::Busy { .. } => "Already Running",
            SessionError::NoActiveSession => "Not Running",
            SessionError::WorkerSpawn { .. } => "Could Not Start",
        }
    }

    /// Body text for a blocking user-facing notice.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::InvalidPath { .. } => "File Name is Not Valid",
            SessionError::FileNotFound { .. } => "Provided File Name Could Not Be Located",
            SessionError::Busy { .. } => "A File is Already Being Monitored",
            SessionError::NoActiveSession => "No File is Being Monitored",
            SessionError::WorkerSpawn { .. } => "Monitoring Could Not Be Started",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidPath { input } => {
                write!(f, "invalid file name: {:?}", input)
            }
            SessionError::FileNotFound { path } => {
                write!(f, "file not found: {}", path.display())
            }
            SessionError::Busy { path } => {
                write!(f, "session busy: already tailing {}", path.display())
            }
            SessionError::NoActiveSession => write!(f, "no active tail to stop"),
            SessionError::WorkerSpawn { message } => {
                write!(f, "failed to spawn tail worker: {}", message)
            }
        }
    }
}

impl std::error::Error for SessionError {}
