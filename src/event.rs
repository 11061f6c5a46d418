use serde::Serialize;
use std::path::PathBuf;

/// Why a worker loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Cancellation was observed at a cycle boundary
    Requested,
    /// Too many consecutive cycles failed to read the file
    ReadFailures,
    /// The worker thread panicked
    Panicked,
}

/// Events emitted by a tail worker from its background thread
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// The loop is running; emitted once before the first cycle
    Started,
    /// A new cycle is about to read the file
    CycleStarted,
    /// The rendered window differs from the last emitted one
    OutputChanged(String),
    /// The file could not be read this cycle; the cycle was skipped
    ReadError { message: String, consecutive: u32 },
    /// The loop has exited; no events follow
    Stopped(StopReason),
}

/// Events a tail session delivers to its collaborator
///
/// Events arrive on the worker's thread context. Consumers that touch
/// non-thread-safe state (UI widgets) must marshal them onto their own
/// context, e.g. by draining the session's receiver from their event loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A worker was started for `path`
    Started { path: PathBuf },
    /// New window contents, newline-delimited and bounded to `max_lines`
    OutputChanged { text: String },
    /// Transient read failure, the worker keeps retrying
    ReadError { message: String, consecutive: u32 },
    /// The worker exited and the session is idle again
    Stopped { reason: StopReason },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_event_json_shape() {
        let event = SessionEvent::OutputChanged {
            text: "a\nb\n".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"output_changed","text":"a\nb\n"}"#);
    }

    #[test]
    fn test_stopped_reason_json() {
        let event = SessionEvent::Stopped {
            reason: StopReason::ReadFailures,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"stopped","reason":"read_failures"}"#);
    }
}
