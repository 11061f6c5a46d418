// Library interface for tailwatch
// The binary in main.rs is one presentation of it; embedders drive
// TailSession directly and drain its event receiver on their own thread.

pub mod cancel;
pub mod config;
pub mod error;
pub mod event;
pub mod session;
pub mod signal;
pub mod watcher;
pub mod window;
pub mod worker;

pub use cancel::CancelToken;
pub use error::SessionError;
pub use event::{SessionEvent, StopReason, WorkerEvent};
pub use session::{SessionStatus, TailSession};
pub use window::LineWindow;
pub use worker::{TailWorker, WorkerListener, WorkerOptions};
