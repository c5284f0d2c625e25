//! Continuous recognition session management
//!
//! One `SessionController` exists per process. It owns the lifecycle of a
//! live recognition session: transcript accumulation from the segment
//! channel, idempotent start/stop semantics, and the synchronous "wait for
//! the final result" interface exposed to HTTP callers.

mod controller;

pub use controller::{SessionController, SessionError, StopOutcome};
