//! HTTP API for transcript analysis
//!
//! - POST /transcribe - Recognize an uploaded audio clip and analyze it
//! - POST /listen - Start/stop live microphone recognition
//! - POST /send_email - Relay a finished report over SMTP
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
