use super::backend::{RecognitionError, NO_SPEECH_MESSAGE};
use serde::{Deserialize, Serialize};

/// Subject for one-shot recognition (request/reply).
pub const RECOGNIZE_SUBJECT: &str = "speech.recognize";

/// Subject for starting a continuous session (request/reply).
pub const LISTEN_START_SUBJECT: &str = "speech.listen.start";

/// Subject for stopping a continuous session (request/reply; the reply is
/// the stop acknowledgement).
pub const LISTEN_STOP_SUBJECT: &str = "speech.listen.stop";

/// Subject on which the daemon publishes segments for a session.
pub fn segment_subject(session_id: &str) -> String {
    format!("speech.segment.{}", session_id)
}

/// One-shot recognition request sent to the speech daemon
#[derive(Debug, Serialize, Deserialize)]
pub struct RecognizeRequest {
    pub request_id: String,
    pub pcm: String, // Base64-encoded PCM bytes
    pub sample_rate: u32,
    pub channels: u16,
    pub timestamp: String, // RFC3339 timestamp
}

/// Outcome of a one-shot recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizeReason {
    Recognized,
    NoMatch,
    Canceled,
}

/// One-shot recognition reply from the speech daemon
#[derive(Debug, Serialize, Deserialize)]
pub struct RecognizeReply {
    pub reason: RecognizeReason,
    pub text: Option<String>,
    /// Cancellation detail when reason is `canceled`
    pub detail: Option<String>,
}

impl RecognizeReply {
    /// Map the provider outcome to a transcript: recognized text passes
    /// through, silence becomes the fixed no-speech message, cancellation
    /// becomes an error carrying the provider's detail.
    pub fn into_transcript(self) -> Result<String, RecognitionError> {
        match self.reason {
            RecognizeReason::Recognized => Ok(self.text.unwrap_or_default()),
            RecognizeReason::NoMatch => Ok(NO_SPEECH_MESSAGE.to_string()),
            RecognizeReason::Canceled => Err(RecognitionError::Canceled(
                self.detail.unwrap_or_else(|| "unknown reason".to_string()),
            )),
        }
    }
}

/// Start/stop control request for a continuous session
#[derive(Debug, Serialize, Deserialize)]
pub struct ListenRequest {
    pub session_id: String,
    pub timestamp: String,
}

/// Control reply from the speech daemon
#[derive(Debug, Serialize, Deserialize)]
pub struct ListenReply {
    pub ok: bool,
    pub error: Option<String>,
}

/// Segment message published by the speech daemon during a continuous session
#[derive(Debug, Serialize, Deserialize)]
pub struct SegmentMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    pub confidence: Option<f32>,
    /// Set on the informational session-stopped notice
    #[serde(default)]
    pub stopped: bool,
}
