use crate::audio::AudioClip;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Fixed message returned when the provider hears audio but no speech.
/// Returned as a successful transcript, not an error.
pub const NO_SPEECH_MESSAGE: &str = "No speech could be recognized.";

#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The provider canceled recognition (bad audio, quota, auth failure).
    #[error("Speech recognition canceled: {0}")]
    Canceled(String),

    /// Transport-level failure talking to the provider.
    #[error("Speech provider error: {0}")]
    Provider(String),

    /// The provider did not acknowledge a stop request in time.
    #[error("Stop request timed out after {0:?}")]
    StopTimeout(Duration),
}

/// An event delivered by the provider during continuous recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentEvent {
    /// A finalized recognition segment. Partial (interim) results are
    /// filtered out before reaching this channel.
    Recognized(String),

    /// The provider reports the recognition session has stopped. Purely
    /// informational.
    Stopped,
}

/// Control half of a continuous recognition session.
#[async_trait::async_trait]
pub trait ContinuousControl: Send {
    /// Ask the provider to stop streaming and wait for the acknowledgement.
    ///
    /// The segment channel closes once the provider side is torn down, even
    /// when this returns an error; the recognizer resource is released
    /// unconditionally.
    async fn stop(&mut self) -> Result<(), RecognitionError>;
}

/// A live continuous recognition session.
///
/// `events` receives finalized segments until the session is stopped;
/// `control` is the handle used to stop it.
pub struct ContinuousSession {
    pub session_id: String,
    pub events: mpsc::Receiver<SegmentEvent>,
    pub control: Box<dyn ContinuousControl>,
}

/// Speech provider abstraction.
///
/// Implementations must not block past initiation in `open_continuous`;
/// segment delivery happens on the returned channel.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Submit a complete clip for one-shot recognition.
    ///
    /// "No speech detected" maps to [`NO_SPEECH_MESSAGE`]; cancellation and
    /// transport failures map to [`RecognitionError`].
    async fn recognize_clip(&self, clip: &AudioClip) -> Result<String, RecognitionError>;

    /// Begin a continuous recognition session on the provider's default
    /// live audio input.
    async fn open_continuous(&self) -> Result<ContinuousSession, RecognitionError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}
