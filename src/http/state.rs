use crate::mail::Mailer;
use crate::pipeline::TextPipeline;
use crate::session::SessionController;
use crate::speech::SpeechBackend;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Speech provider used for one-shot clip recognition
    pub speech: Arc<dyn SpeechBackend>,

    /// The process-wide live recognition session
    pub session: Arc<SessionController>,

    /// Transcript analysis pipeline
    pub pipeline: Arc<TextPipeline>,

    /// Outbound mail relay
    pub mailer: Arc<Mailer>,
}
