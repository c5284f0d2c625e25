pub mod audio;
pub mod config;
pub mod http;
pub mod mail;
pub mod pipeline;
pub mod session;
pub mod speech;

pub use audio::AudioClip;
pub use config::Config;
pub use http::{create_router, AppState};
pub use mail::{MailError, Mailer};
pub use pipeline::{
    split_sections, GeminiGenerator, GenerationError, PipelineResult, StructuredSections,
    TextGenerator, TextPipeline,
};
pub use session::{SessionController, SessionError, StopOutcome};
pub use speech::{
    ContinuousControl, ContinuousSession, NatsSpeechBackend, RecognitionError, SegmentEvent,
    SpeechBackend,
};
