use crate::pipeline::{StructuredSections, TextPipeline};
use crate::speech::{ContinuousControl, RecognitionError, SegmentEvent, SpeechBackend};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// How long `stop()` waits for the segment reader to drain after the
/// provider side is torn down. Expiry forces the reader down so the
/// transcript snapshot can never hang.
const READER_JOIN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Recognition already started")]
    AlreadyRecording,

    #[error("Recognition not started")]
    NotRecording,

    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

/// Result of stopping a session.
///
/// `summary`/`insights` are present only when the transcript was non-empty;
/// `stop_error` carries a provider stop failure without discarding whatever
/// text was captured before it.
#[derive(Debug)]
pub struct StopOutcome {
    pub transcript: String,
    pub summary: Option<String>,
    pub insights: Option<StructuredSections>,
    pub stop_error: Option<String>,
}

/// A recognition session in flight. Present only while recording; the
/// transcript buffer has exactly one writer, the segment reader task.
struct LiveSession {
    transcript: Arc<Mutex<String>>,
    control: Box<dyn ContinuousControl>,
    reader: JoinHandle<()>,
}

/// State machine owning the single live recognition session.
///
/// States are Idle (no live session) and Recording; the transient Stopped
/// state folds back to Idle inside `stop()` once the result is extracted.
/// The inner mutex serializes start/stop, so a concurrent second `start()`
/// deterministically observes `AlreadyRecording`.
pub struct SessionController {
    backend: Arc<dyn SpeechBackend>,
    pipeline: Arc<TextPipeline>,
    live: Mutex<Option<LiveSession>>,
    reader_grace: Duration,
}

impl SessionController {
    pub fn new(backend: Arc<dyn SpeechBackend>, pipeline: Arc<TextPipeline>) -> Self {
        Self::with_reader_grace(backend, pipeline, READER_JOIN_GRACE)
    }

    /// Same as [`new`](Self::new) with an explicit reader drain grace.
    pub fn with_reader_grace(
        backend: Arc<dyn SpeechBackend>,
        pipeline: Arc<TextPipeline>,
        reader_grace: Duration,
    ) -> Self {
        Self {
            backend,
            pipeline,
            live: Mutex::new(None),
            reader_grace,
        }
    }

    pub async fn is_recording(&self) -> bool {
        self.live.lock().await.is_some()
    }

    /// Start a continuous recognition session.
    ///
    /// The transcript is reset on every start. Returns once streaming has
    /// been initiated, not once the first word is recognized. On open
    /// failure the controller stays Idle.
    pub async fn start(&self) -> Result<(), SessionError> {
        let mut live = self.live.lock().await;
        if live.is_some() {
            return Err(SessionError::AlreadyRecording);
        }

        let session = match self.backend.open_continuous().await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to start continuous recognition: {}", e);
                return Err(e.into());
            }
        };

        info!("Recording started (session {})", session.session_id);

        let transcript = Arc::new(Mutex::new(String::new()));
        let buffer = Arc::clone(&transcript);
        let mut events = session.events;

        let reader = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    SegmentEvent::Recognized(text) => {
                        debug!("Recognized text: {}", text);
                        buffer.lock().await.push_str(&text);
                    }
                    SegmentEvent::Stopped => {
                        debug!("Continuous recognition stopped.");
                    }
                }
            }
        });

        *live = Some(LiveSession {
            transcript,
            control: session.control,
            reader,
        });

        Ok(())
    }

    /// Stop the session and return the accumulated transcript, running the
    /// analysis pipeline when there is anything to analyze.
    ///
    /// Blocks until the provider acknowledges the stop (bounded by the
    /// backend's stop timeout) and the segment reader has drained, so the
    /// snapshot cannot race an in-flight segment.
    pub async fn stop(&self) -> Result<StopOutcome, SessionError> {
        let mut live = self.live.lock().await;
        let Some(mut session) = live.take() else {
            return Err(SessionError::NotRecording);
        };

        let stop_error = match session.control.stop().await {
            Ok(()) => None,
            Err(e) => {
                error!("Error stopping continuous recognition: {}", e);
                Some(e.to_string())
            }
        };

        // The segment channel closes when the provider side is released;
        // joining the reader guarantees no append is in flight when we
        // snapshot the transcript.
        match tokio::time::timeout(self.reader_grace, &mut session.reader).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Segment reader task panicked: {}", e),
            Err(_) => {
                error!("Segment reader did not drain in time; aborting");
                session.reader.abort();
            }
        }

        let transcript = session.transcript.lock().await.clone();

        info!("Recording stopped ({} chars captured)", transcript.len());

        if transcript.is_empty() {
            // Nothing to summarize; skip the pipeline entirely.
            return Ok(StopOutcome {
                transcript,
                summary: None,
                insights: None,
                stop_error,
            });
        }

        let result = self.pipeline.run(&transcript).await;

        Ok(StopOutcome {
            transcript,
            summary: Some(result.summary),
            insights: Some(result.insights),
            stop_error,
        })
    }
}
