use super::backend::{
    ContinuousControl, ContinuousSession, RecognitionError, SegmentEvent, SpeechBackend,
};
use super::messages::{
    segment_subject, ListenReply, ListenRequest, RecognizeReply, RecognizeRequest,
    SegmentMessage, LISTEN_START_SUBJECT, LISTEN_STOP_SUBJECT, RECOGNIZE_SUBJECT,
};
use crate::audio::AudioClip;
use crate::config::SpeechConfig;
use anyhow::{Context, Result};
use async_nats::Client;
use base64::Engine;
use futures::stream::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How long to wait, after the stop acknowledgement, for the daemon's
/// session-stopped notice before tearing the segment stream down anyway.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Speech backend that talks to the speech daemon over NATS.
///
/// One-shot recognition is a single request/reply carrying the whole clip;
/// continuous recognition is a start request followed by a per-session
/// segment subscription, closed by a stop request whose reply is the
/// acknowledgement.
pub struct NatsSpeechBackend {
    client: Client,
    request_timeout: Duration,
    stop_timeout: Duration,
}

impl NatsSpeechBackend {
    pub async fn connect(config: &SpeechConfig) -> Result<Self> {
        info!("Connecting to speech daemon at {}", config.nats_url);

        let client = async_nats::connect(&config.nats_url)
            .await
            .context("Failed to connect to NATS")?;

        Ok(Self {
            client,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            stop_timeout: Duration::from_secs(config.stop_timeout_secs),
        })
    }

    async fn request(
        &self,
        subject: &'static str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<async_nats::Message, RecognitionError> {
        tokio::time::timeout(timeout, self.client.request(subject, payload.into()))
            .await
            .map_err(|_| RecognitionError::Provider(format!("request timed out on {}", subject)))?
            .map_err(|e| RecognitionError::Provider(e.to_string()))
    }
}

#[async_trait::async_trait]
impl SpeechBackend for NatsSpeechBackend {
    async fn recognize_clip(&self, clip: &AudioClip) -> Result<String, RecognitionError> {
        let request = RecognizeRequest {
            request_id: format!("recognize-{}", uuid::Uuid::new_v4()),
            pcm: base64::engine::general_purpose::STANDARD.encode(clip.pcm_bytes()),
            sample_rate: clip.sample_rate,
            channels: clip.channels,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&request)
            .map_err(|e| RecognitionError::Provider(e.to_string()))?;

        let reply = self
            .request(RECOGNIZE_SUBJECT, payload, self.request_timeout)
            .await?;

        let reply: RecognizeReply = serde_json::from_slice(&reply.payload)
            .map_err(|e| RecognitionError::Provider(format!("malformed reply: {}", e)))?;

        reply.into_transcript()
    }

    async fn open_continuous(&self) -> Result<ContinuousSession, RecognitionError> {
        let session_id = format!("listen-{}", uuid::Uuid::new_v4());

        // Subscribe before asking the daemon to start so no early segment
        // can slip past us.
        let mut subscriber = self
            .client
            .subscribe(segment_subject(&session_id))
            .await
            .map_err(|e| RecognitionError::Provider(e.to_string()))?;

        let start = ListenRequest {
            session_id: session_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&start)
            .map_err(|e| RecognitionError::Provider(e.to_string()))?;

        let reply = self
            .request(LISTEN_START_SUBJECT, payload, self.request_timeout)
            .await?;
        let reply: ListenReply = serde_json::from_slice(&reply.payload)
            .map_err(|e| RecognitionError::Provider(format!("malformed reply: {}", e)))?;
        if !reply.ok {
            return Err(RecognitionError::Provider(
                reply.error.unwrap_or_else(|| "listen start refused".to_string()),
            ));
        }

        info!("Continuous recognition session opened: {}", session_id);

        // Forward daemon segments onto the event channel. Ends at the
        // session-stopped notice or when the subscription is torn down.
        let (tx, rx) = mpsc::channel(64);
        let forwarder_session = session_id.clone();
        let forwarder: JoinHandle<()> = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let segment: SegmentMessage = match serde_json::from_slice(&msg.payload) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!("Failed to parse segment message: {}", e);
                        continue;
                    }
                };

                if segment.stopped {
                    let _ = tx.send(SegmentEvent::Stopped).await;
                    break;
                }

                // Only finalized segments count toward the transcript.
                if segment.partial {
                    continue;
                }

                if tx.send(SegmentEvent::Recognized(segment.text)).await.is_err() {
                    break;
                }
            }

            info!(
                "Segment forwarder stopped for session {}",
                forwarder_session
            );
        });

        Ok(ContinuousSession {
            session_id: session_id.clone(),
            events: rx,
            control: Box::new(NatsContinuousControl {
                client: self.client.clone(),
                session_id,
                stop_timeout: self.stop_timeout,
                forwarder: Some(forwarder),
            }),
        })
    }

    fn name(&self) -> &str {
        "nats-speech-daemon"
    }
}

struct NatsContinuousControl {
    client: Client,
    session_id: String,
    stop_timeout: Duration,
    forwarder: Option<JoinHandle<()>>,
}

impl NatsContinuousControl {
    /// Wait briefly for the forwarder to see the session-stopped notice,
    /// then force it down so the segment channel is guaranteed to close.
    async fn release_forwarder(&mut self) {
        if let Some(mut task) = self.forwarder.take() {
            match tokio::time::timeout(DRAIN_GRACE, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Segment forwarder panicked: {}", e),
                Err(_) => {
                    warn!("Segment forwarder did not drain in time; aborting");
                    task.abort();
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl ContinuousControl for NatsContinuousControl {
    async fn stop(&mut self) -> Result<(), RecognitionError> {
        let request = ListenRequest {
            session_id: self.session_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = match serde_json::to_vec(&request) {
            Ok(p) => p,
            Err(e) => {
                self.release_forwarder().await;
                return Err(RecognitionError::Provider(e.to_string()));
            }
        };

        let outcome = tokio::time::timeout(
            self.stop_timeout,
            self.client.request(LISTEN_STOP_SUBJECT, payload.into()),
        )
        .await;

        let result = match outcome {
            Err(_) => Err(RecognitionError::StopTimeout(self.stop_timeout)),
            Ok(Err(e)) => Err(RecognitionError::Provider(e.to_string())),
            Ok(Ok(reply)) => match serde_json::from_slice::<ListenReply>(&reply.payload) {
                Ok(reply) if reply.ok => Ok(()),
                Ok(reply) => Err(RecognitionError::Provider(
                    reply.error.unwrap_or_else(|| "listen stop refused".to_string()),
                )),
                Err(e) => Err(RecognitionError::Provider(format!("malformed reply: {}", e))),
            },
        };

        // The recognizer resource is released on every path, acknowledged
        // or not.
        self.release_forwarder().await;

        info!("Continuous recognition session closed: {}", self.session_id);

        result
    }
}
