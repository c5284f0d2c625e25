// Integration tests for the HTTP layer, driven through the router with
// mocked speech and generation backends.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use callscribe::audio::AudioClip;
use callscribe::config::EmailConfig;
use callscribe::pipeline::{GenerationError, TextGenerator, TextPipeline};
use callscribe::speech::{
    ContinuousControl, ContinuousSession, RecognitionError, SegmentEvent, SpeechBackend,
};
use callscribe::{create_router, AppState, Mailer, SessionController};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Backend that recognizes every clip as a fixed transcript and supports
/// a single continuous session at a time.
struct FixedBackend {
    transcript: &'static str,
    slot: Arc<Mutex<Option<mpsc::Sender<SegmentEvent>>>>,
}

struct FixedControl {
    slot: Arc<Mutex<Option<mpsc::Sender<SegmentEvent>>>>,
}

#[async_trait::async_trait]
impl ContinuousControl for FixedControl {
    async fn stop(&mut self) -> Result<(), RecognitionError> {
        self.slot.lock().unwrap().take();
        Ok(())
    }
}

#[async_trait::async_trait]
impl SpeechBackend for FixedBackend {
    async fn recognize_clip(&self, _clip: &AudioClip) -> Result<String, RecognitionError> {
        Ok(self.transcript.to_string())
    }

    async fn open_continuous(&self) -> Result<ContinuousSession, RecognitionError> {
        let (tx, rx) = mpsc::channel(16);
        *self.slot.lock().unwrap() = Some(tx);
        Ok(ContinuousSession {
            session_id: "listen-test".to_string(),
            events: rx,
            control: Box::new(FixedControl {
                slot: Arc::clone(&self.slot),
            }),
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct FixedGenerator;

#[async_trait::async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.starts_with("Summarize") {
            Ok("Summary text".to_string())
        } else {
            Ok("Sentiment Analysis\n- positive\nInsights\n- good\nEmail Response\n- draft"
                .to_string())
        }
    }
}

fn test_state() -> (AppState, Arc<Mutex<Option<mpsc::Sender<SegmentEvent>>>>) {
    let slot = Arc::new(Mutex::new(None));
    let speech: Arc<dyn SpeechBackend> = Arc::new(FixedBackend {
        transcript: "hello world",
        slot: Arc::clone(&slot),
    });
    let generator: Arc<dyn TextGenerator> = Arc::new(FixedGenerator);
    let pipeline = Arc::new(TextPipeline::new(generator));
    let session = Arc::new(SessionController::new(Arc::clone(&speech), Arc::clone(&pipeline)));

    // Never connects in these tests; building the transport is enough.
    let mailer = Arc::new(
        Mailer::new(&EmailConfig {
            smtp_server: "localhost".to_string(),
            smtp_port: 2525,
            address: "agent@example.com".to_string(),
            password: "unused".to_string(),
        })
        .expect("mailer"),
    );

    (
        AppState {
            speech,
            session,
            pipeline,
            mailer,
        },
        slot,
    )
}

/// Minimal WAV clip (16kHz mono, 0.1s of silence) built in memory.
fn wav_fixture() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for _ in 0..1600 {
            writer.write_sample(0i16).expect("sample");
        }
        writer.finalize().expect("finalize");
    }
    cursor.into_inner()
}

const BOUNDARY: &str = "callscribe-test-boundary";

fn multipart_body(filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio_file\"; \
             filename=\"{filename}\"\r\nContent-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_health_check() {
    let (state, _) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_transcribe_without_file_is_bad_request() {
    let (state, _) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transcribe")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(format!("--{BOUNDARY}--\r\n")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No audio file provided");
}

#[tokio::test]
async fn test_transcribe_empty_filename_is_bad_request() {
    let (state, _) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transcribe")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body("", &wav_fixture())))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No audio file selected");
}

#[tokio::test]
async fn test_transcribe_clip_end_to_end() {
    let (state, _) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transcribe")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body("sample.wav", &wav_fixture())))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["transcript"], "hello world");
    assert_eq!(json["summary"], "Summary text");
    assert!(json["insights"]["sentiment_analysis"]
        .as_str()
        .unwrap()
        .contains("positive"));
    assert!(json["insights"]["insights"].as_str().unwrap().contains("good"));
    assert!(json["insights"]["email_response"]
        .as_str()
        .unwrap()
        .contains("draft"));
}

#[tokio::test]
async fn test_listen_invalid_action() {
    let (state, _) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/listen")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"pause"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid action");
}

#[tokio::test]
async fn test_listen_stop_without_start() {
    let (state, _) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/listen")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"stop"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Recognition not started");
}

#[tokio::test]
async fn test_listen_start_stop_cycle() {
    let (state, slot) = test_state();
    let app = create_router(state);

    let start = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/listen")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"start"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(start.status(), StatusCode::OK);

    // A second start must observe the live session.
    let second = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/listen")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"start"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // Feed a segment, then stop.
    {
        let tx = slot.lock().unwrap().as_ref().unwrap().clone();
        tx.send(SegmentEvent::Recognized("hello from the mic".to_string()))
            .await
            .unwrap();
    }

    let stop = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/listen")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"stop"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(stop.status(), StatusCode::OK);
    let json = body_json(stop).await;
    assert_eq!(json["transcript"], "hello from the mic");
    assert_eq!(json["summary"], "Summary text");
}

#[tokio::test]
async fn test_listen_stop_with_empty_transcript() {
    let (state, _slot) = test_state();
    let app = create_router(state);

    let start = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/listen")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"start"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(start.status(), StatusCode::OK);

    let stop = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/listen")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"stop"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(stop.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(stop).await;
    assert_eq!(json["error"], "No transcript available");
}

#[tokio::test]
async fn test_send_email_missing_fields() {
    let (state, _) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/send_email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"email":"a@example.com","transcript":"","summary":"s","insights":"i"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing required fields");
}
