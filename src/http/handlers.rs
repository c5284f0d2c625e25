use super::state::AppState;
use crate::audio::AudioClip;
use crate::pipeline::StructuredSections;
use crate::session::SessionError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
    pub summary: String,
    pub insights: StructuredSections,
}

#[derive(Debug, Deserialize)]
pub struct ListenRequest {
    /// Action token: "start" or "stop"
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct ListenStopResponse {
    pub transcript: String,
    pub summary: Option<String>,
    pub insights: Option<StructuredSections>,

    /// Provider stop failure, reported alongside the captured transcript
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub email: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub insights: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /transcribe
/// Recognize an uploaded audio clip and run the analysis pipeline
pub async fn transcribe(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("audio_file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => {
                upload = Some((filename, bytes.to_vec()));
                break;
            }
            Err(e) => {
                error!("Failed to read uploaded audio: {}", e);
                return error_response(StatusCode::BAD_REQUEST, "No audio file provided");
            }
        }
    }

    let Some((filename, bytes)) = upload else {
        error!("No audio file provided");
        return error_response(StatusCode::BAD_REQUEST, "No audio file provided");
    };

    if filename.is_empty() {
        error!("No audio file selected");
        return error_response(StatusCode::BAD_REQUEST, "No audio file selected");
    }

    // Stage the upload on disk for the decoder, then clean up either way.
    let path: PathBuf =
        std::env::temp_dir().join(format!("callscribe-upload-{}.wav", uuid::Uuid::new_v4()));

    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        error!("Failed to save uploaded audio: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to transcribe audio");
    }

    debug!("File saved to: {}", path.display());

    let clip = AudioClip::open(&path);
    let _ = tokio::fs::remove_file(&path).await;

    let clip = match clip {
        Ok(clip) => clip,
        Err(e) => {
            error!("Failed to decode uploaded audio: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to transcribe audio");
        }
    };

    let transcript = match state.speech.recognize_clip(&clip).await {
        Ok(transcript) => transcript,
        Err(e) => {
            error!("Recognition failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to transcribe audio");
        }
    };

    if transcript.is_empty() {
        error!("Recognition produced no transcript");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to transcribe audio");
    }

    let result = state.pipeline.run(&transcript).await;

    (
        StatusCode::OK,
        Json(TranscribeResponse {
            transcript,
            summary: result.summary,
            insights: result.insights,
        }),
    )
        .into_response()
}

/// POST /listen
/// Start or stop the live recognition session
pub async fn listen(State(state): State<AppState>, Json(req): Json<ListenRequest>) -> Response {
    debug!("Received action: {}", req.action);

    match req.action.as_str() {
        "start" => match state.session.start().await {
            Ok(()) => {
                info!("Recognition started");
                (
                    StatusCode::OK,
                    Json(MessageResponse {
                        message: "Recognition started".to_string(),
                    }),
                )
                    .into_response()
            }
            Err(SessionError::AlreadyRecording) => {
                error_response(StatusCode::CONFLICT, "Recognition already started")
            }
            Err(e) => {
                error!("Failed to start recognition: {}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to start recognition")
            }
        },

        "stop" => match state.session.stop().await {
            Ok(outcome) if outcome.transcript.is_empty() => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "No transcript available")
            }
            Ok(outcome) => (
                StatusCode::OK,
                Json(ListenStopResponse {
                    transcript: outcome.transcript,
                    summary: outcome.summary,
                    insights: outcome.insights,
                    stop_error: outcome.stop_error,
                }),
            )
                .into_response(),
            Err(SessionError::NotRecording) => {
                error_response(StatusCode::CONFLICT, "Recognition not started")
            }
            Err(e) => {
                error!("Failed to stop recognition: {}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to stop recognition")
            }
        },

        _ => {
            error!("Invalid action received");
            error_response(StatusCode::BAD_REQUEST, "Invalid action")
        }
    }
}

/// POST /send_email
/// Relay a finished report to a recipient
pub async fn send_email(
    State(state): State<AppState>,
    Json(req): Json<SendEmailRequest>,
) -> Response {
    let filled = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());

    if !filled(&req.email)
        || !filled(&req.transcript)
        || !filled(&req.summary)
        || !filled(&req.insights)
    {
        return error_response(StatusCode::BAD_REQUEST, "Missing required fields");
    }

    let email = req.email.unwrap_or_default();
    let transcript = req.transcript.unwrap_or_default();
    let summary = req.summary.unwrap_or_default();
    let insights = req.insights.unwrap_or_default();

    match state
        .mailer
        .send_report(&email, &transcript, &summary, &insights)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Email sent successfully!".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to send email: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to send email: {}", e),
            )
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
