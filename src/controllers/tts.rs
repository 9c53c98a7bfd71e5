use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::tts::{
        parse_script, pcm, ConversationLine, SpeakerConfig, TtsService, TtsServiceApi,
        TtsServiceError, TtsSynthesisResult, VoiceName,
    },
    error::{AppError, AppResult},
};

/// Container for the returned audio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    Pcm,
}

/// Request for POST /api/tts/synthesize
#[derive(Debug, Serialize, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default)]
    pub voice: VoiceName,
    #[serde(default)]
    pub format: AudioFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub voice: VoiceName,
}

/// Request for POST /api/tts/conversation
///
/// Exactly one of `lines` or `script` must be given.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<ConversationLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default)]
    pub speaker_a: SpeakerRequest,
    #[serde(default)]
    pub speaker_b: SpeakerRequest,
    #[serde(default)]
    pub format: AudioFormat,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceName>,
    pub default: VoiceName,
}

pub struct TtsController {
    tts_service: Arc<TtsService>,
}

impl TtsController {
    pub fn new(tts_service: Arc<TtsService>) -> Self {
        Self { tts_service }
    }

    /// GET /api/tts/voices - List available voices
    pub async fn list_voices() -> Json<VoicesResponse> {
        Json(VoicesResponse {
            voices: VoiceName::ALL.to_vec(),
            default: VoiceName::default(),
        })
    }

    /// POST /api/tts/synthesize - Convert text to speech with one voice
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<SynthesizeRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let result = controller
            .tts_service
            .synthesize_single_speaker(request.text, request.voice)
            .await?;

        audio_response(result, request.format)
    }

    /// POST /api/tts/conversation - Convert a two-speaker dialogue to speech
    pub async fn conversation(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<ConversationRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let format = request.format;
        let (lines, speaker_a, speaker_b) = resolve_conversation(request)?;

        let result = controller
            .tts_service
            .synthesize_conversation(lines, speaker_a, speaker_b)
            .await?;

        audio_response(result, format)
    }
}

/// Turn the request into dialogue lines plus both speaker configs.
///
/// Names detected in a pasted script fill in any speaker name the request
/// leaves blank.
fn resolve_conversation(
    request: ConversationRequest,
) -> Result<(Vec<ConversationLine>, SpeakerConfig, SpeakerConfig), TtsServiceError> {
    let ConversationRequest {
        lines,
        script,
        speaker_a,
        speaker_b,
        ..
    } = request;

    let (lines, detected_a, detected_b) = match (lines, script) {
        (Some(lines), None) => (lines, None, None),
        (None, Some(script)) => {
            let parsed = parse_script(&script)?;
            (parsed.lines, Some(parsed.speaker_a), parsed.speaker_b)
        }
        _ => {
            return Err(TtsServiceError::Invalid(
                "Provide either 'lines' or 'script', not both".to_string(),
            ))
        }
    };

    let pick_name = |given: String, detected: Option<String>| {
        if given.trim().is_empty() {
            detected.unwrap_or_default()
        } else {
            given
        }
    };

    Ok((
        lines,
        SpeakerConfig::new(pick_name(speaker_a.name, detected_a), speaker_a.voice),
        SpeakerConfig::new(pick_name(speaker_b.name, detected_b), speaker_b.voice),
    ))
}

fn audio_response(
    result: TtsSynthesisResult,
    format: AudioFormat,
) -> AppResult<(StatusCode, HeaderMap, Body)> {
    let (content_type, body) = match format {
        AudioFormat::Wav => (
            HeaderValue::from_static("audio/wav"),
            pcm::encode_wav(&result.audio_data)
                .map_err(|e| AppError::Internal(format!("Failed to encode WAV: {}", e)))?,
        ),
        AudioFormat::Pcm => (
            HeaderValue::from_static("audio/L16;rate=24000;channels=1"),
            result.audio_data,
        ),
    };

    let duration = HeaderValue::from_str(&format!("{:.2}", result.duration_seconds))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert("X-Chunk-Count", HeaderValue::from(result.unit_count));
    headers.insert("X-Skipped-Chunks", HeaderValue::from(result.skipped_units));
    headers.insert("X-Character-Count", HeaderValue::from(result.char_count));
    headers.insert("X-Duration-Seconds", duration);

    Ok((StatusCode::OK, headers, Body::from(body)))
}
