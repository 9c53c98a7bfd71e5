use super::tts_repository::TtsRepository;
use crate::domain::tts::{SpeakerConfig, TransportError, VoiceName};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_config: Option<VoiceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    multi_speaker_voice_config: Option<MultiSpeakerVoiceConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MultiSpeakerVoiceConfig {
    speaker_voice_configs: Vec<SpeakerVoiceConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeakerVoiceConfig {
    speaker: String,
    voice_config: VoiceConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

fn voice_config(voice: VoiceName) -> VoiceConfig {
    VoiceConfig {
        prebuilt_voice_config: PrebuiltVoiceConfig {
            voice_name: voice.as_str().to_string(),
        },
    }
}

fn build_request(prompt: &str, speech_config: SpeechConfig) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![TextPart {
                text: prompt.to_string(),
            }],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["AUDIO"],
            speech_config,
        },
    }
}

fn single_voice_request(text: &str, voice: VoiceName) -> GenerateContentRequest {
    build_request(
        text,
        SpeechConfig {
            voice_config: Some(voice_config(voice)),
            multi_speaker_voice_config: None,
        },
    )
}

fn multi_voice_request(script: &str, speakers: &[SpeakerConfig; 2]) -> GenerateContentRequest {
    build_request(
        script,
        SpeechConfig {
            voice_config: None,
            multi_speaker_voice_config: Some(MultiSpeakerVoiceConfig {
                speaker_voice_configs: speakers
                    .iter()
                    .map(|speaker| SpeakerVoiceConfig {
                        speaker: speaker.name.clone(),
                        voice_config: voice_config(speaker.voice),
                    })
                    .collect(),
            }),
        },
    )
}

/// Pull the base64 audio payload out of a successful response and decode it
fn extract_audio(body: &str) -> Result<Vec<u8>, TransportError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| TransportError::message(format!("Malformed speech response: {}", e)))?;

    let data = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.inline_data)
        .map(|inline| inline.data)
        .ok_or_else(|| TransportError::message("No audio data returned from the speech endpoint"))?;

    general_purpose::STANDARD
        .decode(data.as_bytes())
        .map_err(|e| TransportError::message(format!("Invalid audio payload encoding: {}", e)))
}

/// Turn a non-success response into a structured transport error
fn error_from_response(status: u16, body: &str) -> TransportError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => TransportError::new(
            Some(envelope.error.code.unwrap_or(status)),
            envelope.error.status,
            envelope.error.message,
        ),
        Err(_) => {
            let preview: String = body.chars().take(200).collect();
            TransportError::new(
                Some(status),
                None,
                format!("Speech endpoint returned HTTP {}: {}", status, preview),
            )
        }
    }
}

fn error_from_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        TransportError::network(err)
    } else if let Some(status) = err.status() {
        TransportError::status(status.as_u16(), err.to_string())
    } else {
        TransportError::message(err.to_string())
    }
}

/// Gemini `generateContent` implementation of the speech endpoint
pub struct GeminiTtsRepository {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiTtsRepository {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one request and return the decoded PCM
    async fn call_gemini(&self, request: &GenerateContentRequest) -> Result<Vec<u8>, TransportError> {
        let start_time = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = %self.model, "Speech endpoint request failed");
                error_from_reqwest(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(error_from_reqwest)?;

        if !status.is_success() {
            let err = error_from_response(status.as_u16(), &body);
            tracing::error!(
                status = status.as_u16(),
                code = ?err.code,
                error = %err,
                model = %self.model,
                "Speech endpoint returned an error"
            );
            return Err(err);
        }

        let audio = extract_audio(&body)?;

        tracing::debug!(
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis() as u64,
            audio_size = audio.len(),
            "Speech endpoint audio received"
        );

        Ok(audio)
    }
}

#[async_trait]
impl TtsRepository for GeminiTtsRepository {
    async fn synthesize_single(
        &self,
        text: &str,
        voice: VoiceName,
    ) -> Result<Vec<u8>, TransportError> {
        tracing::info!(
            voice = %voice,
            text_length = text.chars().count(),
            text_preview = %text.chars().take(200).collect::<String>(),
            "Calling speech endpoint (single voice)"
        );

        self.call_gemini(&single_voice_request(text, voice)).await
    }

    async fn synthesize_multi(
        &self,
        script: &str,
        speakers: &[SpeakerConfig; 2],
    ) -> Result<Vec<u8>, TransportError> {
        tracing::info!(
            speaker_a = %speakers[0].name,
            voice_a = %speakers[0].voice,
            speaker_b = %speakers[1].name,
            voice_b = %speakers[1].voice,
            script_length = script.chars().count(),
            "Calling speech endpoint (multi voice)"
        );

        self.call_gemini(&multi_voice_request(script, speakers)).await
    }
}
