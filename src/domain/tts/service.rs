use super::assembler::assemble;
use super::batcher::{batch, normalize};
use super::error::TtsServiceError;
use super::model::{
    ConversationLine, DialogueBatch, SpeakerConfig, SpeakerSlot, SynthesisResult,
    SynthesisSettings, TextChunk,
};
use super::pcm::duration_seconds;
use super::retry::RetryPolicy;
use super::segmenter::segment;
use super::sequencer::ThrottledSequencer;
use super::sleeper::Sleeper;
use super::voice::VoiceName;
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TtsSynthesisResult {
    /// 16-bit little-endian mono PCM at 24 kHz
    pub audio_data: Vec<u8>,
    pub unit_count: usize,
    pub skipped_units: usize,
    pub char_count: usize,
    pub duration_seconds: f32,
}

/// Render one batch as the prompt sent to the multi-voice endpoint
pub fn build_conversation_prompt(
    batch: &DialogueBatch,
    speaker_a: &SpeakerConfig,
    speaker_b: &SpeakerConfig,
) -> String {
    let script = batch
        .lines
        .iter()
        .map(|line| {
            let name = match line.speaker {
                SpeakerSlot::A => &speaker_a.name,
                SpeakerSlot::B => &speaker_b.name,
            };
            format!("{}: {}", name, line.text.trim())
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "TTS the following conversation between {} and {}:\n{}",
        speaker_a.name, speaker_b.name, script
    )
}

pub struct TtsService {
    tts_repo: Arc<dyn TtsRepository>,
    sequencer: ThrottledSequencer,
    settings: SynthesisSettings,
}

impl TtsService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        settings: SynthesisSettings,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let retry = RetryPolicy::new(
            settings.max_retries,
            settings.base_retry_delay,
            sleeper.clone(),
        );
        let sequencer = ThrottledSequencer::new(retry, settings.inter_item_delay, sleeper);

        Self {
            tts_repo,
            sequencer,
            settings,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize free text with one voice.
    ///
    /// Text is split into size-bounded chunks that are synthesized one at a
    /// time. A chunk that keeps failing is skipped; the call only fails when
    /// no chunk produced audio.
    async fn synthesize_single_speaker(
        &self,
        text: String,
        voice: VoiceName,
    ) -> Result<TtsSynthesisResult, TtsServiceError>;

    /// Synthesize a two-speaker dialogue.
    ///
    /// Lines are packed into batches; the first batch that fails for good
    /// aborts the whole conversation.
    async fn synthesize_conversation(
        &self,
        lines: Vec<ConversationLine>,
        speaker_a: SpeakerConfig,
        speaker_b: SpeakerConfig,
    ) -> Result<TtsSynthesisResult, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize_single_speaker(
        &self,
        text: String,
        voice: VoiceName,
    ) -> Result<TtsSynthesisResult, TtsServiceError> {
        if text.trim().is_empty() {
            return Err(TtsServiceError::Invalid("Text cannot be empty".to_string()));
        }

        let char_count = text.chars().count();
        self.guard_size(char_count)?;

        // 1. Split into request-sized chunks
        let mut chunks = segment(&text, self.settings.max_chars_per_batch);
        chunks.retain(|chunk| !chunk.text.trim().is_empty());

        tracing::info!(
            voice = %voice,
            text_length = char_count,
            chunk_count = chunks.len(),
            "Single speaker synthesis request"
        );

        // 2. Synthesize chunk by chunk, tolerating failures
        let repo = self.tts_repo.clone();
        let results = self
            .sequencer
            .run_sequential(
                &chunks,
                |chunk: &TextChunk| {
                    let repo = repo.clone();
                    let text = chunk.text.clone();
                    async move { repo.synthesize_single(&text, voice).await }
                },
                false,
            )
            .await?;

        // 3. Reassemble
        self.finish(results, char_count)
    }

    async fn synthesize_conversation(
        &self,
        lines: Vec<ConversationLine>,
        speaker_a: SpeakerConfig,
        speaker_b: SpeakerConfig,
    ) -> Result<TtsSynthesisResult, TtsServiceError> {
        self.validate_conversation(&lines, &speaker_a, &speaker_b)?;

        let char_count: usize = lines.iter().map(ConversationLine::char_len).sum();
        self.guard_size(char_count)?;

        // 1. Split oversized lines, then pack lines into batches
        let mut normalized = normalize(&lines, self.settings.safe_line_chars());
        normalized.retain(|line| !line.text.trim().is_empty());
        let batches = batch(
            &normalized,
            self.settings.max_chars_per_batch,
            self.settings.per_line_overhead,
        );

        tracing::info!(
            speaker_a = %speaker_a.name,
            speaker_b = %speaker_b.name,
            line_count = lines.len(),
            normalized_line_count = normalized.len(),
            batch_count = batches.len(),
            "Conversation synthesis request"
        );

        // 2. Synthesize batch by batch, aborting on the first failure
        let repo = self.tts_repo.clone();
        let speakers = Arc::new([speaker_a.clone(), speaker_b.clone()]);
        let results = self
            .sequencer
            .run_sequential(
                &batches,
                |batch: &DialogueBatch| {
                    let prompt = build_conversation_prompt(batch, &speaker_a, &speaker_b);
                    let repo = repo.clone();
                    let speakers = speakers.clone();
                    async move { repo.synthesize_multi(&prompt, &speakers).await }
                },
                true,
            )
            .await?;

        // 3. Reassemble
        self.finish(results, char_count)
    }
}

impl TtsService {
    fn guard_size(&self, char_count: usize) -> Result<(), TtsServiceError> {
        if char_count > self.settings.max_input_chars {
            return Err(TtsServiceError::TooLarge(format!(
                "Text must be {} characters or less, got {}",
                self.settings.max_input_chars, char_count
            )));
        }
        Ok(())
    }

    fn validate_conversation(
        &self,
        lines: &[ConversationLine],
        speaker_a: &SpeakerConfig,
        speaker_b: &SpeakerConfig,
    ) -> Result<(), TtsServiceError> {
        if lines.is_empty() {
            return Err(TtsServiceError::Invalid(
                "Conversation must contain at least one line".to_string(),
            ));
        }

        if let Some(index) = lines.iter().position(|l| l.text.trim().is_empty()) {
            return Err(TtsServiceError::Invalid(format!(
                "Line {} has no text",
                index + 1
            )));
        }

        if speaker_a.name.trim().is_empty() || speaker_b.name.trim().is_empty() {
            return Err(TtsServiceError::Invalid(
                "Both speakers need a name".to_string(),
            ));
        }

        if speaker_a.name.trim() == speaker_b.name.trim() {
            return Err(TtsServiceError::Invalid(
                "Speakers must have different names".to_string(),
            ));
        }

        Ok(())
    }

    fn finish(
        &self,
        results: Vec<SynthesisResult>,
        char_count: usize,
    ) -> Result<TtsSynthesisResult, TtsServiceError> {
        let unit_count = results.len();
        let skipped_units = results.iter().filter(|r| r.buffer.is_none()).count();

        if skipped_units > 0 {
            tracing::warn!(
                skipped = skipped_units,
                total = unit_count,
                "Some units produced no audio and were left out"
            );
        }

        let audio_data = assemble(results)?;
        let duration_seconds = duration_seconds(audio_data.len());

        tracing::info!(
            unit_count = unit_count,
            skipped_units = skipped_units,
            char_count = char_count,
            audio_size_bytes = audio_data.len(),
            duration_seconds = format!("{:.2}", duration_seconds),
            "TTS synthesis completed"
        );

        Ok(TtsSynthesisResult {
            audio_data,
            unit_count,
            skipped_units,
            char_count,
            duration_seconds,
        })
    }
}
