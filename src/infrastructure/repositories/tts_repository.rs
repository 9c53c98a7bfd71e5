use crate::domain::tts::{SpeakerConfig, TransportError, VoiceName};
use async_trait::async_trait;

/// Remote speech-synthesis endpoint.
///
/// Implementations make exactly one request per call and never retry; retry,
/// throttling and reassembly belong to the caller. Audio comes back as raw
/// 16-bit little-endian mono PCM.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize `text` with a single prebuilt voice
    async fn synthesize_single(&self, text: &str, voice: VoiceName)
        -> Result<Vec<u8>, TransportError>;

    /// Synthesize a two-speaker script.
    ///
    /// The speaker names in `speakers` must match the names used in `script`.
    async fn synthesize_multi(
        &self,
        script: &str,
        speakers: &[SpeakerConfig; 2],
    ) -> Result<Vec<u8>, TransportError>;
}
