use super::voice::VoiceName;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Work item that carries its position in the final audio stream
pub trait Sequenced {
    fn ordinal(&self) -> usize;
}

/// Size-bounded slice of the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub ordinal: usize,
}

impl Sequenced for TextChunk {
    fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Dialogue participant, independent of the display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeakerSlot {
    #[serde(rename = "A", alias = "Speaker A")]
    A,
    #[serde(rename = "B", alias = "Speaker B")]
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLine {
    pub speaker: SpeakerSlot,
    pub text: String,
}

impl ConversationLine {
    pub fn new(speaker: SpeakerSlot, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerConfig {
    pub name: String,
    pub voice: VoiceName,
}

impl SpeakerConfig {
    pub fn new(name: impl Into<String>, voice: VoiceName) -> Self {
        Self {
            name: name.into(),
            voice,
        }
    }
}

/// Consecutive dialogue lines that go out in a single request.
///
/// Never empty. `estimated_chars` only exceeds the batch budget when the
/// batch holds a single oversized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueBatch {
    pub ordinal: usize,
    pub lines: Vec<ConversationLine>,
    pub estimated_chars: usize,
}

impl Sequenced for DialogueBatch {
    fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Outcome of one unit of work; `buffer` is `None` when the unit was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    pub ordinal: usize,
    pub buffer: Option<Vec<u8>>,
}

/// Tunables for chunking, batching, throttling and retrying
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisSettings {
    pub max_chars_per_batch: usize,
    pub per_line_overhead: usize,
    pub prompt_overhead: usize,
    pub inter_item_delay: Duration,
    pub base_retry_delay: Duration,
    pub max_retries: u32,
    pub max_input_chars: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            max_chars_per_batch: 120,
            per_line_overhead: 30,
            prompt_overhead: 30,
            inter_item_delay: Duration::from_millis(2000),
            base_retry_delay: Duration::from_millis(2000),
            max_retries: 3,
            max_input_chars: 10_000,
        }
    }
}

impl SynthesisSettings {
    /// Largest line a conversation can carry once the prompt wrapper is accounted for
    pub fn safe_line_chars(&self) -> usize {
        self.max_chars_per_batch
            .saturating_sub(self.prompt_overhead)
            .max(1)
    }
}
