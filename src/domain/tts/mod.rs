pub mod assembler;
pub mod batcher;
pub mod error;
pub mod model;
pub mod pcm;
pub mod retry;
pub mod script;
pub mod segmenter;
pub mod sequencer;
pub mod service;
pub mod sleeper;
pub mod voice;

pub use error::{ErrorCategory, TransportError, TtsServiceError};
pub use model::{
    ConversationLine, DialogueBatch, Sequenced, SpeakerConfig, SpeakerSlot, SynthesisResult,
    SynthesisSettings, TextChunk,
};
pub use script::{parse_script, ParsedScript};
pub use service::{TtsService, TtsServiceApi, TtsSynthesisResult};
pub use sleeper::{Sleeper, TokioSleeper};
pub use voice::VoiceName;
