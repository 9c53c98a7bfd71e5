use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tts_studio_backend::domain::tts::{Sleeper, SpeakerConfig, TransportError, VoiceName};
use tts_studio_backend::infrastructure::repositories::TtsRepository;

type Responder = Box<dyn Fn(usize, &str) -> Result<Vec<u8>, TransportError> + Send + Sync>;

/// One request seen by the scripted endpoint
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub voices: Vec<VoiceName>,
    pub speakers: Vec<String>,
}

/// Speech endpoint double answering from a closure keyed by call index
pub struct ScriptedSpeechEndpoint {
    calls: Mutex<Vec<RecordedCall>>,
    responder: Responder,
}

impl ScriptedSpeechEndpoint {
    pub fn new(
        responder: impl Fn(usize, &str) -> Result<Vec<u8>, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    /// Answers every call with four PCM bytes tagged by the call index
    pub fn tagged() -> Arc<Self> {
        Self::new(|index, _| Ok(tagged_pcm(index)))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn respond(&self, call: RecordedCall) -> Result<Vec<u8>, TransportError> {
        let (index, prompt) = {
            let mut calls = self.calls.lock();
            let prompt = call.prompt.clone();
            calls.push(call);
            (calls.len() - 1, prompt)
        };
        (self.responder)(index, &prompt)
    }
}

#[async_trait]
impl TtsRepository for ScriptedSpeechEndpoint {
    async fn synthesize_single(
        &self,
        text: &str,
        voice: VoiceName,
    ) -> Result<Vec<u8>, TransportError> {
        self.respond(RecordedCall {
            prompt: text.to_string(),
            voices: vec![voice],
            speakers: Vec::new(),
        })
    }

    async fn synthesize_multi(
        &self,
        script: &str,
        speakers: &[SpeakerConfig; 2],
    ) -> Result<Vec<u8>, TransportError> {
        self.respond(RecordedCall {
            prompt: script.to_string(),
            voices: speakers.iter().map(|s| s.voice).collect(),
            speakers: speakers.iter().map(|s| s.name.clone()).collect(),
        })
    }
}

/// Two 16-bit samples whose bytes carry the call index
pub fn tagged_pcm(index: usize) -> Vec<u8> {
    let tag = index as u8;
    vec![tag, 0, tag, 0]
}

/// Records sleeps without waiting
#[derive(Debug, Default)]
pub struct InstantSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl InstantSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}
