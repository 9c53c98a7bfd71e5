use super::error::TtsServiceError;
use super::model::{ConversationLine, SpeakerSlot};
use regex::Regex;
use std::sync::OnceLock;

fn speaker_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([^:\s][^:]{0,39}?)\s*:\s*(.*)$").expect("valid speaker pattern")
    })
}

/// Dialogue recovered from a pasted `Name: text` script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript {
    pub lines: Vec<ConversationLine>,
    pub speaker_a: String,
    pub speaker_b: Option<String>,
}

/// Parse a pasted script into conversation lines.
///
/// The first name seen becomes speaker A and the second speaker B. Lines
/// without a `Name:` prefix continue the previous line.
pub fn parse_script(script: &str) -> Result<ParsedScript, TtsServiceError> {
    let mut names: Vec<String> = Vec::new();
    let mut lines: Vec<ConversationLine> = Vec::new();

    for (number, raw) in script.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }

        match speaker_prefix().captures(raw) {
            Some(caps) => {
                let name = caps[1].trim().to_string();
                let text = caps[2].trim().to_string();

                let slot = match names.iter().position(|n| *n == name) {
                    Some(0) => SpeakerSlot::A,
                    Some(_) => SpeakerSlot::B,
                    None if names.len() < 2 => {
                        names.push(name);
                        if names.len() == 1 {
                            SpeakerSlot::A
                        } else {
                            SpeakerSlot::B
                        }
                    }
                    None => {
                        return Err(TtsServiceError::Invalid(format!(
                            "line {}: only two speakers are supported, found a third: {}",
                            number + 1,
                            name
                        )))
                    }
                };

                lines.push(ConversationLine::new(slot, text));
            }
            None => match lines.last_mut() {
                Some(previous) => {
                    if !previous.text.is_empty() {
                        previous.text.push(' ');
                    }
                    previous.text.push_str(raw.trim());
                }
                None => {
                    return Err(TtsServiceError::Invalid(format!(
                        "line {}: expected 'Name: text'",
                        number + 1
                    )))
                }
            },
        }
    }

    if let Some(position) = lines.iter().position(|l| l.text.trim().is_empty()) {
        return Err(TtsServiceError::Invalid(format!(
            "dialogue line {} has no text",
            position + 1
        )));
    }

    let mut names = names.into_iter();
    let speaker_a = names
        .next()
        .ok_or_else(|| TtsServiceError::Invalid("script contains no dialogue".to_string()))?;

    Ok(ParsedScript {
        lines,
        speaker_a,
        speaker_b: names.next(),
    })
}
