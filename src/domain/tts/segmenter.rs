use super::model::TextChunk;
use regex::Regex;
use std::sync::OnceLock;

fn sentence_end() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("valid sentence pattern"))
}

/// Split text into sentence-like units, keeping trailing whitespace attached.
///
/// Concatenating the units reproduces the input exactly.
fn sentence_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut last_end = 0;

    for mat in sentence_end().find_iter(text) {
        units.push(&text[last_end..mat.end()]);
        last_end = mat.end();
    }

    if last_end < text.len() {
        units.push(&text[last_end..]);
    }

    units
}

/// Split a unit that is too long on its own into `max_chars` slices
fn hard_split(unit: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = unit.chars().collect();
    chars
        .chunks(max_chars)
        .map(|slice| slice.iter().collect())
        .collect()
}

/// Split text into ordered chunks of at most `max_chars` characters.
///
/// Sentence boundaries are preferred. A sentence longer than the budget is cut
/// into fixed-size slices with no regard for word boundaries. Chunks keep the
/// source whitespace verbatim, so joining them gives back the input.
pub fn segment(text: &str, max_chars: usize) -> Vec<TextChunk> {
    let max_chars = max_chars.max(1);

    if text.is_empty() {
        return Vec::new();
    }

    let mut pieces: Vec<String> = Vec::new();

    if text.chars().count() <= max_chars {
        pieces.push(text.to_string());
    } else {
        let mut running = String::new();
        let mut running_len = 0;

        for unit in sentence_units(text) {
            let unit_len = unit.chars().count();

            if unit_len > max_chars {
                if !running.is_empty() {
                    pieces.push(std::mem::take(&mut running));
                    running_len = 0;
                }
                pieces.extend(hard_split(unit, max_chars));
            } else if running_len + unit_len <= max_chars {
                running.push_str(unit);
                running_len += unit_len;
            } else {
                pieces.push(std::mem::replace(&mut running, unit.to_string()));
                running_len = unit_len;
            }
        }

        if !running.is_empty() {
            pieces.push(running);
        }
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| TextChunk { text, ordinal })
        .collect()
}
