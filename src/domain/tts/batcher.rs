use super::model::{ConversationLine, DialogueBatch};
use super::segmenter::segment;

/// Break oversized lines into several lines for the same speaker.
///
/// Lines within `safe_chunk_size` pass through untouched.
pub fn normalize(lines: &[ConversationLine], safe_chunk_size: usize) -> Vec<ConversationLine> {
    let mut normalized = Vec::with_capacity(lines.len());

    for line in lines {
        if line.char_len() > safe_chunk_size {
            let pieces = segment(&line.text, safe_chunk_size);
            tracing::debug!(
                speaker = ?line.speaker,
                line_length = line.char_len(),
                pieces = pieces.len(),
                "Oversized dialogue line split"
            );
            normalized.extend(
                pieces
                    .into_iter()
                    .map(|chunk| ConversationLine::new(line.speaker, chunk.text)),
            );
        } else {
            normalized.push(line.clone());
        }
    }

    normalized
}

/// Greedily pack consecutive lines into request-sized batches.
///
/// Each line costs its length plus `per_line_overhead`. A batch is closed
/// before a line would push it past `max_chars_per_batch`, but a fresh batch
/// always takes its first line whatever its size.
pub fn batch(
    lines: &[ConversationLine],
    max_chars_per_batch: usize,
    per_line_overhead: usize,
) -> Vec<DialogueBatch> {
    let mut batches = Vec::new();
    let mut current: Vec<ConversationLine> = Vec::new();
    let mut current_size = 0;

    for line in lines {
        let line_size = line.char_len() + per_line_overhead;

        if !current.is_empty() && current_size + line_size > max_chars_per_batch {
            batches.push(DialogueBatch {
                ordinal: batches.len(),
                lines: std::mem::take(&mut current),
                estimated_chars: current_size,
            });
            current_size = 0;
        }

        current.push(line.clone());
        current_size += line_size;
    }

    if !current.is_empty() {
        batches.push(DialogueBatch {
            ordinal: batches.len(),
            lines: current,
            estimated_chars: current_size,
        });
    }

    batches
}
