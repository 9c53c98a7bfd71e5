use super::error::TtsServiceError;
use super::model::SynthesisResult;

/// Concatenate the present buffers, in order, into one PCM stream.
///
/// Results must arrive with strictly increasing ordinals; anything else is
/// rejected rather than reordered.
pub fn assemble(results: Vec<SynthesisResult>) -> Result<Vec<u8>, TtsServiceError> {
    if let Some(pair) = results.windows(2).find(|pair| pair[0].ordinal >= pair[1].ordinal) {
        return Err(anyhow::anyhow!(
            "audio parts out of order: ordinal {} followed by {}",
            pair[0].ordinal,
            pair[1].ordinal
        )
        .into());
    }

    let total: usize = results
        .iter()
        .filter_map(|r| r.buffer.as_ref())
        .map(Vec::len)
        .sum();
    let present = results.iter().filter(|r| r.buffer.is_some()).count();

    if present == 0 {
        return Err(TtsServiceError::NoAudio(format!(
            "none of the {} parts produced audio",
            results.len()
        )));
    }

    let mut merged = Vec::with_capacity(total);
    for buffer in results.into_iter().filter_map(|r| r.buffer) {
        merged.extend(buffer);
    }

    tracing::debug!(
        parts = present,
        audio_size = merged.len(),
        "Audio parts assembled"
    );

    Ok(merged)
}
