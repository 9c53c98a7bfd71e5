use std::io::Cursor;

/// Sample rate of the PCM returned by the speech endpoint
pub const SAMPLE_RATE_HZ: u32 = 24_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

const BYTES_PER_SAMPLE: usize = (BITS_PER_SAMPLE / 8) as usize;

/// Playback length of a 16-bit mono PCM buffer
pub fn duration_seconds(byte_len: usize) -> f32 {
    (byte_len / BYTES_PER_SAMPLE) as f32 / SAMPLE_RATE_HZ as f32
}

/// Wrap 16-bit little-endian mono PCM in a WAV container.
///
/// A dangling odd byte is dropped.
pub fn encode_wav(pcm: &[u8]) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE_HZ,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        let mut samples = writer.get_i16_writer((pcm.len() / BYTES_PER_SAMPLE) as u32);
        for pair in pcm.chunks_exact(BYTES_PER_SAMPLE) {
            samples.write_sample(i16::from_le_bytes([pair[0], pair[1]]));
        }
        samples.flush()?;
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}
