//! Playback duration of synthesized audio
//!
//! Duration is read from the encoded file itself, never estimated from
//! text length.

use super::SynthesisError;
use std::path::Path;

/// Playback length of a WAV file in milliseconds, rounded to nearest
pub fn wav_duration_ms(path: &Path) -> Result<u64, SynthesisError> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        SynthesisError::error(format!("Cannot read audio file {}: {e}", path.display()))
    })?;

    let sample_rate = u64::from(reader.spec().sample_rate);
    if sample_rate == 0 {
        return Err(SynthesisError::error("Audio file reports a zero sample rate"));
    }

    // `duration` is the number of samples per channel
    let frames = u64::from(reader.duration());
    Ok((frames * 1000 + sample_rate / 2) / sample_rate)
}
