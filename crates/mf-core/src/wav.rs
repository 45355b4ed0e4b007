//! WAV container framing for raw PCM returned by the speech model.
//!
//! The provider streams bare little-endian PCM with no container; playback
//! needs a fully self-describing file, so the 44-byte RIFF/WAVE header is
//! written here byte-for-byte.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

/// Fixed output format of the speech model: 24 kHz, mono, 16-bit.
pub const TTS_SPEC: WavSpec = WavSpec {
    channels: 1,
    sample_rate: 24_000,
    bits_per_sample: 16,
};

/// Frame raw PCM bytes into a complete WAV file.
///
/// Layout (all multi-byte fields little-endian):
/// bytes 0-3 "RIFF", 4-7 fileSize=36+dataSize, 8-11 "WAVE", 12-15 "fmt ",
/// 16-19 16, 20-21 1 (PCM), 22-23 channels, 24-27 sample rate, 28-31 byte
/// rate, 32-33 block align, 34-35 bits per sample, 36-39 "data",
/// 40-43 dataSize, 44.. payload.
pub fn wrap_pcm(pcm: &[u8], spec: WavSpec) -> Vec<u8> {
    let data_size = pcm.len() as u32;
    let byte_rate = spec.sample_rate * u32::from(spec.channels) * u32::from(spec.bits_per_sample) / 8;
    let block_align = spec.channels * spec.bits_per_sample / 8;

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&spec.channels.to_le_bytes());
    out.extend_from_slice(&spec.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&spec.bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}
