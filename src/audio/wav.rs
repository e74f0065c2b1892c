//! PCM/WAV codec and byte-encoding helpers.
//!
//! Synthesis backends return audio in whatever shape suits them: raw PCM,
//! base64 payloads, or hex strings. This module converts those encodings to
//! raw bytes and wraps finished 16-bit little-endian mono PCM in a canonical
//! 44-byte WAV header.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Result, WeibocastError};

/// Length of the canonical WAV header produced by [`encode_wav`].
pub const WAV_HEADER_LEN: usize = 44;

const NUM_CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Wraps raw 16-bit little-endian mono PCM bytes in a WAV container.
///
/// The header is the canonical 44-byte RIFF/WAVE layout: `fmt ` subchunk
/// with `AudioFormat=1`, one channel, the given sample rate and computed
/// `ByteRate`/`BlockAlign`, followed by a `data` subchunk sized to the
/// payload.
pub fn encode_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let byte_rate = sample_rate * u32::from(NUM_CHANNELS) * u32::from(BITS_PER_SAMPLE) / 8;
    let block_align = NUM_CHANNELS * BITS_PER_SAMPLE / 8;
    let data_size = pcm.len() as u32;
    let chunk_size = 36 + data_size;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&chunk_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // Subchunk1Size for PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // AudioFormat: PCM
    out.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

/// Converts float samples in [-1.0, 1.0] to 16-bit PCM and wraps them in a
/// WAV container.
pub fn encode_wav_samples(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        pcm.extend_from_slice(&float_to_i16(sample).to_le_bytes());
    }
    encode_wav(&pcm, sample_rate)
}

/// Standard float-to-i16 conversion with clamping.
pub fn float_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Seconds of audio represented by `sample_count` mono samples.
pub fn duration_in_seconds(sample_count: usize, sample_rate: u32) -> f64 {
    sample_count as f64 / f64::from(sample_rate)
}

/// Decodes a base64 payload into raw bytes.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| WeibocastError::AudioProcessing(format!("Invalid base64 payload: {}", e)))
}

/// Encodes raw bytes as base64.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes a hex string (pairs of hex digits) into raw bytes.
///
/// Malformed or empty input yields empty output rather than an error.
pub fn decode_hex(data: &str) -> Vec<u8> {
    let data = data.trim();
    if data.is_empty() {
        return Vec::new();
    }

    let digits: Vec<u8> = data.bytes().collect();
    let mut out = Vec::with_capacity(digits.len() / 2 + 1);
    for pair in digits.chunks(2) {
        let text = match std::str::from_utf8(pair) {
            Ok(text) => text,
            Err(_) => return Vec::new(),
        };
        match u8::from_str_radix(text, 16) {
            Ok(byte) => out.push(byte),
            Err(_) => return Vec::new(),
        }
    }
    out
}
