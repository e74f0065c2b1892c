//! Container-agnostic audio decoding.
//!
//! Synthesis backends return WAV, MP3 or other containers depending on the
//! endpoint; the assembler must tolerate any of them. Decoding goes through
//! symphonia's format probe, so the container is detected from the bytes
//! themselves. Multichannel audio keeps only the first channel.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::probe::Hint;

use crate::error::{Result, WeibocastError};

/// Decodes an encoded audio buffer into mono f32 PCM at its native sample rate.
pub fn decode_audio_bytes(data: &[u8]) -> Result<(Vec<f32>, u32)> {
    if data.is_empty() {
        return Err(WeibocastError::AudioProcessing(
            "Empty audio buffer".to_string(),
        ));
    }

    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let format_opts = FormatOptions {
        enable_gapless: false,
        ..Default::default()
    };

    let probed = symphonia::default::get_probe()
        .format(&Hint::new(), mss, &format_opts, &Default::default())
        .map_err(|e| WeibocastError::AudioProcessing(format!("Unrecognized audio format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| WeibocastError::AudioProcessing("No audio track found".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| WeibocastError::AudioProcessing(format!("Failed to create decoder: {}", e)))?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let channels = track.codec_params.channels.unwrap_or_default().count();

    let mut pcm_data = Vec::new();

    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let mut sample_buf =
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                sample_buf.copy_planar_ref(decoded);
                let samples = sample_buf.samples();

                if channels > 1 {
                    // Planar layout: the first channel's samples lead the buffer.
                    let frames_per_channel = samples.len() / channels;
                    pcm_data.extend_from_slice(&samples[..frames_per_channel]);
                } else {
                    pcm_data.extend_from_slice(samples);
                }
            }
            Err(e) => {
                log::warn!("Skipping undecodable packet: {}", e);
                continue;
            }
        }
    }

    if pcm_data.is_empty() {
        return Err(WeibocastError::AudioProcessing(
            "No audio frames decoded".to_string(),
        ));
    }

    log::debug!(
        "Decoded {} samples at {} Hz from {} input bytes",
        pcm_data.len(),
        sample_rate,
        data.len()
    );
    Ok((pcm_data, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::encode_wav_samples;

    fn sine(freq: f32, secs: f32, rate: u32) -> Vec<f32> {
        let n = (secs * rate as f32) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / rate as f32;
                (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn decodes_canonical_wav_bytes() {
        let samples = sine(440.0, 0.25, 16000);
        let wav = encode_wav_samples(&samples, 16000);

        let (decoded, rate) = decode_audio_bytes(&wav).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(decoded.len(), samples.len());
        for (a, b) in samples.iter().zip(decoded.iter()) {
            assert!((a - b).abs() < 1e-3, "sample mismatch: {} vs {}", a, b);
        }
    }

    #[test]
    fn stereo_input_keeps_first_channel() {
        let rate = 16000u32;
        let frames = 1600usize;
        // Interleaved 16-bit stereo: left at +0.5, right at -0.5.
        let mut pcm = Vec::with_capacity(frames * 4);
        for _ in 0..frames {
            pcm.extend_from_slice(&16384i16.to_le_bytes());
            pcm.extend_from_slice(&(-16384i16).to_le_bytes());
        }

        let mut wav = Vec::with_capacity(44 + pcm.len());
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + pcm.len() as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&rate.to_le_bytes());
        wav.extend_from_slice(&(rate * 4).to_le_bytes());
        wav.extend_from_slice(&4u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(pcm.len() as u32).to_le_bytes());
        wav.extend_from_slice(&pcm);

        let (decoded, out_rate) = decode_audio_bytes(&wav).unwrap();
        assert_eq!(out_rate, rate);
        assert_eq!(decoded.len(), frames);
        for sample in &decoded {
            assert!(
                (sample - 0.5).abs() < 1e-2,
                "expected the left channel, got {}",
                sample
            );
        }
    }

    #[test]
    fn rejects_empty_buffer() {
        assert!(matches!(
            decode_audio_bytes(&[]),
            Err(WeibocastError::AudioProcessing(_))
        ));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let garbage = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02, 0x03];
        assert!(decode_audio_bytes(&garbage).is_err());
    }
}
