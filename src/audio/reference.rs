//! Reference-sample conditioning for voice cloning.
//!
//! The cloning endpoint expects a short mono 16 kHz WAV prompt. User uploads
//! arrive in arbitrary formats and lengths, so the sample is decoded,
//! trimmed to at most ten seconds, resampled with a sinc resampler, and
//! re-encoded as 16-bit PCM WAV before registration.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::audio::decode::decode_audio_bytes;
use crate::audio::wav::encode_wav_samples;
use crate::config::WeibocastConfig;
use crate::error::{Result, WeibocastError};

/// Prepares an uploaded audio sample for clone registration.
///
/// Returns mono 16-bit PCM WAV bytes at `config.reference_sample_rate`,
/// trimmed to `config.reference_max_secs`.
pub fn prepare_reference_audio(data: &[u8], config: &WeibocastConfig) -> Result<Vec<u8>> {
    let (mut samples, source_rate) = decode_audio_bytes(data)?;

    let max_samples = (config.reference_max_secs * source_rate as f32) as usize;
    if samples.len() > max_samples {
        log::info!(
            "Trimming reference sample from {:.1}s to {:.1}s",
            samples.len() as f32 / source_rate as f32,
            config.reference_max_secs
        );
        samples.truncate(max_samples);
    }

    let target_rate = config.reference_sample_rate;
    let resampled = if source_rate == target_rate {
        samples
    } else {
        resample(&samples, source_rate, target_rate)?
    };

    Ok(encode_wav_samples(&resampled, target_rate))
}

/// Resamples mono audio with rubato's sinc interpolator.
fn resample(input: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let ratio = f64::from(target_rate) / f64::from(source_rate);
    let block_size = 512;

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, block_size, 1)
        .map_err(|e| WeibocastError::AudioProcessing(format!("Resampler init failed: {}", e)))?;

    let expected_len = (input.len() as f64 * ratio) as usize;
    let mut output = Vec::with_capacity(expected_len + block_size);

    // SincFixedIn consumes exactly block_size frames per call; the final
    // partial block is zero-padded.
    let mut idx = 0;
    while idx < input.len() {
        let chunk_size = (input.len() - idx).min(block_size);
        let mut block = vec![0.0_f32; block_size];
        block[..chunk_size].copy_from_slice(&input[idx..idx + chunk_size]);

        let frames = resampler
            .process(&[block], None)
            .map_err(|e| WeibocastError::AudioProcessing(format!("Resampling failed: {}", e)))?;
        output.extend_from_slice(&frames[0]);
        idx += chunk_size;
    }

    output.truncate(expected_len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn resample_halves_sample_count() {
        let input = sine(440.0, 1.0, 32000);
        let output = resample(&input, 32000, 16000).unwrap();
        // Allow slack for the resampler's transient response.
        let expected = input.len() / 2;
        assert!(
            (output.len() as i64 - expected as i64).abs() <= 256,
            "got {} samples, expected ~{}",
            output.len(),
            expected
        );
    }

    #[test]
    fn prepared_reference_is_wav_at_target_rate() {
        let config = WeibocastConfig::default();
        let wav = encode_wav_samples(&sine(440.0, 0.5, 44100), 44100);

        let prepared = prepare_reference_audio(&wav, &config).unwrap();
        assert_eq!(&prepared[0..4], b"RIFF");
        let rate = u32::from_le_bytes([prepared[24], prepared[25], prepared[26], prepared[27]]);
        assert_eq!(rate, config.reference_sample_rate);
    }

    #[test]
    fn long_samples_are_trimmed() {
        let config = WeibocastConfig {
            reference_max_secs: 1.0,
            ..WeibocastConfig::default()
        };
        // 3 seconds at the target rate already, so no resampling happens.
        let wav = encode_wav_samples(&sine(200.0, 3.0, 16000), 16000);

        let prepared = prepare_reference_audio(&wav, &config).unwrap();
        let data_len =
            u32::from_le_bytes([prepared[40], prepared[41], prepared[42], prepared[43]]) as usize;
        assert_eq!(data_len, 16000 * 2); // one second of i16 samples
    }
}
