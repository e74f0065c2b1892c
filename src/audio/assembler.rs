//! Audio assembly.
//!
//! Decodes the per-utterance synthesis buffers in script order, accumulates
//! the speaker timeline from decoded durations, and concatenates everything
//! into one mono 16-bit WAV track.
//!
//! A segment that fails to decode is excluded from both the timeline and the
//! concatenation, so the remaining segments stay contiguous. Segments are
//! not resampled: the output uses the sample rate of the first decoded
//! segment, and a rate mismatch later in the list is logged as a warning.

use crate::audio::decode::decode_audio_bytes;
use crate::audio::wav::{duration_in_seconds, encode_wav_samples};
use crate::error::{Result, WeibocastError};
use crate::events::EventBus;
use crate::types::{SynthesisResult, TimelineSegment};

/// Assembled output: the WAV track plus its speaker timeline.
#[derive(Debug, Clone)]
pub struct AssembledTrack {
    /// Mono 16-bit PCM in a WAV container
    pub audio: Vec<u8>,
    pub timeline: Vec<TimelineSegment>,
    /// Sample rate of the output track (taken from the first decoded segment)
    pub sample_rate: u32,
}

/// Concatenates synthesis results into one track and derives the timeline.
///
/// Fails with [`WeibocastError::ConcatenationFailed`] when no segment
/// decodes successfully.
pub fn assemble(results: &[SynthesisResult], events: &EventBus) -> Result<AssembledTrack> {
    let mut samples: Vec<f32> = Vec::new();
    let mut timeline: Vec<TimelineSegment> = Vec::new();
    let mut output_rate: Option<u32> = None;
    let mut running_time = 0.0_f64;

    for (i, result) in results.iter().enumerate() {
        let (decoded, rate) = match decode_audio_bytes(&result.buffer) {
            Ok(decoded) => decoded,
            Err(e) => {
                events.warning(format!(
                    "Failed to decode audio segment {} ({}): {}. Timeline may be out of sync.",
                    i + 1,
                    result.speaker,
                    e
                ));
                continue;
            }
        };

        let track_rate = *output_rate.get_or_insert(rate);
        if rate != track_rate {
            // Accepted limitation: mixed rates are concatenated as-is.
            events.warning(format!(
                "Segment {} has sample rate {} Hz, track uses {} Hz; not resampling.",
                i + 1,
                rate,
                track_rate
            ));
        }

        let duration = duration_in_seconds(decoded.len(), rate);
        timeline.push(TimelineSegment {
            speaker: result.speaker,
            start_time: running_time,
            end_time: running_time + duration,
        });
        running_time += duration;
        samples.extend_from_slice(&decoded);
    }

    let sample_rate = output_rate.ok_or_else(|| {
        WeibocastError::ConcatenationFailed(format!(
            "No valid audio segments out of {} input buffers",
            results.len()
        ))
    })?;

    log::info!(
        "Assembled {} segments into {:.2}s of audio at {} Hz",
        timeline.len(),
        running_time,
        sample_rate
    );

    Ok(AssembledTrack {
        audio: encode_wav_samples(&samples, sample_rate),
        timeline,
        sample_rate,
    })
}
