//! Core data types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Speaker role of one dialogue line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    Host,
    Guest,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Host => "Host",
            Speaker::Guest => "Guest",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One speaker-attributed line of dialogue extracted from a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: Speaker,
    pub text: String,
}

/// Raw audio returned by a synthesis backend for one utterance.
/// Held only until the track is assembled.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub speaker: Speaker,
    /// Encoded audio bytes in whatever container the backend produced
    pub buffer: Vec<u8>,
    /// Remote URL the audio was downloaded from, when the backend returned one
    pub source_url: Option<String>,
}

/// One time-stamped speaker span of the assembled track, in seconds.
///
/// Segments are contiguous: each segment's `start_time` equals the previous
/// segment's `end_time`, and the first segment starts at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub speaker: Speaker,
    #[serde(rename = "startTime")]
    pub start_time: f64,
    #[serde(rename = "endTime")]
    pub end_time: f64,
}

/// Final record of one successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastResult {
    pub id: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub title: String,
    /// Raw generated script text
    pub script: String,
    /// Assembled track: mono 16-bit PCM in a WAV container.
    /// Not part of the JSON record; the caller materializes a playable URL
    /// from these bytes (and must re-create it after a reload).
    #[serde(skip)]
    pub audio: Vec<u8>,
    #[serde(rename = "audioUrl", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub timeline: Vec<TimelineSegment>,
    #[serde(rename = "guestName")]
    pub guest_name: String,
}

/// Pipeline state machine.
///
/// `Error` is terminal and reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    Idle,
    Scraping,
    ScriptGeneration,
    AudioGeneration,
    Completed,
    Error,
}
