//! Library configuration.
//!
//! All credentials and voice identifiers are passed in explicitly; the
//! library never reads ambient/global state.

use serde::{Deserialize, Serialize};

/// Configuration for the podcast generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeibocastConfig {
    /// MiniMax API key (TTS and voice cloning)
    pub minimax_api_key: String,
    /// MiniMax group id, sent as a query parameter on every request
    pub minimax_group_id: String,
    /// DashScope API key (script generation)
    pub dashscope_api_key: String,
    /// Bailian application id (script generation)
    pub bailian_app_id: String,
    /// MiniMax speech model
    pub tts_model: String,
    /// Preset voice for the host role
    pub host_voice: String,
    /// Preset voice the guest falls back to when cloning is unavailable
    pub guest_preset_voice: String,
    /// Sample rate requested from the preset TTS endpoint
    pub tts_sample_rate: u32,
    /// Bound on every network call; a hung call is treated as a failure
    pub request_timeout_secs: u64,
    /// Source text is truncated to this many characters before prompting
    pub max_prompt_chars: usize,
    /// Sample rate the clone reference sample is resampled to
    pub reference_sample_rate: u32,
    /// Reference samples longer than this are trimmed
    pub reference_max_secs: f32,
    /// Delay between simulated scraping steps, in milliseconds
    pub scrape_step_delay_ms: u64,
}

impl Default for WeibocastConfig {
    fn default() -> Self {
        Self {
            minimax_api_key: String::new(),
            minimax_group_id: String::new(),
            dashscope_api_key: String::new(),
            bailian_app_id: String::new(),
            tts_model: "speech-2.6-hd".to_string(),
            host_voice: "Chinese (Mandarin)_Soft_Girl".to_string(),
            guest_preset_voice: "female-shaonv".to_string(),
            tts_sample_rate: 32000,
            request_timeout_secs: 300,
            max_prompt_chars: 5000,
            reference_sample_rate: 16000,
            reference_max_secs: 10.0,
            scrape_step_delay_ms: 400,
        }
    }
}

impl WeibocastConfig {
    /// Whether the MiniMax credentials required for any audio generation are present.
    pub fn has_minimax_credentials(&self) -> bool {
        !self.minimax_api_key.trim().is_empty() && !self.minimax_group_id.trim().is_empty()
    }
}
