//! MiniMax speech API client.
//!
//! Three endpoints are used: `/files/upload` registers a reference sample
//! for cloning, `/t2a_v2` is standard preset-voice TTS, `/voice_clone`
//! synthesizes with a cloned voice. Every request carries the group id as a
//! query parameter and a bearer token.
//!
//! MiniMax reports most failures inside a `base_resp` object with HTTP 200,
//! so each response body is checked before the audio is extracted. Clone
//! responses vary in shape: a `demo_audio` URL (preferred), a legacy
//! `data.audio_file_url`, or `data.audio` hex.

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::WeibocastConfig;
use crate::error::{Result, WeibocastError};
use crate::tts::{SpeechSynthesizer, SynthesisPayload, SynthesizedAudio};

const MINIMAX_BASE_URL: &str = "https://api.minimaxi.com/v1";

pub struct MiniMaxClient {
    client: Client,
    base_url: String,
    api_key: String,
    group_id: String,
    model: String,
    sample_rate: u32,
}

impl MiniMaxClient {
    pub fn new(config: &WeibocastConfig) -> Result<Self> {
        Self::with_base_url(config, MINIMAX_BASE_URL)
    }

    /// Client against a non-default endpoint, for tests and proxies.
    pub fn with_base_url(config: &WeibocastConfig, base_url: &str) -> Result<Self> {
        if !config.has_minimax_credentials() {
            return Err(WeibocastError::Configuration(
                "MiniMax API key and group id are required for audio generation".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.minimax_api_key.trim().to_string(),
            group_id: config.minimax_group_id.trim().to_string(),
            model: config.tts_model.clone(),
            sample_rate: config.tts_sample_rate,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}?GroupId={}", self.base_url, path, self.group_id)
    }

    /// Checks the MiniMax in-band status object; an HTTP 200 with a non-zero
    /// `base_resp.status_code` is still an API error.
    fn check_base_resp(json: &Value) -> Result<()> {
        if let Some(base_resp) = json.get("base_resp") {
            let code = base_resp
                .get("status_code")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            if code != 0 {
                let msg = base_resp
                    .get("status_msg")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Err(WeibocastError::TtsGeneration(format!(
                    "MiniMax API error {}: {}",
                    code, msg
                )));
            }
        }
        Ok(())
    }

    fn field_as_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    async fn post_json(&self, url: &str, payload: &Value, context: &str) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| WeibocastError::TtsGeneration(format!("{} request failed: {}", context, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeibocastError::TtsGeneration(format!("{} response unreadable: {}", context, e)))?;

        if !status.is_success() {
            return Err(WeibocastError::TtsGeneration(format!(
                "{} failed (status {}): {}",
                context, status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeibocastError::TtsGeneration(format!("{} returned invalid JSON: {}", context, e))
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for MiniMaxClient {
    async fn register_reference(&self, sample: &[u8], file_name: &str) -> Result<String> {
        let url = self.endpoint("files/upload");
        log::info!(
            "Uploading reference sample {} ({} bytes) to MiniMax",
            file_name,
            sample.len()
        );

        let part = multipart::Part::bytes(sample.to_vec())
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| WeibocastError::CloneRegistration(e.to_string()))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("purpose", "prompt_audio");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| WeibocastError::CloneRegistration(format!("Upload failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeibocastError::CloneRegistration(format!("Upload response unreadable: {}", e)))?;

        if !status.is_success() {
            return Err(WeibocastError::CloneRegistration(format!(
                "Upload failed (status {}): {}",
                status, body
            )));
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            WeibocastError::CloneRegistration(format!("Upload returned invalid JSON: {}", e))
        })?;
        Self::check_base_resp(&json)
            .map_err(|e| WeibocastError::CloneRegistration(e.to_string()))?;

        // file_id lives either under `file` or at the top level.
        json.get("file")
            .and_then(|f| f.get("file_id"))
            .or_else(|| json.get("file_id"))
            .and_then(Self::field_as_string)
            .ok_or_else(|| {
                WeibocastError::CloneRegistration(
                    "Invalid response from MiniMax: missing file_id".to_string(),
                )
            })
    }

    async fn synthesize_preset(&self, text: &str, voice_id: &str) -> Result<SynthesizedAudio> {
        let url = self.endpoint("t2a_v2");
        let payload = serde_json::json!({
            "model": self.model,
            "text": text,
            "stream": false,
            "voice_setting": {
                "voice_id": voice_id,
                "speed": 1,
                "vol": 1,
                "pitch": 0,
                "emotion": "happy"
            },
            "audio_setting": {
                "sample_rate": self.sample_rate,
                "bitrate": 128000,
                "format": "mp3",
                "channel": 1
            }
        });

        let json = self.post_json(&url, &payload, "MiniMax TTS").await?;
        Self::check_base_resp(&json)?;

        let hex = json
            .get("data")
            .and_then(|d| d.get("audio"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                WeibocastError::TtsGeneration("MiniMax response missing audio data".to_string())
            })?;

        SynthesisPayload::HexEncoded(hex.to_string())
            .resolve(&self.client)
            .await
    }

    async fn synthesize_clone(&self, text: &str, reference: &str) -> Result<SynthesizedAudio> {
        let url = self.endpoint("voice_clone");
        let voice_id = format!("voice_clone_{}", chrono::Utc::now().timestamp_millis());
        let payload = serde_json::json!({
            "file_id": reference,
            "voice_id": voice_id,
            "text": text,
            "model": self.model,
            "need_noise_reduction": false,
            "need_volume_normalization": false,
            "aigc_watermark": false
        });

        let json = self.post_json(&url, &payload, "MiniMax voice clone").await?;
        Self::check_base_resp(&json)?;

        // Response shape varies by model: demo_audio URL is preferred, then
        // the legacy data.audio_file_url, then hex audio data.
        if let Some(demo_url) = json.get("demo_audio").and_then(Value::as_str) {
            return SynthesisPayload::RemoteUrl(demo_url.to_string())
                .resolve(&self.client)
                .await;
        }
        if let Some(file_url) = json
            .get("data")
            .and_then(|d| d.get("audio_file_url"))
            .and_then(Value::as_str)
        {
            return SynthesisPayload::RemoteUrl(file_url.to_string())
                .resolve(&self.client)
                .await;
        }
        if let Some(hex) = json
            .get("data")
            .and_then(|d| d.get("audio"))
            .and_then(Value::as_str)
        {
            return SynthesisPayload::HexEncoded(hex.to_string())
                .resolve(&self.client)
                .await;
        }

        let keys: Vec<&str> = json
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        Err(WeibocastError::TtsGeneration(format!(
            "MiniMax did not return audio data. Response keys: {}",
            keys.join(", ")
        )))
    }
}
