//! Speech synthesis services.

pub mod minimax;
pub mod orchestrator;

pub use minimax::MiniMaxClient;
pub use orchestrator::synthesize_utterances;

use async_trait::async_trait;
use reqwest::Client;

use crate::audio::wav::decode_hex;
use crate::error::{Result, WeibocastError};

/// Audio returned by one synthesis call, already resolved to raw bytes.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub buffer: Vec<u8>,
    /// Set when the backend handed out a download URL instead of inline data
    pub source_url: Option<String>,
}

/// The shapes a synthesis backend may return audio in.
///
/// Backends are duck-typed: the same endpoint can answer with inline bytes,
/// a download URL, or a hex-encoded string depending on the model. All three
/// are normalized to raw bytes here, before assembly.
#[derive(Debug, Clone)]
pub enum SynthesisPayload {
    RawBytes(Vec<u8>),
    RemoteUrl(String),
    HexEncoded(String),
}

impl SynthesisPayload {
    /// Resolves the payload to raw audio bytes, downloading if necessary.
    pub async fn resolve(self, client: &Client) -> Result<SynthesizedAudio> {
        match self {
            SynthesisPayload::RawBytes(buffer) => {
                if buffer.is_empty() {
                    return Err(WeibocastError::TtsGeneration(
                        "Backend returned an empty audio buffer".to_string(),
                    ));
                }
                Ok(SynthesizedAudio {
                    buffer,
                    source_url: None,
                })
            }
            SynthesisPayload::HexEncoded(hex) => {
                let buffer = decode_hex(&hex);
                if buffer.is_empty() {
                    return Err(WeibocastError::TtsGeneration(
                        "Backend returned an empty or malformed hex payload".to_string(),
                    ));
                }
                Ok(SynthesizedAudio {
                    buffer,
                    source_url: None,
                })
            }
            SynthesisPayload::RemoteUrl(url) => {
                log::info!("Downloading synthesized audio from {}", url);
                let response = client.get(&url).send().await.map_err(|e| {
                    WeibocastError::TtsGeneration(format!("Audio download failed: {}", e))
                })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(WeibocastError::TtsGeneration(format!(
                        "Audio download failed with status {}",
                        status
                    )));
                }
                let buffer = response
                    .bytes()
                    .await
                    .map_err(|e| {
                        WeibocastError::TtsGeneration(format!("Audio download failed: {}", e))
                    })?
                    .to_vec();
                if buffer.is_empty() {
                    return Err(WeibocastError::TtsGeneration(
                        "Audio download returned no data".to_string(),
                    ));
                }
                Ok(SynthesizedAudio {
                    buffer,
                    source_url: Some(url),
                })
            }
        }
    }
}

/// A speech synthesis backend.
///
/// One implementation serves both roles: preset synthesis uses a stock voice
/// identifier, clone synthesis conditions on a previously registered
/// reference sample.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Registers a reference voice sample, returning an opaque token for
    /// clone synthesis. Must complete before any clone call.
    async fn register_reference(&self, sample: &[u8], file_name: &str) -> Result<String>;

    /// Synthesizes text with a backend-provided stock voice.
    async fn synthesize_preset(&self, text: &str, voice_id: &str) -> Result<SynthesizedAudio>;

    /// Synthesizes text conditioned on a registered reference sample.
    async fn synthesize_clone(&self, text: &str, reference: &str) -> Result<SynthesizedAudio>;
}
