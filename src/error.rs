//! Error types for the weibocast library.

use thiserror::Error;

/// Errors produced by the podcast generation pipeline.
#[derive(Debug, Error)]
pub enum WeibocastError {
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Source-text scraping failed
    #[error("Scraping error: {0}")]
    Scrape(String),

    /// Script generation (LLM) failed
    #[error("Script generation error: {0}")]
    ScriptGeneration(String),

    /// Reference-audio upload / clone registration failed.
    /// Recoverable: the pipeline proceeds without cloning.
    #[error("Clone registration error: {0}")]
    CloneRegistration(String),

    /// A single synthesis call failed.
    /// Recoverable: the utterance falls back or is dropped.
    #[error("TTS generation error: {0}")]
    TtsGeneration(String),

    /// Audio decoding or encoding failed
    #[error("Audio processing error: {0}")]
    AudioProcessing(String),

    /// No utterance produced any audio. Fatal.
    #[error("No audio generated: {0}")]
    NoAudioGenerated(String),

    /// No synthesized segment could be decoded for concatenation. Fatal.
    #[error("Concatenation failed: {0}")]
    ConcatenationFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl From<&str> for WeibocastError {
    fn from(s: &str) -> Self {
        WeibocastError::Other(s.to_string())
    }
}

impl From<String> for WeibocastError {
    fn from(s: String) -> Self {
        WeibocastError::Other(s)
    }
}

/// Result type for the weibocast library.
pub type Result<T> = std::result::Result<T, WeibocastError>;
