//! weibocast — turns a Weibo user's posts into a two-speaker audio podcast.
//!
//! The pipeline runs in fixed stages: scrape (simulated) → script
//! generation via a remote LLM → script parsing into speaker-attributed
//! utterances → per-utterance speech synthesis with a clone-to-preset
//! fallback → audio assembly into one mono WAV track with a speaker
//! timeline for synchronized playback animation.
//!
//! ```no_run
//! use weibocast::{Weibocast, WeibocastConfig};
//!
//! # async fn run() -> weibocast::Result<()> {
//! let config = WeibocastConfig {
//!     minimax_api_key: "...".to_string(),
//!     minimax_group_id: "...".to_string(),
//!     dashscope_api_key: "...".to_string(),
//!     bailian_app_id: "...".to_string(),
//!     ..WeibocastConfig::default()
//! };
//!
//! let weibocast = Weibocast::new(config);
//! let result = weibocast.generate("5907116391", None).await?;
//! println!("{} ({} timeline segments)", result.title, result.timeline.len());
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod scrape;
pub mod script;
pub mod tts;
pub mod types;

use std::sync::RwLock;
use std::time::Duration;

pub use config::WeibocastConfig;
pub use error::{Result, WeibocastError};
pub use events::{EventBus, EventSink, LogEntry, LogLevel, MemorySink};
pub use script::{ScriptOutline, ScriptSource};
pub use tts::{SpeechSynthesizer, SynthesisPayload, SynthesizedAudio};
pub use types::{
    PipelineStatus, PodcastResult, Speaker, SynthesisResult, TimelineSegment, Utterance,
};

/// Podcast generation pipeline.
///
/// Owns the configuration, the event bus the caller subscribes to for
/// progress display, and the pipeline status. One instance runs one
/// generation at a time.
pub struct Weibocast {
    config: WeibocastConfig,
    events: EventBus,
    status: RwLock<PipelineStatus>,
}

impl Weibocast {
    pub fn new(config: WeibocastConfig) -> Self {
        Self {
            config,
            events: EventBus::new(),
            status: RwLock::new(PipelineStatus::Idle),
        }
    }

    pub fn config(&self) -> &WeibocastConfig {
        &self.config
    }

    /// The event bus pipeline steps log to. Register sinks here before
    /// calling [`Weibocast::generate`].
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn status(&self) -> PipelineStatus {
        *self.status.read().unwrap()
    }

    fn set_status(&self, status: PipelineStatus) {
        *self.status.write().unwrap() = status;
    }

    /// Runs the full pipeline against the real collaborators.
    ///
    /// `reference_audio` is an optional voice sample for guest cloning, in
    /// any decodable container; without it (or when registration fails) the
    /// guest uses the preset voice. A configuration failure while building
    /// the collaborators ends in [`PipelineStatus::Error`] like any other
    /// pipeline failure.
    pub async fn generate(
        &self,
        user_id: &str,
        reference_audio: Option<&[u8]>,
    ) -> Result<PodcastResult> {
        let outcome = self.generate_inner(user_id, reference_audio).await;
        self.finish(outcome)
    }

    async fn generate_inner(
        &self,
        user_id: &str,
        reference_audio: Option<&[u8]>,
    ) -> Result<PodcastResult> {
        let scripts = script::ScriptGenerator::new(&self.config)?;
        let synth = tts::MiniMaxClient::new(&self.config)?;
        self.run_inner(user_id, reference_audio, &scripts, &synth).await
    }

    /// Runs the pipeline with injected collaborators.
    ///
    /// Any unrecovered failure transitions the pipeline to
    /// [`PipelineStatus::Error`] and returns the error; no partial result is
    /// produced.
    pub async fn run(
        &self,
        user_id: &str,
        reference_audio: Option<&[u8]>,
        scripts: &dyn ScriptSource,
        synth: &dyn SpeechSynthesizer,
    ) -> Result<PodcastResult> {
        let outcome = self.run_inner(user_id, reference_audio, scripts, synth).await;
        self.finish(outcome)
    }

    /// Applies the terminal status transition and the error event.
    fn finish(&self, outcome: Result<PodcastResult>) -> Result<PodcastResult> {
        match &outcome {
            Ok(_) => self.set_status(PipelineStatus::Completed),
            Err(e) => {
                self.set_status(PipelineStatus::Error);
                self.events.error(format!("Error: {}", e));
            }
        }
        outcome
    }

    async fn run_inner(
        &self,
        user_id: &str,
        reference_audio: Option<&[u8]>,
        scripts: &dyn ScriptSource,
        synth: &dyn SpeechSynthesizer,
    ) -> Result<PodcastResult> {
        // 1. Scrape
        self.set_status(PipelineStatus::Scraping);
        self.events.info(format!(
            "Initializing scraping process for user: {}...",
            user_id
        ));
        let source_text = scrape::simulate_scrape(
            user_id,
            Duration::from_millis(self.config.scrape_step_delay_ms),
            &self.events,
        )
        .await?;

        // 2. Generate script
        self.set_status(PipelineStatus::ScriptGeneration);
        self.events.info("Sending source text for script generation...");
        let outline = scripts.generate_script(&source_text).await?;
        self.events
            .success(format!("Script generated successfully: \"{}\"", outline.title));

        // 3. Generate audio
        self.set_status(PipelineStatus::AudioGeneration);
        let utterances = script::parse_script(&outline.script);
        self.events
            .info(format!("Parsed script into {} segments.", utterances.len()));

        // Reference registration is a hard prerequisite of the segment
        // loop; a failure here disables cloning for the whole run.
        let clone_reference = match reference_audio {
            Some(sample) => self.register_reference(sample, synth).await,
            None => None,
        };
        self.events.info(format!(
            "Audio Generation Mode: {}",
            if clone_reference.is_some() {
                "MiniMax Voice Cloning"
            } else {
                "MiniMax Standard TTS"
            }
        ));

        let results = tts::synthesize_utterances(
            synth,
            &utterances,
            clone_reference.as_deref(),
            &self.config,
            &self.events,
        )
        .await?;

        self.events
            .info(format!("Stitching {} audio segments...", results.len()));
        let track = audio::assemble(&results, &self.events)?;

        let result = PodcastResult {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            title: outline.title,
            script: outline.script,
            audio: track.audio,
            audio_url: None,
            timeline: track.timeline,
            guest_name: scrape::guest_name_for(user_id).to_string(),
        };
        self.events.success("Audio synthesis complete.");
        Ok(result)
    }

    /// Conditions and uploads the reference sample. Both steps are
    /// recoverable: on failure the run continues without cloning.
    async fn register_reference(
        &self,
        sample: &[u8],
        synth: &dyn SpeechSynthesizer,
    ) -> Option<String> {
        self.events.info("Uploading reference audio...");
        let prepared = match audio::prepare_reference_audio(sample, &self.config) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.events.error(format!(
                    "Reference audio unusable: {}. Fallback to Standard TTS for Guest.",
                    e
                ));
                return None;
            }
        };

        match synth.register_reference(&prepared, "reference.wav").await {
            Ok(reference) => {
                self.events
                    .success(format!("File uploaded successfully. ID: {}", reference));
                Some(reference)
            }
            Err(e) => {
                self.events.error(format!(
                    "Reference upload failed: {}. Fallback to Standard TTS for Guest.",
                    e
                ));
                None
            }
        }
    }
}
