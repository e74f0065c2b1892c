//! Per-utterance synthesis orchestration.
//!
//! Drives the synthesis backend in strict script order with a role-dependent
//! strategy. The host always uses its preset voice. The guest attempts clone
//! synthesis when a reference token exists and falls back to the guest
//! preset on failure; without a reference the guest uses the preset
//! directly. A failed utterance is dropped, never retried, and never aborts
//! the run on its own.

use crate::config::WeibocastConfig;
use crate::error::{Result, WeibocastError};
use crate::events::EventBus;
use crate::tts::{SpeechSynthesizer, SynthesizedAudio};
use crate::types::{Speaker, SynthesisResult, Utterance};

/// Fallback chain for one guest utterance: clone first when a reference is
/// registered, preset voice otherwise or on clone failure.
async fn synthesize_guest(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    clone_reference: Option<&str>,
    preset_voice: &str,
    index: usize,
    events: &EventBus,
) -> Result<SynthesizedAudio> {
    if let Some(reference) = clone_reference {
        match synth.synthesize_clone(text, reference).await {
            Ok(audio) => return Ok(audio),
            Err(e) => {
                events.warning(format!(
                    "Clone synthesis failed for segment {} ({}): {}. Falling back to preset voice.",
                    index + 1,
                    Speaker::Guest,
                    e
                ));
            }
        }
    }
    synth.synthesize_preset(text, preset_voice).await
}

/// Synthesizes each utterance in order, returning one result per utterance
/// that produced audio.
///
/// The clone reference, when used, must already be registered with the
/// backend; registration is the caller's prerequisite step.
///
/// Fails with [`WeibocastError::NoAudioGenerated`] when no utterance
/// produces audio.
pub async fn synthesize_utterances(
    synth: &dyn SpeechSynthesizer,
    utterances: &[Utterance],
    clone_reference: Option<&str>,
    config: &WeibocastConfig,
    events: &EventBus,
) -> Result<Vec<SynthesisResult>> {
    let total = utterances.len();
    let mut results: Vec<SynthesisResult> = Vec::with_capacity(total);

    for (i, utterance) in utterances.iter().enumerate() {
        let text = utterance.text.trim();
        if text.is_empty() {
            events.warning(format!("Skipping empty segment {}/{}", i + 1, total));
            continue;
        }

        events.info(format!(
            "Generating segment {}/{} ({})...",
            i + 1,
            total,
            utterance.speaker
        ));

        let synthesized = match utterance.speaker {
            Speaker::Host => synth.synthesize_preset(text, &config.host_voice).await,
            Speaker::Guest => {
                synthesize_guest(
                    synth,
                    text,
                    clone_reference,
                    &config.guest_preset_voice,
                    i,
                    events,
                )
                .await
            }
        };

        match synthesized {
            Ok(audio) if !audio.buffer.is_empty() => {
                results.push(SynthesisResult {
                    speaker: utterance.speaker,
                    buffer: audio.buffer,
                    source_url: audio.source_url,
                });
            }
            Ok(_) => {
                events.error(format!(
                    "Generated empty audio buffer for segment {} ({}). Skipping.",
                    i + 1,
                    utterance.speaker
                ));
            }
            Err(e) => {
                events.error(format!(
                    "Failed to generate audio for segment {} ({}): {}",
                    i + 1,
                    utterance.speaker,
                    e
                ));
            }
        }
    }

    if results.is_empty() {
        return Err(WeibocastError::NoAudioGenerated(format!(
            "No valid audio segments were generated out of {} utterances",
            total
        )));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventSink, LogEntry, LogLevel, MemorySink};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct SharedSink(Arc<MemorySink>);

    impl EventSink for SharedSink {
        fn on_log(&self, entry: &LogEntry) {
            self.0.on_log(entry);
        }
    }

    fn bus_with_sink() -> (EventBus, Arc<MemorySink>) {
        let bus = EventBus::new();
        let sink = Arc::new(MemorySink::new());
        bus.add_sink(Box::new(SharedSink(sink.clone())));
        (bus, sink)
    }

    /// Scriptable backend: clone and preset paths can be made to fail
    /// independently, and calls are counted.
    struct MockSynthesizer {
        clone_fails: bool,
        preset_fails: bool,
        clone_calls: AtomicUsize,
        preset_calls: AtomicUsize,
    }

    impl MockSynthesizer {
        fn new(clone_fails: bool, preset_fails: bool) -> Self {
            Self {
                clone_fails,
                preset_fails,
                clone_calls: AtomicUsize::new(0),
                preset_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for MockSynthesizer {
        async fn register_reference(&self, _sample: &[u8], _file_name: &str) -> Result<String> {
            Ok("file-1".to_string())
        }

        async fn synthesize_preset(&self, text: &str, voice_id: &str) -> Result<SynthesizedAudio> {
            self.preset_calls.fetch_add(1, Ordering::SeqCst);
            if self.preset_fails {
                return Err(WeibocastError::TtsGeneration("preset down".to_string()));
            }
            Ok(SynthesizedAudio {
                buffer: format!("preset:{}:{}", voice_id, text).into_bytes(),
                source_url: None,
            })
        }

        async fn synthesize_clone(&self, text: &str, _reference: &str) -> Result<SynthesizedAudio> {
            self.clone_calls.fetch_add(1, Ordering::SeqCst);
            if self.clone_fails {
                return Err(WeibocastError::TtsGeneration("clone down".to_string()));
            }
            Ok(SynthesizedAudio {
                buffer: format!("clone:{}", text).into_bytes(),
                source_url: Some("https://example.com/a.mp3".to_string()),
            })
        }
    }

    fn dialogue() -> Vec<Utterance> {
        vec![
            Utterance {
                speaker: Speaker::Host,
                text: "Welcome.".to_string(),
            },
            Utterance {
                speaker: Speaker::Guest,
                text: "Thanks for having me.".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn host_uses_preset_guest_uses_clone() {
        let synth = MockSynthesizer::new(false, false);
        let config = WeibocastConfig::default();
        let results =
            synthesize_utterances(&synth, &dialogue(), Some("file-1"), &config, &EventBus::new())
                .await
                .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].buffer.starts_with(b"preset:"));
        assert_eq!(results[0].speaker, Speaker::Host);
        assert!(results[1].buffer.starts_with(b"clone:"));
        assert_eq!(results[1].source_url.as_deref(), Some("https://example.com/a.mp3"));
        assert_eq!(synth.clone_calls.load(Ordering::SeqCst), 1);
        assert_eq!(synth.preset_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn guest_falls_back_to_preset_when_clone_fails() {
        let synth = MockSynthesizer::new(true, false);
        let config = WeibocastConfig::default();
        let (bus, sink) = bus_with_sink();

        let results = synthesize_utterances(&synth, &dialogue(), Some("file-1"), &config, &bus)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        let guest = &results[1];
        let body = String::from_utf8(guest.buffer.clone()).unwrap();
        assert!(body.starts_with(&format!("preset:{}", config.guest_preset_voice)));

        let warnings = sink.messages_at(LogLevel::Warning);
        assert!(warnings
            .iter()
            .any(|m| m.contains("segment 2 (Guest)") && m.contains("Falling back to preset voice")));
    }

    #[tokio::test]
    async fn guest_without_reference_goes_straight_to_preset() {
        let synth = MockSynthesizer::new(false, false);
        let config = WeibocastConfig::default();
        let results = synthesize_utterances(&synth, &dialogue(), None, &config, &EventBus::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(synth.clone_calls.load(Ordering::SeqCst), 0);
        assert_eq!(synth.preset_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_utterances_are_skipped_without_calls() {
        let synth = MockSynthesizer::new(false, false);
        let config = WeibocastConfig::default();
        let (bus, sink) = bus_with_sink();
        let utterances = vec![
            Utterance {
                speaker: Speaker::Host,
                text: "   ".to_string(),
            },
            Utterance {
                speaker: Speaker::Host,
                text: "Real line.".to_string(),
            },
        ];

        let results = synthesize_utterances(&synth, &utterances, None, &config, &bus)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(synth.preset_calls.load(Ordering::SeqCst), 1);
        let warnings = sink.messages_at(LogLevel::Warning);
        assert!(warnings.iter().any(|m| m.contains("Skipping empty segment 1/2")));
    }

    #[tokio::test]
    async fn failed_utterance_is_dropped_but_run_continues() {
        // Preset path is down: the host line drops, the guest clone still
        // succeeds, and the run does not abort.
        let synth = MockSynthesizer::new(false, true);
        let config = WeibocastConfig::default();
        let (bus, sink) = bus_with_sink();
        let utterances = vec![
            Utterance {
                speaker: Speaker::Host,
                text: "I will be dropped.".to_string(),
            },
            Utterance {
                speaker: Speaker::Guest,
                text: "Still here.".to_string(),
            },
        ];

        let results = synthesize_utterances(&synth, &utterances, Some("ref"), &config, &bus)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].speaker, Speaker::Guest);
        let errors = sink.messages_at(LogLevel::Error);
        assert!(errors.iter().any(|m| m.contains("segment 1 (Host)")));
    }

    #[tokio::test]
    async fn zero_results_is_no_audio_generated() {
        let synth = MockSynthesizer::new(true, true);
        let config = WeibocastConfig::default();
        let err = synthesize_utterances(&synth, &dialogue(), Some("ref"), &config, &EventBus::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WeibocastError::NoAudioGenerated(_)));
    }

    #[tokio::test]
    async fn empty_utterance_list_is_no_audio_generated() {
        let synth = MockSynthesizer::new(false, false);
        let config = WeibocastConfig::default();
        let err = synthesize_utterances(&synth, &[], None, &config, &EventBus::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WeibocastError::NoAudioGenerated(_)));
    }
}
