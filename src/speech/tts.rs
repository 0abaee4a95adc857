//! Voice output adapter over the platform speech synthesizer
//!
//! The adapter owns voice selection and the speaking flag. The flag follows
//! the synthesizer's start/end/error callbacks rather than being polled.

use super::language::Language;
use crate::{JugalError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Name fragments that usually indicate a better-sounding voice
const QUALITY_MARKERS: [&str; 2] = ["female", "google"];

const FEMALE_MARKER: &str = "female";

/// Presentation parameters for every utterance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TTSConfig {
    /// 1.0 is the platform's neutral pitch
    pub pitch: f32,
    /// 1.0 is normal speed
    pub rate: f32,
}

impl Default for TTSConfig {
    fn default() -> Self {
        Self {
            pitch: 1.1,
            rate: 1.0,
        }
    }
}

impl TTSConfig {
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }
}

/// A voice offered by the platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// Locale such as `en-GB`
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn matches_prefix(&self, prefix: &str) -> bool {
        self.lang.starts_with(prefix)
    }

    fn name_contains(&self, marker: &str) -> bool {
        self.name.to_lowercase().contains(marker)
    }

    fn has_quality_marker(&self) -> bool {
        QUALITY_MARKERS.iter().any(|m| self.name_contains(m))
    }
}

/// Everything the platform needs to speak one string
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    /// `None` leaves the choice to the platform default
    pub voice: Option<Voice>,
    pub pitch: f32,
    pub rate: f32,
}

/// Callbacks delivered by the platform synthesizer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Ended,
    Errored(String),
}

/// Platform text-to-speech capability
pub trait SpeechSynthesizer: Send {
    fn voices(&self) -> Vec<Voice>;
    fn speak(&mut self, utterance: Utterance) -> Result<()>;
    fn cancel(&mut self);
}

/// Pick a voice for `language`; first rule that matches wins
pub fn select_voice(voices: &[Voice], language: Language) -> Option<&Voice> {
    let prefix = language.prefix();

    voices
        .iter()
        .find(|v| v.matches_prefix(prefix) && v.has_quality_marker())
        .or_else(|| voices.iter().find(|v| v.matches_prefix(prefix)))
        .or_else(|| {
            language
                .fallback_prefix()
                .and_then(|fallback| voices.iter().find(|v| v.matches_prefix(fallback)))
        })
        .or_else(|| voices.iter().find(|v| v.name_contains(FEMALE_MARKER)))
}

pub struct VoiceOutput {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    config: TTSConfig,
    speaking: bool,
}

impl VoiceOutput {
    pub fn new(synthesizer: Box<dyn SpeechSynthesizer>, config: TTSConfig) -> Self {
        Self {
            synthesizer: Some(synthesizer),
            config,
            speaking: false,
        }
    }

    /// Adapter for a platform without speech synthesis
    pub fn unsupported() -> Self {
        Self {
            synthesizer: None,
            config: TTSConfig::default(),
            speaking: false,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn config(&self) -> &TTSConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TTSConfig) {
        self.config = config;
    }

    /// Interrupt whatever is playing and speak `text`
    pub fn speak(&mut self, text: &str, language: Language) -> Result<()> {
        let Some(synthesizer) = self.synthesizer.as_mut() else {
            return Err(JugalError::CapabilityUnsupported(
                "speech synthesis".to_string(),
            ));
        };

        synthesizer.cancel();
        self.speaking = false;

        let voices = synthesizer.voices();
        let voice = select_voice(&voices, language).cloned();
        match &voice {
            Some(v) => debug!("Speaking with voice {} ({})", v.name, v.lang),
            None => debug!("No matching voice, using platform default"),
        }

        synthesizer.speak(Utterance {
            text: text.to_string(),
            locale: language.locale().to_string(),
            voice,
            pitch: self.config.pitch,
            rate: self.config.rate,
        })
    }

    /// Silence playback immediately; safe to call repeatedly
    pub fn cancel(&mut self) {
        if let Some(synthesizer) = self.synthesizer.as_mut() {
            synthesizer.cancel();
        }
        self.speaking = false;
    }

    pub fn handle_event(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::Started => self.speaking = true,
            SpeechEvent::Ended => self.speaking = false,
            SpeechEvent::Errored(err) => {
                warn!("Speech synthesis error: {}", err);
                self.speaking = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn voices(list: &[(&str, &str)]) -> Vec<Voice> {
        list.iter().map(|(lang, name)| Voice::new(*name, *lang)).collect()
    }

    #[test]
    fn test_quality_marker_outranks_locale_only() {
        let available = voices(&[("en-GB", "Male"), ("en-US", "Google Female")]);
        let chosen = select_voice(&available, Language::English).unwrap();
        assert_eq!(chosen.name, "Google Female");
    }

    #[test]
    fn test_locale_match_without_marker() {
        let available = voices(&[("fr-FR", "Amelie"), ("en-GB", "Daniel")]);
        let chosen = select_voice(&available, Language::English).unwrap();
        assert_eq!(chosen.name, "Daniel");
    }

    #[test]
    fn test_nepali_falls_back_to_hindi() {
        let available = voices(&[("en-US", "Samantha Female"), ("hi-IN", "Lekha")]);
        let chosen = select_voice(&available, Language::Nepali).unwrap();
        assert_eq!(chosen.name, "Lekha");
    }

    #[test]
    fn test_nepali_prefers_native_voice() {
        let available = voices(&[("hi-IN", "Lekha"), ("ne-NP", "Nepali")]);
        let chosen = select_voice(&available, Language::Nepali).unwrap();
        assert_eq!(chosen.name, "Nepali");
    }

    #[test]
    fn test_any_female_voice_last() {
        let available = voices(&[("de-DE", "Anna"), ("it-IT", "Alice Female")]);
        let chosen = select_voice(&available, Language::Nepali).unwrap();
        assert_eq!(chosen.name, "Alice Female");
    }

    #[test]
    fn test_no_match_uses_default() {
        let available = voices(&[("de-DE", "Anna")]);
        assert!(select_voice(&available, Language::English).is_none());
        assert!(select_voice(&[], Language::English).is_none());
    }

    #[test]
    fn test_english_does_not_use_hindi_fallback() {
        let available = voices(&[("hi-IN", "Lekha")]);
        assert!(select_voice(&available, Language::English).is_none());
    }

    #[derive(Default)]
    struct Record {
        spoken: Vec<Utterance>,
        cancels: usize,
    }

    struct FakeSynth(Arc<Mutex<Record>>);

    impl SpeechSynthesizer for FakeSynth {
        fn voices(&self) -> Vec<Voice> {
            vec![Voice::new("Google US English Female", "en-US")]
        }

        fn speak(&mut self, utterance: Utterance) -> Result<()> {
            self.0.lock().spoken.push(utterance);
            Ok(())
        }

        fn cancel(&mut self) {
            self.0.lock().cancels += 1;
        }
    }

    #[test]
    fn test_speak_cancels_then_speaks() {
        let record = Arc::new(Mutex::new(Record::default()));
        let mut output = VoiceOutput::new(Box::new(FakeSynth(record.clone())), TTSConfig::default());

        output.speak("hello", Language::English).unwrap();

        let record = record.lock();
        assert_eq!(record.cancels, 1);
        let utterance = &record.spoken[0];
        assert_eq!(utterance.locale, "en-US");
        assert_eq!(utterance.pitch, 1.1);
        assert_eq!(utterance.rate, 1.0);
        assert_eq!(
            utterance.voice.as_ref().map(|v| v.name.as_str()),
            Some("Google US English Female")
        );
    }

    #[test]
    fn test_speaking_flag_follows_events() {
        let record = Arc::new(Mutex::new(Record::default()));
        let mut output = VoiceOutput::new(Box::new(FakeSynth(record)), TTSConfig::default());

        output.handle_event(SpeechEvent::Started);
        assert!(output.is_speaking());
        output.handle_event(SpeechEvent::Ended);
        assert!(!output.is_speaking());

        output.handle_event(SpeechEvent::Started);
        output.handle_event(SpeechEvent::Errored("interrupted".into()));
        assert!(!output.is_speaking());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut output = VoiceOutput::unsupported();
        output.cancel();
        output.cancel();
        assert!(!output.is_speaking());
    }

    #[test]
    fn test_unsupported_speak() {
        let mut output = VoiceOutput::unsupported();
        assert!(matches!(
            output.speak("hi", Language::English),
            Err(JugalError::CapabilityUnsupported(_))
        ));
    }

    #[test]
    fn test_config_builder() {
        let config = TTSConfig::default().with_pitch(1.0).with_rate(0.9);
        assert_eq!(config.pitch, 1.0);
        assert_eq!(config.rate, 0.9);
    }
}
