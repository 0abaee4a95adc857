//! Voice input adapter over the platform speech recognizer
//!
//! Recognition is single-utterance and final-only: one `start()` yields at
//! most one transcript, after which the adapter is idle again.

use super::language::Language;
use crate::{JugalError, Result};
use tracing::{debug, error, warn};

/// What the adapter asks the platform for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub locale: String,
    /// Keep listening after the first utterance
    pub continuous: bool,
    /// Report partial hypotheses
    pub interim_results: bool,
}

impl RecognitionRequest {
    pub fn single_utterance(language: Language) -> Self {
        Self {
            locale: language.locale().to_string(),
            continuous: false,
            interim_results: false,
        }
    }
}

/// Callbacks delivered by the platform recognizer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Final transcript of the utterance
    Transcript(String),
    /// Recognizer stopped listening
    Ended,
    /// Recognizer failed
    Error(String),
}

/// Platform speech-to-text capability
pub trait SpeechRecognizer: Send {
    fn start(&mut self, request: &RecognitionRequest) -> Result<()>;
    fn stop(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListenState {
    #[default]
    Idle,
    Listening,
}

pub struct VoiceInput {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    state: ListenState,
    language: Language,
}

impl VoiceInput {
    pub fn new(recognizer: Box<dyn SpeechRecognizer>, language: Language) -> Self {
        Self {
            recognizer: Some(recognizer),
            state: ListenState::Idle,
            language,
        }
    }

    /// Adapter for a platform without speech recognition
    pub fn unsupported(language: Language) -> Self {
        Self {
            recognizer: None,
            state: ListenState::Idle,
            language,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListenState::Listening
    }

    pub fn state(&self) -> ListenState {
        self.state
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Takes effect on the next `start()`
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn start(&mut self) -> Result<()> {
        let Some(recognizer) = self.recognizer.as_mut() else {
            return Err(JugalError::CapabilityUnsupported(
                "speech recognition".to_string(),
            ));
        };

        if self.state == ListenState::Listening {
            warn!("Cannot start recognition: already listening");
            return Ok(());
        }

        let request = RecognitionRequest::single_utterance(self.language);
        recognizer.start(&request)?;
        self.state = ListenState::Listening;
        debug!("Listening in {}", request.locale);
        Ok(())
    }

    /// Stop listening; a transcript arriving afterwards is dropped
    pub fn stop(&mut self) {
        if self.state != ListenState::Listening {
            return;
        }
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.state = ListenState::Idle;
        debug!("Recognition stopped");
    }

    /// Feed a platform callback; returns the transcript to submit, if any
    pub fn handle_event(&mut self, event: RecognitionEvent) -> Option<String> {
        match event {
            RecognitionEvent::Transcript(text) => {
                if self.state != ListenState::Listening {
                    debug!("Dropping transcript received while idle");
                    return None;
                }
                self.state = ListenState::Idle;
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                }
            }
            RecognitionEvent::Ended => {
                self.state = ListenState::Idle;
                None
            }
            RecognitionEvent::Error(err) => {
                error!("Speech recognition error: {}", err);
                self.state = ListenState::Idle;
                None
            }
        }
    }
}
