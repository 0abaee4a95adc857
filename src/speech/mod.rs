//! Voice input and output
//!
//! This module provides:
//! - Speech-to-text through the platform recognizer
//! - Text-to-speech through the platform synthesizer, with voice selection

pub mod language;
pub mod stt;
pub mod tts;

// Re-export commonly used types
pub use language::Language;
pub use stt::{ListenState, RecognitionEvent, RecognitionRequest, SpeechRecognizer, VoiceInput};
pub use tts::{
    select_voice, SpeechEvent, SpeechSynthesizer, TTSConfig, Utterance, Voice, VoiceOutput,
};
